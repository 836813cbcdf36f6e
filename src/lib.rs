#![doc = include_str!("../README.md")]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(
    clippy::must_use_candidate,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::wildcard_imports,
    clippy::module_name_repetitions,
    clippy::suboptimal_flops,
    clippy::too_many_lines
)]

pub mod alignment;
pub mod config;
pub mod dp;
pub mod error;
mod helper_functions;
pub mod io;
pub mod protein;
pub mod resolve;
pub mod score;
pub mod seq;
pub mod spanning;
pub mod ssap;
pub mod superpose;
pub mod view;

pub use crate::alignment::{Alignment, Entry};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::protein::{AminoAcid, Protein, Residue};
pub use crate::resolve::{resolve_hits, FullHit, ScoredArchive};
pub use crate::ssap::{compare as ssap_compare, SsapResult};
pub use crate::superpose::{compose as superpose_compose, SuperpositionContext};
