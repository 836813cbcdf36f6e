use std::fmt;

use super::{Context, CustomError};

/// The taxonomy of errors the core can raise, so that callers can match on `kind()` instead of
/// parsing the rendered message. See the [`CustomError`] carried alongside for source location
/// and human-readable detail.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorKind {
    /// A PDB `ATOM` record could not be parsed.
    MalformedPdb,
    /// A DSSP secondary-structure record could not be parsed.
    MalformedDssp,
    /// A SEC secondary-structure-element record could not be parsed.
    MalformedSec,
    /// A line of a pairwise SSAP scores file could not be parsed.
    BadScoreLine,
    /// A `TrimSpec` was constructed with `total_trimming >= full_length`.
    InvalidTrimSpec,
    /// A score used in scoring or resolving was not finite.
    NonFiniteScore,
    /// An alignment entry's present positions were not strictly increasing.
    SegmentOutOfOrder,
    /// The scored-edge graph used to build a spanning tree was not connected.
    SpanningTreeDisconnected,
    /// A composed rotation could not be tidied back onto SO(3) within tolerance.
    NonTidyRotation,
    /// One of the two compared proteins was too short to align.
    ProteinTooShort,
    /// The caller's cancellation flag was observed.
    Cancelled,
    /// A hit carried a non-finite or otherwise invalid score.
    InvalidScore,
    /// A configuration key was not recognised.
    UnknownConfigKey,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MalformedPdb => "malformed PDB record",
            Self::MalformedDssp => "malformed DSSP record",
            Self::MalformedSec => "malformed SEC record",
            Self::BadScoreLine => "malformed pairwise scores line",
            Self::InvalidTrimSpec => "invalid trim specification",
            Self::NonFiniteScore => "non-finite score",
            Self::SegmentOutOfOrder => "alignment positions out of order",
            Self::SpanningTreeDisconnected => "spanning tree graph is disconnected",
            Self::NonTidyRotation => "rotation did not tidy onto SO(3)",
            Self::ProteinTooShort => "protein too short to align",
            Self::Cancelled => "operation cancelled",
            Self::InvalidScore => "invalid hit score",
            Self::UnknownConfigKey => "unknown configuration key",
        };
        write!(f, "{text}")
    }
}

/// An error raised by the core, carrying both a matchable [`ErrorKind`] and a [`CustomError`]
/// with full source context for human consumption.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Error {
    kind: ErrorKind,
    custom: CustomError,
}

impl Error {
    #[must_use]
    pub fn new(kind: ErrorKind, short_desc: impl ToString, long_desc: impl ToString) -> Self {
        Self {
            kind,
            custom: CustomError::error(short_desc, long_desc, Context::none()),
        }
    }

    #[must_use]
    pub fn with_context(kind: ErrorKind, custom: CustomError) -> Self {
        Self { kind, custom }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub const fn custom(&self) -> &CustomError {
        &self.custom
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.custom)
    }
}

impl std::error::Error for Error {}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
