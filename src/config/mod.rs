//! Run configuration: the knobs that govern one SSAP comparison or one resolver sweep, plus a
//! `from_pairs` constructor for loading them from a flat `key = value` config file or CLI flags.

use serde::{Deserialize, Serialize};

use crate::error::{Context, CustomError, Error, ErrorKind};
use crate::resolve::ResolverConfig;
use crate::seq::TrimSpec;

/// Parameters governing one SSAP pairwise structure comparison.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SsapConfig {
    /// Residue pairs scoring below this in the fast (secondary-structure-only) pass are not
    /// carried into the full residue-level pass.
    pub min_lower_mat_res_score: f64,
    pub gap_penalty: f64,
    pub gap_extend_penalty: f64,
    /// Run the cheap secondary-structure-element pre-pass before the full residue pass.
    pub use_fast_ss_pass: bool,
    /// Maximum Frobenius distance a composed rotation may sit from `SO(3)` before superposition
    /// fails outright.
    pub rotation_tidy_tolerance: f64,
}

impl Default for SsapConfig {
    fn default() -> Self {
        Self {
            min_lower_mat_res_score: 5.0,
            gap_penalty: -10.0,
            gap_extend_penalty: -2.0,
            use_fast_ss_pass: true,
            rotation_tidy_tolerance: 1e-6,
        }
    }
}

/// The full run context: one [`SsapConfig`] plus one [`ResolverConfig`], as loaded from a config
/// file or command line.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct RunContext {
    pub ssap: SsapConfig,
    pub resolver: ResolverConfig,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            ssap: SsapConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl RunContext {
    /// Build a [`RunContext`] from `key = value` pairs, such as those parsed out of a flat
    /// config file or collected from repeated `--set key=value` flags. Unrecognised keys are
    /// rejected rather than silently ignored.
    ///
    /// # Errors
    /// [`ErrorKind::UnknownConfigKey`] for an unrecognised key; [`ErrorKind::InvalidTrimSpec`] or
    /// [`ErrorKind::NonFiniteScore`] if a recognised key's value can't be parsed.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self, Error> {
        let mut ctx = Self::default();
        for (key, value) in pairs {
            match key {
                "ssap.min_lower_mat_res_score" => {
                    ctx.ssap.min_lower_mat_res_score = parse_f64(key, value)?;
                }
                "ssap.gap_penalty" => ctx.ssap.gap_penalty = parse_f64(key, value)?,
                "ssap.gap_extend_penalty" => ctx.ssap.gap_extend_penalty = parse_f64(key, value)?,
                "ssap.use_fast_ss_pass" => ctx.ssap.use_fast_ss_pass = parse_bool(key, value)?,
                "ssap.rotation_tidy_tolerance" => {
                    ctx.ssap.rotation_tidy_tolerance = parse_f64(key, value)?;
                }
                "resolver.score_threshold" => ctx.resolver.score_threshold = parse_f64(key, value)?,
                "resolver.permit_full_overlap" => {
                    ctx.resolver.permit_full_overlap = parse_bool(key, value)?;
                }
                "resolver.output_trimmed_boundaries" => {
                    ctx.resolver.output_trimmed_boundaries = parse_bool(key, value)?;
                }
                "resolver.min_gap_length" => {
                    ctx.resolver.min_gap_length = Some(parse_u32(key, value)?);
                }
                "resolver.trim_spec" => {
                    let (full_length, total_trimming) = parse_trim_spec(key, value)?;
                    ctx.resolver.trim_spec = TrimSpec::new(full_length, total_trimming).map_err(|e| {
                        Error::with_context(
                            ErrorKind::InvalidTrimSpec,
                            CustomError::error("invalid trim_spec", e.to_string(), Context::none()),
                        )
                    })?;
                }
                other => {
                    return Err(Error::with_context(
                        ErrorKind::UnknownConfigKey,
                        CustomError::error(
                            "unknown configuration key",
                            format!("'{other}' is not a recognised configuration key"),
                            Context::none(),
                        ),
                    ));
                }
            }
        }
        Ok(ctx)
    }
}

fn parse_f64(key: &str, value: &str) -> Result<f64, Error> {
    value.parse().map_err(|_| malformed(key, value))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, Error> {
    value.parse().map_err(|_| malformed(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, Error> {
    match value {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(malformed(key, value)),
    }
}

fn parse_trim_spec(key: &str, value: &str) -> Result<(u32, u32), Error> {
    let (full, trim) = value.split_once(':').ok_or_else(|| malformed(key, value))?;
    Ok((parse_u32(key, full)?, parse_u32(key, trim)?))
}

fn malformed(key: &str, value: &str) -> Error {
    Error::with_context(
        ErrorKind::UnknownConfigKey,
        CustomError::error(
            "malformed configuration value",
            format!("'{value}' is not a valid value for '{key}'"),
            Context::none(),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_from_pairs() {
        let ctx = RunContext::from_pairs(std::iter::empty()).unwrap();
        assert_eq!(ctx, RunContext::default());
    }

    #[test]
    fn recognised_keys_override_defaults() {
        let ctx = RunContext::from_pairs([
            ("ssap.gap_penalty", "-8.5"),
            ("resolver.permit_full_overlap", "true"),
            ("resolver.trim_spec", "100:10"),
        ])
        .unwrap();
        assert_eq!(ctx.ssap.gap_penalty, -8.5);
        assert!(ctx.resolver.permit_full_overlap);
        assert_eq!(ctx.resolver.trim_spec, TrimSpec::new(100, 10).unwrap());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = RunContext::from_pairs([("bogus.key", "1")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownConfigKey);
    }
}
