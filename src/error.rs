//! Error type shared by the interval engine, the network models and the routing table.

use crate::models::IpFamily;
use num_bigint::BigUint;
use thiserror::Error;

/// Errors returned by set operations, constructors and table builds.
#[derive(Debug, Error)]
pub enum AlgebraError {
    /// Interval bounds inverted or outside `[base, 2^width - 1]`.
    #[error("invalid range: low={low} high={high} ({reason})")]
    InvalidRange {
        low: BigUint,
        high: BigUint,
        reason: &'static str,
    },

    /// Two operands of different bit width, base or address family.
    #[error("family mismatch: {0} vs {1}")]
    FamilyMismatch(String, String),

    /// A serialized payload carries a tag with no registered decoder.
    #[error("unknown data type: '{0}'")]
    UnknownVariantTag(String),

    /// A recursive next hop could not be matched or resolved to an incomplete hop.
    #[error("recursive next hop unresolved: {0}")]
    RecursionUnresolved(String),

    /// The input of a translation has addresses in a family the translator lacks.
    #[error("translator {0} is empty")]
    TranslatorFamilyMissing(IpFamily),

    /// Address, mask, CIDR or range text that could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// A contiguous prefix was required but the mask has holes.
    #[error("irregular mask: {0}")]
    IrregularMask(String),

    /// A next hop that fails format validation.
    #[error("invalid next hop: {0}")]
    InvalidHop(String),

    /// Widening a block past /0.
    #[error("no supernet for {0}")]
    NoSupernet(String),

    /// Enumerating an irregular mask would produce too many hosts.
    #[error("too many hosts to enumerate for {0}")]
    TooManyHosts(String),

    /// A single network was requested from an empty or mixed-family group.
    #[error("network group is empty or mixed: {0}")]
    EmptyGroup(String),

    /// Record (de)serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, AlgebraError>;

impl AlgebraError {
    pub(crate) fn invalid_range(low: &BigUint, high: &BigUint, reason: &'static str) -> Self {
        AlgebraError::InvalidRange {
            low: low.clone(),
            high: high.clone(),
            reason,
        }
    }
}
