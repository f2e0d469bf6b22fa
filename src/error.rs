//! Error types for rebinning.

use thiserror::Error;

/// Fatal conditions that abort a rebin call without producing output.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RebinError {
    /// Rank or shape mismatch among spectra, edges and slopes.
    #[error("shape error: {0}")]
    Shape(String),

    /// An edge array decreases somewhere.
    #[error("{name} is not monotonically increasing: {edges:?}")]
    NonMonotonic { name: &'static str, edges: Vec<f64> },

    /// Input and output edge ranges do not intersect.
    #[error("no overlap: input edges are all {direction} than output edges")]
    NoOverlap { direction: &'static str },

    #[error("cannot rebin spectra with negative values with listmode method")]
    NegativeCounts,

    #[error("cannot rebin spectra with all values less than one with listmode method")]
    AllBelowOne,

    #[error("cannot rebin spectra with non-finite values with listmode method")]
    NonFiniteCounts,

    /// A rounded count does not fit an unsigned 64-bit integer.
    #[error("spectrum value {value:e} is too large to rebin with listmode method")]
    CountTooLarge { value: f64 },

    /// The events of one spectrum add up past `u64::MAX`.
    #[error("total event count of a spectrum overflows u64")]
    EventOverflow,

    /// The synthetic event buffer for one spectrum cannot be allocated.
    #[error("cannot allocate {events} listmode events")]
    EventAllocation { events: u64 },

    /// Listmode expansion of one spectrum would exceed the configured limit.
    #[error("spectrum {index} holds {events} events, more than the limit of {limit}")]
    TooManyEvents { index: usize, events: u64, limit: u64 },

    #[error("{0} is not a valid rebinning method")]
    UnknownMethod(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, RebinError>;
