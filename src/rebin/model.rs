use std::fmt;
use std::str::FromStr;

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use crate::error::RebinError;

// ---------------------------------------------------------------------------
// Method – which kernel to run
// ---------------------------------------------------------------------------

/// Rebinning algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Method {
    /// Deterministic piecewise-linear redistribution of counts.
    #[default]
    Interpolation,
    /// Stochastic resampling through synthetic events.
    Listmode,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Interpolation => "interpolation",
            Method::Listmode => "listmode",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: `"Interpolation"` and `"LISTMODE"` are accepted.
impl FromStr for Method {
    type Err = RebinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "interpolation" => Ok(Method::Interpolation),
            "listmode" => Ok(Method::Listmode),
            _ => Err(RebinError::UnknownMethod(s.to_string())),
        }
    }
}

impl TryFrom<String> for Method {
    type Error = RebinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Method> for String {
    fn from(method: Method) -> Self {
        method.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// RebinOptions – per-call configuration
// ---------------------------------------------------------------------------

/// Configuration for a single rebin call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebinOptions {
    pub method: Method,

    /// Report zero padding caused by partial overlap.
    pub warn_on_partial_overlap: bool,

    /// Base seed for listmode; spectrum `i` of a batch uses `seed + i`.
    /// `None` draws a fresh OS seed per spectrum.
    pub seed: Option<u64>,

    /// Upper bound on synthetic events per listmode spectrum.
    pub max_events: Option<u64>,
}

impl Default for RebinOptions {
    fn default() -> Self {
        Self {
            method: Method::Interpolation,
            warn_on_partial_overlap: true,
            seed: None,
            max_events: None,
        }
    }
}

impl RebinOptions {
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_partial_overlap_warnings(mut self, enabled: bool) -> Self {
        self.warn_on_partial_overlap = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_events(mut self, limit: u64) -> Self {
        self.max_events = Some(limit);
        self
    }
}

// ---------------------------------------------------------------------------
// Warnings – non-fatal outcomes
// ---------------------------------------------------------------------------

/// Side of the output spectrum that receives zero padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlapSide {
    Left,
    Right,
}

/// A non-fatal condition observed while rebinning.
#[derive(Debug, Clone, PartialEq)]
pub enum RebinWarning {
    /// Output edges extend past the input edges on `side`.
    PartialOverlap { side: OverlapSide },
    /// Listmode rounding changed `changed` values, the worst by `max_deviation`.
    PrecisionLoss { changed: usize, max_deviation: f64 },
}

impl fmt::Display for RebinWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebinWarning::PartialOverlap { side: OverlapSide::Left } => write!(
                f,
                "the first input edge is larger than the first output edge, \
                 zeros will be padded on the left side of the new spectrum"
            ),
            RebinWarning::PartialOverlap { side: OverlapSide::Right } => write!(
                f,
                "the last input edge is smaller than the last output edge, \
                 zeros will be padded on the right side of the new spectrum"
            ),
            RebinWarning::PrecisionLoss { changed, max_deviation } => write!(
                f,
                "{changed} spectrum value(s) lose decimal precision when rounded to \
                 integers for listmode (largest change {max_deviation:.3e})"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Rebinned – the typed outcome of a call
// ---------------------------------------------------------------------------

/// Rebinned counts, typed by the method that produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum RebinnedSpectra {
    Interpolated(ArrayD<f64>),
    Listmode(ArrayD<u64>),
}

impl RebinnedSpectra {
    pub fn shape(&self) -> &[usize] {
        match self {
            RebinnedSpectra::Interpolated(a) => a.shape(),
            RebinnedSpectra::Listmode(a) => a.shape(),
        }
    }

    pub fn as_interpolated(&self) -> Option<&ArrayD<f64>> {
        match self {
            RebinnedSpectra::Interpolated(a) => Some(a),
            RebinnedSpectra::Listmode(_) => None,
        }
    }

    pub fn as_listmode(&self) -> Option<&ArrayD<u64>> {
        match self {
            RebinnedSpectra::Listmode(a) => Some(a),
            RebinnedSpectra::Interpolated(_) => None,
        }
    }

    /// Counts as floating point regardless of method.
    pub fn to_f64(&self) -> ArrayD<f64> {
        match self {
            RebinnedSpectra::Interpolated(a) => a.clone(),
            RebinnedSpectra::Listmode(a) => a.mapv(|v| v as f64),
        }
    }
}

/// Result of a successful rebin: the spectra plus any warnings raised on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Rebinned {
    pub spectra: RebinnedSpectra,
    pub warnings: Vec<RebinWarning>,
}

impl Rebinned {
    pub fn has_partial_overlap(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, RebinWarning::PartialOverlap { .. }))
    }
}
