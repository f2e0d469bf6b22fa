//! Redistribute histogram counts ("spectra") from one set of bin edges onto another.
//!
//! Two methods are available:
//! * [`Method::Interpolation`] – deterministic; each bin's count is the area under a
//!   local line and is split analytically across the new bins.
//! * [`Method::Listmode`] – stochastic; each count becomes a synthetic event drawn
//!   uniformly in its bin, and the events are histogrammed on the new edges.
//!
//! ```
//! use ndarray::arr1;
//! use rusty_rebin::{rebin, RebinOptions};
//!
//! let out = rebin(
//!     &arr1(&[10.0, 20.0]),
//!     &arr1(&[0.0, 2.0, 4.0]),
//!     &arr1(&[0.0, 1.0, 2.0, 3.0, 4.0]),
//!     &RebinOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(out.spectra.to_f64(), arr1(&[5.0, 5.0, 10.0, 10.0]).into_dyn());
//! ```

pub mod config;
pub mod error;
pub mod rebin;

pub use error::{RebinError, Result};
pub use rebin::dispatch::{rebin, rebin_dyn, rebin_with_slopes};
pub use rebin::model::{Method, OverlapSide, RebinOptions, RebinWarning, Rebinned, RebinnedSpectra};
