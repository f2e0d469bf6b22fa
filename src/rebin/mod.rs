//! Rebinning engine: validation, broadcasting, and the two kernels.
//!
//! Architecture:
//! ```text
//!  spectra + in_edges + out_edges (+ slopes)
//!        │
//!        ▼
//!   ┌────────────┐
//!   │  dispatch   │  method preprocessing, gather results
//!   └────────────┘
//!        │
//!        ▼
//!   ┌────────────┐     ┌────────────┐
//!   │ broadcast   │ ──▶ │  validate   │  ranks, shapes, monotonic, overlap
//!   └────────────┘     └────────────┘
//!        │
//!        ▼   rayon: one task per spectrum
//!   ┌───────────────┐   ┌──────────┐
//!   │ interpolation  │ / │ listmode  │
//!   └───────────────┘   └──────────┘
//!        │
//!        ▼
//!    Rebinned { spectra, warnings }
//! ```

pub mod broadcast;
pub mod dispatch;
pub mod interpolation;
pub mod listmode;
pub mod model;
pub mod validate;
