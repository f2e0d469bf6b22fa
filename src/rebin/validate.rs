//! Input validation: ranks, shapes, edge monotonicity and range overlap.
//!
//! Every check is a pure function over already-copied [`Batch`] buffers.
//! Fatal problems come back as [`RebinError`]; zero-padding conditions come
//! back as [`RebinWarning`] values for the caller to surface.

use super::broadcast::Batch;
use super::model::{OverlapSide, RebinWarning};
use crate::error::{RebinError, Result};

/// Absolute tolerance under which an edge difference counts as zero.
pub const EDGE_ATOL: f64 = 1e-8;

/// Fail unless `ndim` is one of `allowed`.
pub fn check_ndim(ndim: usize, shape: &[usize], allowed: &[usize], name: &str) -> Result<()> {
    if allowed.contains(&ndim) {
        return Ok(());
    }
    let wanted = allowed
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(" or ");
    Err(RebinError::Shape(format!("{name}{shape:?} is not {wanted}D")))
}

/// Fail unless `other` has the same shape as `spectra`.
///
/// With `edges` set, `other` is an edge array and its trailing axis must hold
/// one more value than the spectra have bins.
pub fn check_shape(
    spectra: &[usize],
    other: &[usize],
    spectra_name: &str,
    other_name: &str,
    edges: bool,
) -> Result<()> {
    let mut implied = other.to_vec();
    if edges {
        match implied.last_mut() {
            Some(last) if *last > 0 => *last -= 1,
            _ => {
                return Err(RebinError::Shape(format!(
                    "{other_name}{other:?} holds no edges"
                )))
            }
        }
    }
    if implied != spectra {
        return Err(RebinError::Shape(format!(
            "{spectra_name}{spectra:?} does not have a shape compatible with \
             {other_name}{implied:?}"
        )));
    }
    Ok(())
}

/// Output edges must describe at least one bin.
pub fn check_output_edges(out_edges: &[f64]) -> Result<()> {
    if out_edges.len() < 2 {
        return Err(RebinError::Shape(format!(
            "out_edges[{}] needs at least two edges",
            out_edges.len()
        )));
    }
    Ok(())
}

/// Neighbouring edges must increase; differences within [`EDGE_ATOL`] of zero pass.
pub fn check_monotonic_increasing(edges: &[f64], name: &'static str) -> Result<()> {
    let ok = edges.windows(2).all(|pair| {
        let d = pair[1] - pair[0];
        d > 0.0 || d.abs() <= EDGE_ATOL
    });
    if ok {
        Ok(())
    } else {
        Err(RebinError::NonMonotonic {
            name,
            edges: edges.to_vec(),
        })
    }
}

/// Row-wise [`check_monotonic_increasing`] for batched edges.
pub fn check_batch_monotonic(edges: &Batch<f64>, name: &'static str) -> Result<()> {
    edges
        .rows()
        .try_for_each(|row| check_monotonic_increasing(row, name))
}

/// Fail when any spectrum's input range lies wholly left or right of the output range.
///
/// ```text
///   in:   └┴┴┴┴┘                  in:            └┴┴┴┴┘
///   out:          └┴┴┴┘           out:  └┴┴┴┘
/// ```
pub fn check_any_overlap(in_edges: &Batch<f64>, out_edges: &[f64]) -> Result<()> {
    let (out_first, out_last) = out_range(out_edges);
    if in_edges.rows().any(|row| row_last(row) <= out_first) {
        return Err(RebinError::NoOverlap { direction: "smaller" });
    }
    if in_edges.rows().any(|row| row_first(row) >= out_last) {
        return Err(RebinError::NoOverlap { direction: "larger" });
    }
    Ok(())
}

/// Report each side on which the output extends past some spectrum's input range.
///
/// ```text
///   in:     └┴┴ ...          in:   ... ┴┴┴┘
///   out:  └┴┴┴┴ ...          out:  ... ┴┴┴┴┴┘
/// ```
pub fn check_partial_overlap(in_edges: &Batch<f64>, out_edges: &[f64]) -> Vec<RebinWarning> {
    let (out_first, out_last) = out_range(out_edges);
    let mut warnings = Vec::new();
    if in_edges.rows().any(|row| row_first(row) > out_first) {
        warnings.push(RebinWarning::PartialOverlap { side: OverlapSide::Left });
    }
    if in_edges.rows().any(|row| row_last(row) < out_last) {
        warnings.push(RebinWarning::PartialOverlap { side: OverlapSide::Right });
    }
    warnings
}

fn out_range(out_edges: &[f64]) -> (f64, f64) {
    (
        out_edges.first().copied().unwrap_or(f64::NAN),
        out_edges.last().copied().unwrap_or(f64::NAN),
    )
}

fn row_first(row: &[f64]) -> f64 {
    row.first().copied().unwrap_or(f64::NAN)
}

fn row_last(row: &[f64]) -> f64 {
    row.last().copied().unwrap_or(f64::NAN)
}
