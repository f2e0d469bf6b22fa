//! Stochastic rebinning through synthetic listmode events.
//!
//! Every count of an input bin becomes one event drawn uniformly inside that
//! bin; the events are then histogrammed on the output edges with the outermost
//! edges opened to `-inf` / `+inf`, so no event is lost to under- or overflow.

use rand::Rng;

use super::broadcast::Batch;
use super::model::RebinWarning;
use crate::error::{RebinError, Result};

const ROUND_ATOL: f64 = 1e-8;
const ROUND_RTOL: f64 = 1e-5;

/// 2^64: the first rounded count that no longer fits a `u64`.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

// ---------------------------------------------------------------------------
// Input preparation
// ---------------------------------------------------------------------------

/// Turn floating-point spectra into integer event counts.
///
/// Rejects negative, non-finite, all-below-one and `u64`-overflowing input.
/// Values are rounded half to even; a [`RebinWarning::PrecisionLoss`] is
/// returned when rounding moved any value by more than a numerical tolerance.
pub fn prepare_counts(spectra: &Batch<f64>) -> Result<(Batch<u64>, Option<RebinWarning>)> {
    let values = spectra.values();
    if values.iter().any(|&v| v < 0.0) {
        return Err(RebinError::NegativeCounts);
    }
    if values.iter().all(|&v| v < 1.0) {
        return Err(RebinError::AllBelowOne);
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(RebinError::NonFiniteCounts);
    }
    if let Some(&value) = values.iter().find(|v| v.round_ties_even() >= U64_LIMIT) {
        return Err(RebinError::CountTooLarge { value });
    }

    let mut changed = 0usize;
    let mut max_deviation = 0.0f64;
    for &v in values {
        let rounded = v.round_ties_even();
        let deviation = (v - rounded).abs();
        if deviation > ROUND_ATOL + ROUND_RTOL * rounded.abs() {
            changed += 1;
            max_deviation = max_deviation.max(deviation);
        }
    }
    let warning = (changed > 0).then_some(RebinWarning::PrecisionLoss {
        changed,
        max_deviation,
    });

    Ok((spectra.map(|v| v.round_ties_even() as u64), warning))
}

// ---------------------------------------------------------------------------
// Kernel
// ---------------------------------------------------------------------------

/// Total number of events in one spectrum, or [`RebinError::EventOverflow`].
pub fn total_events(counts: &[u64]) -> Result<u64> {
    counts
        .iter()
        .try_fold(0u64, |acc, &n| acc.checked_add(n))
        .ok_or(RebinError::EventOverflow)
}

/// Draw `counts[i]` event energies uniformly in `[in_edges[i], in_edges[i + 1])`
/// for every input bin, in bin order.
///
/// The event buffer is reserved up front; a total that cannot be held in memory
/// fails with [`RebinError::EventAllocation`] instead of aborting.
pub fn expand_to_listmode<R: Rng + ?Sized>(counts: &[u64], in_edges: &[f64], rng: &mut R) -> Result<Vec<f64>> {
    let total = total_events(counts)?;
    let mut events = Vec::new();
    usize::try_from(total)
        .ok()
        .and_then(|n| events.try_reserve_exact(n).ok())
        .ok_or(RebinError::EventAllocation { events: total })?;
    for (i, &n) in counts.iter().enumerate() {
        let left = in_edges[i];
        let width = in_edges[i + 1] - left;
        for _ in 0..n {
            events.push(left + width * rng.random::<f64>());
        }
    }
    Ok(events)
}

/// Histogram events on `out_edges`, treating the first and last edge as
/// `-inf` and `+inf`. Bins are half-open `[e_j, e_{j+1})`.
pub fn histogram_open_ended(events: &[f64], out_edges: &[f64]) -> Vec<u64> {
    let n_out = out_edges.len().saturating_sub(1);
    let mut out = vec![0u64; n_out];
    if n_out == 0 {
        return out;
    }
    let inner = &out_edges[1..n_out];
    for &e in events {
        out[inner.partition_point(|&edge| edge <= e)] += 1;
    }
    out
}

/// Rebin one spectrum of integer counts by event resampling.
pub fn resample_spectrum<R: Rng + ?Sized>(
    counts: &[u64],
    in_edges: &[f64],
    out_edges: &[f64],
    rng: &mut R,
) -> Result<Vec<u64>> {
    let events = expand_to_listmode(counts, in_edges, rng)?;
    Ok(histogram_open_ended(&events, out_edges))
}
