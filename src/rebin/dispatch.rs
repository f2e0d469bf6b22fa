//! Public rebin entry points: preprocessing, validation and parallel kernel runs.

use ndarray::{Array1, Array2, ArrayBase, ArrayD, ArrayViewD, Data, Dimension};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use super::broadcast::{broadcast_to_batch, Batch};
use super::interpolation::interpolate_spectrum;
use super::listmode::{prepare_counts, resample_spectrum, total_events};
use super::model::{Method, RebinOptions, Rebinned, RebinnedSpectra};
use super::validate;
use crate::error::{RebinError, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Rebin one spectrum (1-D) or a batch of spectra (2-D, one spectrum per row)
/// from `in_edges` onto `out_edges`.
///
/// `in_edges` is either shared by every spectrum (1-D) or given per spectrum
/// (2-D); `out_edges` is always 1-D. The output keeps the batching of
/// `spectra`. Fatal problems abort with a [`RebinError`]; non-fatal ones come
/// back in [`Rebinned::warnings`].
pub fn rebin<S1, D1, S2, D2, S3, D3>(
    spectra: &ArrayBase<S1, D1>,
    in_edges: &ArrayBase<S2, D2>,
    out_edges: &ArrayBase<S3, D3>,
    options: &RebinOptions,
) -> Result<Rebinned>
where
    S1: Data<Elem = f64>,
    D1: Dimension,
    S2: Data<Elem = f64>,
    D2: Dimension,
    S3: Data<Elem = f64>,
    D3: Dimension,
{
    rebin_dyn(
        spectra.view().into_dyn(),
        in_edges.view().into_dyn(),
        out_edges.view().into_dyn(),
        None,
        options,
    )
}

/// [`rebin`] with per-bin slopes of the in-bin count density.
///
/// Slopes have the shape of `spectra` (or are 1-D and shared across a batch).
/// Only the interpolation method uses them.
pub fn rebin_with_slopes<S1, D1, S2, D2, S3, D3, S4, D4>(
    spectra: &ArrayBase<S1, D1>,
    in_edges: &ArrayBase<S2, D2>,
    out_edges: &ArrayBase<S3, D3>,
    slopes: &ArrayBase<S4, D4>,
    options: &RebinOptions,
) -> Result<Rebinned>
where
    S1: Data<Elem = f64>,
    D1: Dimension,
    S2: Data<Elem = f64>,
    D2: Dimension,
    S3: Data<Elem = f64>,
    D3: Dimension,
    S4: Data<Elem = f64>,
    D4: Dimension,
{
    rebin_dyn(
        spectra.view().into_dyn(),
        in_edges.view().into_dyn(),
        out_edges.view().into_dyn(),
        Some(slopes.view().into_dyn()),
        options,
    )
}

/// Dynamic-rank form of [`rebin`]; ranks are checked at runtime.
pub fn rebin_dyn(
    spectra: ArrayViewD<'_, f64>,
    in_edges: ArrayViewD<'_, f64>,
    out_edges: ArrayViewD<'_, f64>,
    slopes: Option<ArrayViewD<'_, f64>>,
    options: &RebinOptions,
) -> Result<Rebinned> {
    let mut warnings = Vec::new();
    let raw_spectra = Batch::from_view(&spectra);

    // Method-specific preprocessing comes first, as listmode rejects its input
    // before any shape is looked at.
    let counts = match options.method {
        Method::Listmode => {
            let (counts, precision) = prepare_counts(&raw_spectra)?;
            warnings.extend(precision);
            Some(counts)
        }
        Method::Interpolation => None,
    };

    let prepared = prepare(&raw_spectra, &in_edges, &out_edges, slopes.as_ref())?;
    if options.warn_on_partial_overlap {
        warnings.extend(validate::check_partial_overlap(&prepared.in_edges, &prepared.out_edges));
    }
    for warning in &warnings {
        log::warn!("{warning}");
    }

    log::debug!(
        "rebinning {} spectra of {} bins onto {} bins ({})",
        raw_spectra.n_rows(),
        raw_spectra.width(),
        prepared.out_edges.len() - 1,
        options.method
    );

    let spectra = match counts {
        Some(counts) => RebinnedSpectra::Listmode(run_listmode(&counts, &prepared, options)?),
        None => RebinnedSpectra::Interpolated(run_interpolation(&raw_spectra, &prepared)),
    };

    Ok(Rebinned { spectra, warnings })
}

// ---------------------------------------------------------------------------
// Preparation: broadcast + validate
// ---------------------------------------------------------------------------

struct Prepared {
    in_edges: Batch<f64>,
    out_edges: Vec<f64>,
    slopes: Batch<f64>,
}

fn prepare(
    spectra: &Batch<f64>,
    in_edges: &ArrayViewD<'_, f64>,
    out_edges: &ArrayViewD<'_, f64>,
    slopes: Option<&ArrayViewD<'_, f64>>,
) -> Result<Prepared> {
    let shape = spectra.shape();
    let in_edges = broadcast_to_batch(in_edges, shape);
    let slopes = match slopes {
        Some(s) => broadcast_to_batch(s, shape),
        None => Batch::from_parts(vec![0.0; spectra.values().len()], shape.to_vec()),
    };
    let out_edges = Batch::from_view(out_edges);

    validate::check_ndim(spectra.ndim(), shape, &[1, 2], "in_spectra")?;
    validate::check_ndim(in_edges.ndim(), in_edges.shape(), &[1, 2], "in_edges")?;
    validate::check_ndim(slopes.ndim(), slopes.shape(), &[1, 2], "slopes")?;
    validate::check_ndim(out_edges.ndim(), out_edges.shape(), &[1], "out_edges")?;

    validate::check_shape(shape, in_edges.shape(), "in_spectra", "in_edges", true)?;
    validate::check_shape(shape, slopes.shape(), "in_spectra", "slopes", false)?;
    validate::check_output_edges(out_edges.values())?;

    validate::check_batch_monotonic(&in_edges, "in_edges")?;
    validate::check_monotonic_increasing(out_edges.values(), "out_edges")?;

    validate::check_any_overlap(&in_edges, out_edges.values())?;

    Ok(Prepared {
        in_edges,
        out_edges: out_edges.values().to_vec(),
        slopes,
    })
}

// ---------------------------------------------------------------------------
// Batch execution
// ---------------------------------------------------------------------------

fn run_interpolation(spectra: &Batch<f64>, prepared: &Prepared) -> ArrayD<f64> {
    let rows: Vec<Vec<f64>> = (0..spectra.n_rows())
        .into_par_iter()
        .map(|i| {
            interpolate_spectrum(
                spectra.row(i),
                prepared.in_edges.row(i),
                &prepared.out_edges,
                prepared.slopes.row(i),
            )
        })
        .collect();
    assemble(rows, spectra.ndim(), prepared.out_edges.len() - 1)
}

fn run_listmode(counts: &Batch<u64>, prepared: &Prepared, options: &RebinOptions) -> Result<ArrayD<u64>> {
    for (index, row) in counts.rows().enumerate() {
        let events = total_events(row)?;
        if let Some(limit) = options.max_events.filter(|&limit| events > limit) {
            return Err(RebinError::TooManyEvents { index, events, limit });
        }
    }

    let rows = (0..counts.n_rows())
        .into_par_iter()
        .map(|i| {
            let mut rng = match options.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(i as u64)),
                None => StdRng::from_os_rng(),
            };
            resample_spectrum(counts.row(i), prepared.in_edges.row(i), &prepared.out_edges, &mut rng)
        })
        .collect::<Result<Vec<Vec<u64>>>>()?;
    Ok(assemble(rows, counts.ndim(), prepared.out_edges.len() - 1))
}

/// Gather per-spectrum rows back into the caller's batching convention.
fn assemble<T: Copy>(rows: Vec<Vec<T>>, ndim: usize, n_out: usize) -> ArrayD<T> {
    if ndim == 1 {
        let row = rows.into_iter().next().unwrap_or_default();
        return Array1::from_vec(row).into_dyn();
    }
    Array2::from_shape_fn((rows.len(), n_out), |(i, j)| rows[i][j]).into_dyn()
}
