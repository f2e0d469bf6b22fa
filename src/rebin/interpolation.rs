//! Deterministic rebinning by piecewise-linear interpolation.
//!
//! Each input bin's count is the area under a line `y = m·x + b` across the bin.
//! Output bins collect the area of every input line over their intersection with
//! the input bin, found with two monotone cursors (one per edge array), so a
//! spectrum costs `O(n_in + n_out)`.
//!
//! Counts from input bins left of the first output edge land in the first output
//! bin, and counts right of the last output edge land in the last output bin.
//! Output bins outside the input range stay zero. Fractional counts are normal:
//! the method does not keep Poisson statistics.

/// Slopes smaller than this in magnitude are treated as flat.
pub const FLAT_SLOPE_THRESHOLD: f64 = 1e-6;

/// Offset `b` of the line `y = m·x + b` whose integral over `[low, high]` is `counts`.
pub fn linear_offset(slope: f64, counts: f64, low: f64, high: f64) -> f64 {
    if slope.abs() < FLAT_SLOPE_THRESHOLD {
        counts / (high - low)
    } else {
        (counts - slope / 2.0 * (high * high - low * low)) / (high - low)
    }
}

/// Antiderivative of `y = m·x + b` evaluated at `x`.
fn antiderivative(x: f64, m: f64, b: f64) -> f64 {
    m * x * x / 2.0 + b * x
}

/// Definite integral of `y = m·x + b` over `[low, high]`.
pub fn line_integral(m: f64, b: f64, low: f64, high: f64) -> f64 {
    antiderivative(high, m, b) - antiderivative(low, m, b)
}

/// Rebin one spectrum.
///
/// `in_edges` holds `counts.len() + 1` values, `slopes` one per input bin and
/// `out_edges` at least two values; all edges are increasing. Returns one value
/// per output bin.
pub fn interpolate_spectrum(
    counts: &[f64],
    in_edges: &[f64],
    out_edges: &[f64],
    slopes: &[f64],
) -> Vec<f64> {
    let n_out = out_edges.len().saturating_sub(1);
    let mut out = vec![0.0; n_out];
    if n_out == 0 || counts.is_empty() {
        return out;
    }
    let last_out = n_out - 1;

    // First input bin that reaches the first output edge.
    let first_in = in_edges
        .partition_point(|&e| e < out_edges[0])
        .saturating_sub(1)
        .min(counts.len());

    // Underflow: whole input bins left of the output range.
    out[0] += counts[..first_in].iter().sum::<f64>();

    // First output bin that reaches the first input edge. The last output bin
    // is open to the right, so its right edge takes no part in the search.
    let mut out_idx = out_edges[..n_out]
        .partition_point(|&e| e < in_edges[0])
        .saturating_sub(1);

    for in_idx in first_in..counts.len() {
        let in_left = in_edges[in_idx];
        let in_right = in_edges[in_idx + 1];
        if in_right <= in_left {
            // Zero-width bin: its counts sit at a single energy.
            while out_idx < last_out && out_edges[out_idx + 1] <= in_left {
                out_idx += 1;
            }
            out[out_idx] += counts[in_idx];
            continue;
        }
        let slope = slopes[in_idx];
        let offset = linear_offset(slope, counts[in_idx], in_left, in_right);

        let mut j = out_idx;
        loop {
            if out_edges[j] > in_right {
                // Output bin j - 1 is not exhausted yet; the next input bin resumes there.
                out_idx = j.saturating_sub(1);
                break;
            }
            let low = if j == 0 {
                in_left
            } else {
                in_left.max(out_edges[j])
            };
            let high = if j == last_out {
                in_right
            } else {
                in_right.min(out_edges[j + 1])
            };
            out[j] += line_integral(slope, offset, low, high);

            if j == last_out {
                // Overflow: every remaining input bin belongs to the last output bin.
                out_idx = j;
                break;
            }
            j += 1;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_all_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(*a, *e, epsilon = 1e-9);
        }
    }

    #[test]
    fn flat_offset_is_density() {
        assert_abs_diff_eq!(linear_offset(0.0, 10.0, 2.0, 4.0), 5.0);
        assert_abs_diff_eq!(linear_offset(1e-7, 10.0, 2.0, 4.0), 5.0);
    }

    #[test]
    fn sloped_line_integrates_back_to_counts() {
        let (m, c, lo, hi) = (0.5, 12.0, 1.0, 3.0);
        let b = linear_offset(m, c, lo, hi);
        assert_abs_diff_eq!(line_integral(m, b, lo, hi), c, epsilon = 1e-12);
    }

    #[test]
    fn identical_edges_return_input() {
        let edges = [0.0, 1.0, 2.0, 3.0];
        let counts = [1.0, 2.0, 3.0];
        let out = interpolate_spectrum(&counts, &edges, &edges, &[0.0; 3]);
        assert_all_close(&out, &counts);
    }

    #[test]
    fn halving_bins_splits_counts_evenly() {
        let out = interpolate_spectrum(&[10.0, 20.0], &[0.0, 2.0, 4.0], &[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0; 2]);
        assert_all_close(&out, &[5.0, 5.0, 10.0, 10.0]);
    }

    #[test]
    fn merging_bins_adds_counts() {
        let out = interpolate_spectrum(
            &[1.0, 2.0, 3.0, 4.0],
            &[0.0, 1.0, 2.0, 3.0, 4.0],
            &[0.0, 2.0, 4.0],
            &[0.0; 4],
        );
        assert_all_close(&out, &[3.0, 7.0]);
    }

    #[test]
    fn misaligned_edges_split_proportionally() {
        let out = interpolate_spectrum(&[10.0, 10.0], &[0.0, 1.0, 2.0], &[0.0, 0.5, 1.5, 2.0], &[0.0; 2]);
        assert_all_close(&out, &[5.0, 10.0, 5.0]);
    }

    #[test]
    fn slope_shifts_counts_within_bin() {
        // density y = x + b over [0, 2] with area 4 -> b = 1; left half holds 1.5
        let out = interpolate_spectrum(&[4.0], &[0.0, 2.0], &[0.0, 1.0, 2.0], &[1.0]);
        assert_all_close(&out, &[1.5, 2.5]);
    }

    #[test]
    fn underflow_and_overflow_go_to_edge_bins() {
        let out = interpolate_spectrum(
            &[1.0, 2.0, 3.0, 4.0, 5.0],
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            &[1.5, 2.5, 3.5],
            &[0.0; 5],
        );
        // [0,1) whole + [1,2) whole (uncapped low) + half of [2,3)
        // half of [2,3) + [3,4) whole + [4,5) whole (uncapped high)
        assert_all_close(&out, &[1.0 + 2.0 + 1.5, 1.5 + 4.0 + 5.0]);
        assert_abs_diff_eq!(out.iter().sum::<f64>(), 15.0, epsilon = 1e-9);
    }

    #[test]
    fn uncovered_output_bins_are_zero() {
        let out = interpolate_spectrum(&[10.0, 10.0, 10.0], &[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0; 3]);
        assert_all_close(&out, &[10.0, 10.0, 10.0, 0.0]);

        let out = interpolate_spectrum(&[10.0, 10.0], &[2.0, 3.0, 4.0], &[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0; 2]);
        assert_all_close(&out, &[0.0, 0.0, 10.0, 10.0]);
    }

    #[test]
    fn single_output_bin_collects_everything() {
        let out = interpolate_spectrum(&[1.0, 2.0, 3.0], &[0.0, 1.0, 2.0, 3.0], &[1.2, 1.8], &[0.0; 3]);
        assert_all_close(&out, &[6.0]);
    }

    #[test]
    fn zero_width_bin_lands_in_containing_output_bin() {
        let out = interpolate_spectrum(
            &[2.0, 5.0, 2.0],
            &[0.0, 1.5, 1.5, 3.0],
            &[0.0, 1.0, 2.0, 3.0],
            &[0.0; 3],
        );
        assert_all_close(&out, &[4.0 / 3.0, 2.0 / 3.0 + 5.0 + 2.0 / 3.0, 4.0 / 3.0]);
    }

    #[test]
    fn empty_spectrum_gives_zeros() {
        let out = interpolate_spectrum(&[], &[0.0], &[0.0, 1.0, 2.0], &[]);
        assert_all_close(&out, &[0.0, 0.0]);
    }
}
