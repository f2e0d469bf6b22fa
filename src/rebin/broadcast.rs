//! Owned batch buffers and broadcasting of shared edges/slopes across a batch.

use ndarray::ArrayViewD;

// ---------------------------------------------------------------------------
// Batch – owned, contiguous, row-major copy of a 1-D or 2-D array
// ---------------------------------------------------------------------------

/// Owned row-major buffer with a leading batch axis and a trailing bin axis.
///
/// A 1-D array is a batch of exactly one row. `shape` keeps the logical shape
/// (rank 1 or 2) so shape checks can compare against the spectra they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    data: Vec<T>,
    shape: Vec<usize>,
}

impl<T: Copy> Batch<T> {
    /// Copy an arbitrary view into logical (row-major) order.
    pub fn from_view(view: &ArrayViewD<'_, T>) -> Self {
        Self {
            data: view.iter().copied().collect(),
            shape: view.shape().to_vec(),
        }
    }

    /// Build a batch from raw parts; `data.len()` must equal the product of `shape`.
    pub fn from_parts(data: Vec<T>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(data.len(), shape.iter().product::<usize>());
        Self { data, shape }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Length of every row (the trailing axis).
    pub fn width(&self) -> usize {
        self.shape.last().copied().unwrap_or(0)
    }

    pub fn n_rows(&self) -> usize {
        match self.shape.len() {
            0 | 1 => 1,
            _ => self.shape[..self.shape.len() - 1].iter().product(),
        }
    }

    pub fn row(&self, index: usize) -> &[T] {
        let w = self.width();
        &self.data[index * w..(index + 1) * w]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> + '_ {
        (0..self.n_rows()).map(move |i| self.row(i))
    }

    pub fn values(&self) -> &[T] {
        &self.data
    }

    pub fn map<U: Copy>(&self, f: impl Fn(T) -> U) -> Batch<U> {
        Batch {
            data: self.data.iter().map(|&v| f(v)).collect(),
            shape: self.shape.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Broadcasting
// ---------------------------------------------------------------------------

/// Expand a 1-D edges/slopes array shared across a 2-D batch of spectra into one
/// copy per spectrum.
///
/// Anything else (already 2-D, or a 1-D spectrum) is copied unchanged; shape
/// compatibility is checked afterwards by the validator.
pub fn broadcast_to_batch(arr: &ArrayViewD<'_, f64>, spectra_shape: &[usize]) -> Batch<f64> {
    if arr.ndim() == 1 && spectra_shape.len() == 2 {
        let n_rows = spectra_shape[0];
        let row: Vec<f64> = arr.iter().copied().collect();
        let width = row.len();
        let mut data = Vec::with_capacity(n_rows * width);
        for _ in 0..n_rows {
            data.extend_from_slice(&row);
        }
        Batch::from_parts(data, vec![n_rows, width])
    } else {
        Batch::from_view(arr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn shared_edges_are_copied_per_spectrum() {
        let edges = arr1(&[0.0, 1.0, 2.0]);
        let batch = broadcast_to_batch(&edges.view().into_dyn(), &[3, 2]);
        assert_eq!(batch.shape(), &[3, 3]);
        for row in batch.rows() {
            assert_eq!(row, &[0.0, 1.0, 2.0]);
        }
    }

    #[test]
    fn two_dimensional_input_is_unchanged() {
        let edges = arr2(&[[0.0, 1.0], [1.0, 2.0]]);
        let batch = broadcast_to_batch(&edges.view().into_dyn(), &[2, 1]);
        assert_eq!(batch.shape(), &[2, 2]);
        assert_eq!(batch.row(1), &[1.0, 2.0]);
    }

    #[test]
    fn unbatched_spectrum_keeps_one_dimensional_edges() {
        let edges = arr1(&[0.0, 1.0, 2.0]);
        let batch = broadcast_to_batch(&edges.view().into_dyn(), &[2]);
        assert_eq!(batch.shape(), &[3]);
        assert_eq!(batch.n_rows(), 1);
        assert_eq!(batch.row(0), &[0.0, 1.0, 2.0]);
    }

    #[test]
    fn transposed_views_are_copied_in_logical_order() {
        let a = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let t = a.t();
        let batch = Batch::from_view(&t.into_dyn());
        assert_eq!(batch.row(0), &[1.0, 3.0]);
        assert_eq!(batch.row(1), &[2.0, 4.0]);
    }

    #[test]
    fn zero_width_rows_are_empty_slices() {
        let batch: Batch<f64> = Batch::from_parts(Vec::new(), vec![3, 0]);
        assert_eq!(batch.n_rows(), 3);
        assert!(batch.row(2).is_empty());
    }
}
