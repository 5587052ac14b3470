//! Row-wise evaluation of point kernels over a field.
//!
//! Every stepper computes one output field from read-only inputs, one grid
//! row at a time. Rows are independent, so with the `parallel` feature they
//! are distributed over the rayon thread pool; the result is identical to the
//! sequential path.

use crate::state::Field2D;

/// Counters gathered while evaluating a kernel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct RowStats {
    /// Values clamped to a sanity bound
    pub clamped: usize,
    /// Non-finite values produced
    pub non_finite: usize,
}

impl RowStats {
    #[inline]
    pub fn merge(self, other: Self) -> Self {
        Self {
            clamped: self.clamped + other.clamped,
            non_finite: self.non_finite + other.non_finite,
        }
    }
}

/// Evaluate `kernel(j, row)` for every interior row `j` of `out`.
///
/// `row` is the full stored row (halo columns included); use
/// [`GridExtent::col_of`](crate::grid::GridExtent::col_of) to address it.
pub(crate) fn map_rows<F>(out: &mut Field2D, kernel: F) -> RowStats
where
    F: Fn(isize, &mut [f64]) -> RowStats + Sync + Send,
{
    let extent = out.extent();
    let row_len = extent.row_len();
    let halo = extent.halo;
    let ny = extent.ny;

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        out.as_mut_slice()
            .par_chunks_mut(row_len)
            .enumerate()
            .filter(|(row, _)| *row >= halo && *row < halo + ny)
            .map(|(row, data)| kernel(extent.j_of_row(row), data))
            .reduce(RowStats::default, RowStats::merge)
    }

    #[cfg(not(feature = "parallel"))]
    {
        out.as_mut_slice()
            .chunks_mut(row_len)
            .enumerate()
            .filter(|(row, _)| *row >= halo && *row < halo + ny)
            .map(|(row, data)| kernel(extent.j_of_row(row), data))
            .fold(RowStats::default(), RowStats::merge)
    }
}
