// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Variances of block averages collected for a range of block sizes.

use getset::{CopyGetters, Getters};
use ndarray::{s, ArrayView, ArrayView1, Axis, Dimension};

use super::{grid::BlockSizes, one_dimensional};
use crate::{errors::EstimationError, PANIC_MESSAGE};

/// Uncertainty of block averages of a series as a function of block size.
///
/// For every block size `bs` of the grid, the series is truncated to a multiple of `bs`,
/// split into `nb` consecutive blocks and averaged blockwise. The recorded value is the
/// sample variance of the block averages divided by `nb - 1`.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct BlockVariances {
    /// Number of samples in the analyzed series.
    #[getset(get_copy = "pub")]
    pub(super) n_samples: usize,
    /// Block sizes (in samples), strictly increasing.
    #[getset(get = "pub")]
    pub(super) block_sizes: Vec<usize>,
    /// Recorded variance for each block size.
    #[getset(get = "pub")]
    pub(super) variances: Vec<f64>,
}

impl BlockVariances {
    /// Collect block variances for a series.
    ///
    /// ## Errors
    /// Returns `EstimationError::InvalidShape` if the series is not one-dimensional.
    ///
    /// ## Example
    /// ```
    /// use blockerr::prelude::*;
    /// use ndarray::Array1;
    ///
    /// let series = Array1::from_iter((0..100).map(|x| (x as f64).sin()));
    /// let blocks = BlockVariances::new(series.view()).unwrap();
    ///
    /// assert_eq!(blocks.n_samples(), 100);
    /// assert_eq!(blocks.block_sizes(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    /// ```
    pub fn new<D: Dimension>(series: ArrayView<f64, D>) -> Result<Self, EstimationError> {
        Ok(Self::from_series(one_dimensional(series)?))
    }

    /// Collect block variances for a one-dimensional series.
    pub fn from_series(series: ArrayView1<f64>) -> Self {
        // reshaping into blocks requires contiguous data
        let series = series.as_standard_layout();
        let n_samples = series.len();

        // block averages of a constant series may differ in the last digits
        let constant = series
            .first()
            .is_some_and(|first| series.iter().all(|x| x == first));

        let (block_sizes, variances) = BlockSizes::new(n_samples)
            .map(|bs| {
                let variance = if constant {
                    0.0
                } else {
                    block_variance(series.view(), bs)
                };
                (bs, variance)
            })
            .unzip();

        BlockVariances {
            n_samples,
            block_sizes,
            variances,
        }
    }

    /// Number of block sizes analyzed.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.block_sizes.len()
    }

    /// No block size could be analyzed.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.block_sizes.is_empty()
    }

    /// Iterate over pairs of block size and recorded variance.
    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.block_sizes
            .iter()
            .copied()
            .zip(self.variances.iter().copied())
    }
}

/// Calculate the variance of block averages for a given block size,
/// divided by the number of blocks minus one.
///
/// The series must be contiguous and must contain at least two blocks.
fn block_variance(series: ArrayView1<f64>, block_size: usize) -> f64 {
    let n_blocks = series.len() / block_size;

    let blocks = series
        .slice(s![..n_blocks * block_size])
        .into_shape_with_order((n_blocks, block_size))
        .expect(PANIC_MESSAGE);

    let averages = blocks.mean_axis(Axis(1)).expect(PANIC_MESSAGE);

    averages.var(1.0) / (n_blocks - 1) as f64
}
