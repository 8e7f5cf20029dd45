// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! This module contains the implementation of the block averaging error estimation.
//!
//! The estimation proceeds in three steps:
//! 1. [`BlockVariances`] collects the variance of block averages for a grid of block sizes.
//! 2. [`CorrelationFit`] fits a saturation curve to the block variances, obtaining the correlation length.
//! 3. [`effective_samples`] and [`averror`] convert the correlation length into
//!    an effective number of samples and the standard error of the mean.
//!
//! [`ErrorEstimate`] performs all three steps at once.

use ndarray::{ArrayView, ArrayView1, Dimension, Ix1};

use crate::errors::EstimationError;

pub mod estimate;
pub mod fit;
pub mod grid;
pub mod variance;

pub use estimate::{averror, effective_samples, ErrorEstimate};
pub use fit::CorrelationFit;
pub use grid::BlockSizes;
pub use variance::BlockVariances;

/// Minimal number of samples required to fit the correlation length.
/// Shorter series provide fewer than two block sizes.
pub const MIN_SAMPLES_FOR_FIT: usize = 21;

/// Check that the series is one-dimensional and convert it.
pub(crate) fn one_dimensional<D: Dimension>(
    series: ArrayView<f64, D>,
) -> Result<ArrayView1<'_, f64>, EstimationError> {
    let shape = series.shape().to_vec();
    series
        .into_dimensionality::<Ix1>()
        .map_err(|_| EstimationError::InvalidShape(shape))
}
