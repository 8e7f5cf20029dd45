// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Effective number of samples and standard error of the mean of correlated series.

use getset::{CopyGetters, Getters};
use ndarray::{ArrayView, ArrayView1, Dimension};

use super::{fit::CorrelationFit, one_dimensional, variance::BlockVariances};
use crate::errors::EstimationError;

/// Estimate the number of statistically independent samples in a series.
///
/// The correlation length `tau` is fitted to the block variances of the series
/// and the effective number of samples is `n_samples / tau`.
///
/// ## Errors
/// - `EstimationError::InvalidShape` if the series is not one-dimensional.
/// - `EstimationError::InsufficientData` if the series is too short for the fit.
///
/// ## Example
/// ```
/// use blockerr::prelude::*;
/// use ndarray::Array1;
///
/// // every value is repeated 10 times
/// let series = Array1::from_iter((0..5000).map(|i| ((i / 10) as f64 * 0.7).sin()));
/// let n_eff = effective_samples(series.view()).unwrap();
///
/// assert!(n_eff < 5000.0);
/// ```
pub fn effective_samples<D: Dimension>(series: ArrayView<f64, D>) -> Result<f64, EstimationError> {
    let series = one_dimensional(series)?;
    let blocks = BlockVariances::from_series(series);
    let fit = CorrelationFit::new(&blocks)?;

    Ok(series.len() as f64 / fit.correlation_length())
}

/// Calculate the standard error of the mean of a series.
///
/// The error is `std / sqrt(n - 1)` where `std` is the population standard deviation
/// of the series and `n` is the provided number of samples. If `n_samples` is `None`,
/// the length of the series is used. NaN is returned if the number of samples is not
/// higher than 1.
///
/// ## Errors
/// Returns `EstimationError::InvalidShape` if the series is not one-dimensional.
///
/// ## Example
/// ```
/// use blockerr::prelude::*;
/// use ndarray::arr1;
///
/// let series = arr1(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
/// let error = averror(series.view(), None).unwrap();
/// assert!((error - 8.25f64.sqrt() / 3.0).abs() < 1e-12);
///
/// assert!(averror(series.view(), Some(1.0)).unwrap().is_nan());
/// ```
pub fn averror<D: Dimension>(
    series: ArrayView<f64, D>,
    n_samples: Option<f64>,
) -> Result<f64, EstimationError> {
    Ok(standard_error(one_dimensional(series)?, n_samples))
}

/// Standard error of the mean of a one-dimensional series.
fn standard_error(series: ArrayView1<f64>, n_samples: Option<f64>) -> f64 {
    let n = n_samples.unwrap_or(series.len() as f64);
    if n <= 1.0 || series.is_empty() {
        return f64::NAN;
    }

    population_std(series) / (n - 1.0).sqrt()
}

/// Population standard deviation (divisor `n`) of a non-empty series.
#[inline(always)]
fn population_std(series: ArrayView1<f64>) -> f64 {
    let values = series.to_vec();
    statistical::population_standard_deviation(&values, None)
}

/// Complete error estimate of the mean of a correlated series.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct ErrorEstimate {
    /// Number of samples in the series.
    #[getset(get_copy = "pub")]
    n_samples: usize,
    /// Mean of the series.
    #[getset(get_copy = "pub")]
    mean: f64,
    /// Population standard deviation of the series.
    #[getset(get_copy = "pub")]
    std: f64,
    /// Standard error of the mean assuming uncorrelated samples.
    #[getset(get_copy = "pub")]
    naive_error: f64,
    /// Block variances of the series.
    #[getset(get = "pub")]
    blocks: BlockVariances,
    /// Fit of the correlation length.
    #[getset(get = "pub")]
    fit: CorrelationFit,
    /// Effective number of independent samples.
    #[getset(get_copy = "pub")]
    n_effective: f64,
    /// Standard error of the mean calculated from the effective number of samples.
    #[getset(get_copy = "pub")]
    error: f64,
}

impl ErrorEstimate {
    /// Estimate the error of the mean of a series, accounting for correlation between samples.
    ///
    /// ## Errors
    /// - `EstimationError::InvalidShape` if the series is not one-dimensional.
    /// - `EstimationError::InsufficientData` if the series is too short for the fit.
    pub fn new<D: Dimension>(series: ArrayView<f64, D>) -> Result<Self, EstimationError> {
        let series = one_dimensional(series)?;

        let blocks = BlockVariances::from_series(series);
        let fit = CorrelationFit::new(&blocks)?;

        let n_samples = series.len();
        let n_effective = n_samples as f64 / fit.correlation_length();
        let std = population_std(series);

        Ok(ErrorEstimate {
            n_samples,
            mean: statistical::mean(&series.to_vec()),
            std,
            naive_error: standard_error(series, None),
            blocks,
            fit,
            n_effective,
            error: standard_error(series, Some(n_effective)),
        })
    }

    /// Correlation length of the series (in samples).
    #[inline(always)]
    pub fn correlation_length(&self) -> f64 {
        self.fit.correlation_length()
    }

    /// Values of the fitted model for the analyzed block sizes.
    #[inline(always)]
    pub fn fitted_curve(&self) -> Vec<f64> {
        self.fit.fitted_curve(&self.blocks)
    }
}
