// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Fitting the correlation length to the block variances.

use argmin::core::{CostFunction, Executor, State};
use argmin::solver::brent::BrentOpt;
use getset::CopyGetters;

use super::variance::BlockVariances;
use crate::errors::EstimationError;

/// Lowest correlation length (in samples) considered by the fit.
const MIN_CORRELATION_LENGTH: f64 = 1.0;

/// Highest correlation length considered by the fit, as a multiple of the series length.
const MAX_CORRELATION_LENGTH_FACTOR: f64 = 10.0;

/// Absolute tolerance of the minimization (in samples).
const TOLERANCE: f64 = 1e-5;

/// Maximal number of iterations of the minimization.
const MAX_ITERATIONS: u64 = 500;

/// Saturation curve `bs / (tau + bs)`.
#[inline(always)]
fn trend(block_size: f64, tau: f64) -> f64 {
    block_size / (tau + block_size)
}

/// Mismatch between the block variances and the saturation model.
#[derive(Debug, Clone, Copy)]
struct Mismatch<'a> {
    blocks: &'a BlockVariances,
}

impl Mismatch<'_> {
    /// Amplitude of the saturation curve obtained by linear least squares.
    fn amplitude(&self, tau: f64) -> f64 {
        let (numerator, denominator) =
            self.blocks
                .iter()
                .fold((0.0, 0.0), |(num, den), (bs, variance)| {
                    let t = trend(bs as f64, tau);
                    (num + t * variance, den + t * t)
                });

        numerator / denominator
    }

    /// Sum of squared residuals, each divided by the block size.
    fn evaluate(&self, tau: f64) -> f64 {
        let amplitude = self.amplitude(tau);

        self.blocks
            .iter()
            .map(|(bs, variance)| {
                let bs = bs as f64;
                let residual = variance - amplitude * trend(bs, tau);
                residual * residual / bs
            })
            .sum()
    }
}

impl CostFunction for Mismatch<'_> {
    type Param = f64;
    type Output = f64;

    #[inline(always)]
    fn cost(&self, tau: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        Ok(self.evaluate(*tau))
    }
}

/// Saturation model `amplitude * bs / (correlation_length + bs)` fitted to block variances.
#[derive(Debug, Clone, Copy, PartialEq, CopyGetters)]
pub struct CorrelationFit {
    /// Characteristic block size (in samples).
    #[getset(get_copy = "pub")]
    correlation_length: f64,
    /// Amplitude of the saturation curve.
    #[getset(get_copy = "pub")]
    amplitude: f64,
    /// Value of the mismatch at the fitted correlation length.
    #[getset(get_copy = "pub")]
    mismatch: f64,
}

impl CorrelationFit {
    /// Fit the correlation length to the block variances.
    ///
    /// The correlation length is searched for in the interval `[1, 10 * n_samples]`
    /// using Brent's method. For each trial correlation length, the amplitude of the model
    /// is obtained in closed form.
    ///
    /// ## Errors
    /// Returns `EstimationError::InsufficientData` if fewer than two block sizes are available.
    /// Returns `EstimationError::FitFailed` if the minimization does not provide any result.
    ///
    /// If all block variances are zero, the correlation length is the lowest considered value.
    pub fn new(blocks: &BlockVariances) -> Result<Self, EstimationError> {
        if blocks.len() < 2 {
            return Err(EstimationError::InsufficientData(blocks.n_samples()));
        }

        // constant series: the mismatch does not depend on the correlation length
        if blocks.variances().iter().all(|&variance| variance == 0.0) {
            log::debug!("All block variances are zero. Samples are treated as independent.");
            return Ok(CorrelationFit {
                correlation_length: MIN_CORRELATION_LENGTH,
                amplitude: 0.0,
                mismatch: 0.0,
            });
        }

        let problem = Mismatch { blocks };
        let upper = MAX_CORRELATION_LENGTH_FACTOR * blocks.n_samples() as f64;
        let solver = BrentOpt::new(MIN_CORRELATION_LENGTH, upper)
            .set_tolerance(f64::EPSILON.sqrt(), TOLERANCE);

        let result = Executor::new(problem, solver)
            .configure(|state| state.max_iters(MAX_ITERATIONS))
            .run()
            .map_err(|e| EstimationError::FitFailed(e.to_string()))?;

        let tau = *result.state().get_best_param().ok_or_else(|| {
            EstimationError::FitFailed("minimization did not find any finite mismatch".to_owned())
        })?;

        log::debug!(
            "Fitted correlation length of {:.4} samples after {} iterations.",
            tau,
            result.state().get_iter()
        );

        Ok(CorrelationFit {
            correlation_length: tau,
            amplitude: problem.amplitude(tau),
            mismatch: problem.evaluate(tau),
        })
    }

    /// Value of the fitted model for the given block size.
    #[inline(always)]
    pub fn model(&self, block_size: usize) -> f64 {
        self.amplitude * trend(block_size as f64, self.correlation_length)
    }

    /// Values of the fitted model for all block sizes of the block variances.
    pub fn fitted_curve(&self, blocks: &BlockVariances) -> Vec<f64> {
        blocks
            .block_sizes()
            .iter()
            .map(|&bs| self.model(bs))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;

    /// Block variances that follow the saturation model exactly.
    fn model_blocks(tau: f64, amplitude: f64, n_samples: usize) -> BlockVariances {
        let series = Array1::<f64>::zeros(n_samples);
        let mut blocks = BlockVariances::new(series.view()).unwrap();
        let variances = blocks
            .block_sizes()
            .iter()
            .map(|&bs| amplitude * trend(bs as f64, tau))
            .collect();
        blocks.variances = variances;
        blocks
    }

    #[test]
    fn trend_limits() {
        assert_relative_eq!(trend(1.0, 1.0), 0.5);
        assert_relative_eq!(trend(5.0, 15.0), 0.25);
        assert!(trend(1e9, 2.0) > 0.999);
        assert!(trend(1.0, 1e9) < 1e-8);
    }

    #[test]
    fn amplitude_exact_model() {
        let blocks = model_blocks(12.0, 0.03, 2000);
        let mismatch = Mismatch { blocks: &blocks };

        assert_relative_eq!(mismatch.amplitude(12.0), 0.03, epsilon = 1e-12);
        assert_relative_eq!(mismatch.evaluate(12.0), 0.0, epsilon = 1e-20);
        assert!(mismatch.evaluate(6.0) > 0.0);
        assert!(mismatch.evaluate(24.0) > 0.0);
    }

    #[test]
    fn mismatch_weighting() {
        let mut blocks = model_blocks(1.0, 1.0, 50);
        blocks.block_sizes = vec![1, 4];
        blocks.variances = vec![1.0, 0.0];
        let mismatch = Mismatch { blocks: &blocks };

        // trend: 0.5 (bs = 1), 0.8 (bs = 4); amplitude = 0.5 / (0.25 + 0.64)
        let amplitude = 0.5 / 0.89;
        assert_relative_eq!(mismatch.amplitude(1.0), amplitude);

        let expected = (1.0 - amplitude * 0.5).powi(2) + (amplitude * 0.8).powi(2) / 4.0;
        assert_relative_eq!(mismatch.evaluate(1.0), expected);
    }

    #[test]
    fn fit_recovers_correlation_length() {
        for tau in [2.0, 7.5, 40.0] {
            let blocks = model_blocks(tau, 0.5, 5000);
            let fit = CorrelationFit::new(&blocks).unwrap();

            assert_relative_eq!(fit.correlation_length(), tau, max_relative = 1e-3);
            assert_relative_eq!(fit.amplitude(), 0.5, max_relative = 1e-3);
            assert!(fit.mismatch() < 1e-10);
        }
    }

    #[test]
    fn fit_stays_in_bounds() {
        // variances decreasing with block size cannot be described by the model;
        // the fit must end at the lower bound
        let mut blocks = model_blocks(1.0, 1.0, 1000);
        blocks.variances = blocks
            .block_sizes()
            .iter()
            .map(|&bs| 1.0 / bs as f64)
            .collect();

        let fit = CorrelationFit::new(&blocks).unwrap();
        assert!(fit.correlation_length() >= 1.0);
        assert!(fit.correlation_length() < 1.01);
    }

    #[test]
    fn fit_fitted_curve() {
        let blocks = model_blocks(5.0, 2.0, 500);
        let fit = CorrelationFit::new(&blocks).unwrap();
        let curve = fit.fitted_curve(&blocks);

        assert_eq!(curve.len(), blocks.len());
        for (fitted, raw) in curve.iter().zip(blocks.variances()) {
            assert_relative_eq!(fitted, raw, max_relative = 1e-3);
        }
        assert_relative_eq!(fit.model(5), 1.0, max_relative = 1e-3);
    }

    #[test]
    fn fit_zero_variances() {
        let series = Array1::from_elem(100, 3.0);
        let blocks = BlockVariances::new(series.view()).unwrap();
        let fit = CorrelationFit::new(&blocks).unwrap();

        assert_relative_eq!(fit.correlation_length(), MIN_CORRELATION_LENGTH);
        assert_relative_eq!(fit.amplitude(), 0.0);
        assert_relative_eq!(fit.mismatch(), 0.0);
        assert!(fit.fitted_curve(&blocks).iter().all(|&x| x == 0.0));
    }

    #[test]
    fn fit_fail_insufficient_data() {
        let series = Array1::<f64>::zeros(20);
        let blocks = BlockVariances::new(series.view()).unwrap();
        assert_eq!(blocks.len(), 1);

        match CorrelationFit::new(&blocks) {
            Err(EstimationError::InsufficientData(20)) => (),
            _ => panic!("Should have failed with InsufficientData."),
        }

        let series = Array1::<f64>::zeros(3);
        let blocks = BlockVariances::new(series.view()).unwrap();
        match CorrelationFit::new(&blocks) {
            Err(EstimationError::InsufficientData(3)) => (),
            _ => panic!("Should have failed with InsufficientData."),
        }
    }
}
