// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! This module contains the implementation of the estimation logic.

use std::path::Path;

use rayon::prelude::*;

use crate::{
    blocking::ErrorEstimate,
    errors::{AnalysisError, EstimationError, ReadError},
    input::{DataTable, Estimation},
    presentation::{EstimationResults, ObservableResults},
    PANIC_MESSAGE,
};

impl Estimation {
    /// Perform the estimation and write out the results.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.info();

        let results = self.estimate()?;
        results.write_all(self)?;

        Ok(())
    }

    /// Perform the estimation and return the results without writing any output files.
    pub fn estimate(&self) -> Result<EstimationResults, Box<dyn std::error::Error + Send + Sync>> {
        let path = Path::new(self.input());

        let table = DataTable::from_file(path)?;
        log::info!(
            "Read '{}' samples of '{}' observables from '{}'.",
            table.n_samples(),
            table.n_observables(),
            self.input()
        );

        let table = table.select(self.begin(), self.end(), self.step());
        if table.n_samples() == 0 {
            return Err(Box::from(AnalysisError::NoSamples(Box::from(path))));
        }

        let columns = self.resolve_columns(&table, path)?;
        log::info!(
            "Estimating errors of '{}' observables using '{}' samples...",
            columns.len(),
            table.n_samples()
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.n_threads())
            .build()
            .map_err(|e| AnalysisError::ThreadPool(self.n_threads(), e.to_string()))?;

        let observables = pool.install(|| {
            columns
                .par_iter()
                .map(|&column| analyze_observable(&table, column))
                .collect::<Result<Vec<ObservableResults>, AnalysisError>>()
        })?;

        Ok(EstimationResults::new(self.input(), observables))
    }

    /// Get indices of the observables to analyze.
    fn resolve_columns(&self, table: &DataTable, path: &Path) -> Result<Vec<usize>, ReadError> {
        match self.columns() {
            None => Ok((1..=table.n_observables()).collect()),
            Some(columns) => {
                if let Some(&invalid) = columns.iter().find(|&&c| c > table.n_observables()) {
                    return Err(ReadError::ColumnOutOfRange(
                        Box::from(path),
                        invalid,
                        table.n_observables(),
                    ));
                }

                Ok(columns.clone())
            }
        }
    }
}

/// Estimate the error of the mean of a single observable.
fn analyze_observable(table: &DataTable, column: usize) -> Result<ObservableResults, AnalysisError> {
    let name = table.name(column).unwrap_or_else(|| {
        panic!(
            "FATAL BLOCKERR ERROR | analysis::analyze_observable | Column '{}' should exist. {}",
            column, PANIC_MESSAGE
        )
    });
    let series = table.observable(column).expect(PANIC_MESSAGE);

    match ErrorEstimate::new(series) {
        Ok(estimate) => {
            log::debug!(
                "Observable '{}': correlation length {:.4}, effective samples {:.2}.",
                name,
                estimate.correlation_length(),
                estimate.n_effective()
            );
            Ok(ObservableResults::from_estimate(name, &estimate))
        }
        Err(EstimationError::InsufficientData(n)) => {
            log::warn!(
                "Observable '{}' has only '{}' samples. Correlation length will not be estimated.",
                name,
                n
            );
            Ok(ObservableResults::without_correlation(name, series))
        }
        Err(e) => Err(AnalysisError::ObservableFailed(name.to_owned(), e)),
    }
}
