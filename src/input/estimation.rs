// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Contains the implementation of the main `Estimation` structure and its methods.

use std::fs::read_to_string;
use std::path::Path;

use derive_builder::Builder;
use getset::{CopyGetters, Getters, Setters};
use serde::Deserialize;

use crate::errors::ConfigError;

/// Structure holding all the information necessary to estimate errors of observables.
#[derive(Debug, Clone, Builder, Getters, CopyGetters, Setters, Deserialize)]
#[serde(deny_unknown_fields)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Estimation {
    /// Path to the data file (xvg or a plain table) containing the time series to analyze.
    /// The first column of the file is time, the other columns are the observables.
    #[builder(setter(into))]
    #[getset(get = "pub")]
    #[serde(alias = "data")]
    input: String,
    /// Path to an output YAML file where the results of the estimation will be written.
    #[builder(setter(into))]
    #[getset(get = "pub")]
    #[serde(alias = "output")]
    output_yaml: String,
    /// Filename pattern of the output XVG files where the block variances and the fitted curve
    /// will be written. One xvg file will be generated for each observable and the name of the
    /// observable will be appended to the provided filename pattern (between the file stem and
    /// the file extension).
    ///
    /// Example: filename pattern 'blocking.xvg' may be transformed into 'blocking_energy.xvg'.
    #[builder(setter(into, strip_option), default)]
    #[getset(get = "pub")]
    #[serde(default)]
    output_blocking: Option<String>,
    /// Indices of the columns containing the observables to analyze.
    /// Column 0 is time, the observables are numbered from 1.
    /// If not specified, all observables are analyzed.
    #[builder(setter(into, strip_option), default)]
    #[getset(get = "pub")]
    #[serde(default)]
    columns: Option<Vec<usize>>,
    /// Starting time of the analysis.
    /// If not specified, the analysis starts at the beginning of the series.
    #[builder(default = "0.0")]
    #[serde(default = "default_begin", alias = "start")]
    #[getset(get_copy = "pub")]
    begin: f64,
    /// Ending time of the analysis.
    /// If not specified, the analysis ends at the end of the series.
    #[builder(default = "f64::INFINITY")]
    #[serde(default = "default_end")]
    #[getset(get_copy = "pub")]
    end: f64,
    /// Only every Nth sample of the series will be used.
    /// If not specified, each sample is used.
    #[builder(default = "1")]
    #[serde(default = "default_one")]
    #[getset(get_copy = "pub")]
    step: usize,
    /// Number of threads to use to analyze the observables.
    /// If not specified, the default value is 1.
    #[builder(default = "1")]
    #[serde(default = "default_one")]
    #[getset(get_copy = "pub")]
    n_threads: usize,
    /// Be silent. Print nothing to the standard output during the analysis.
    #[builder(setter(custom), default = "false")]
    #[serde(default = "default_false")]
    #[getset(get_copy = "pub", set = "pub")]
    silent: bool,
    /// Do not make backups. Overwrite all output files.
    #[builder(setter(custom), default = "false")]
    #[serde(default = "default_false")]
    #[getset(get_copy = "pub", set = "pub")]
    overwrite: bool,
}

fn default_begin() -> f64 {
    0.0
}

fn default_end() -> f64 {
    f64::INFINITY
}

fn default_one() -> usize {
    1
}

fn default_false() -> bool {
    false
}

fn validate_step(step: usize) -> Result<(), ConfigError> {
    if step == 0 {
        Err(ConfigError::InvalidStep)
    } else {
        Ok(())
    }
}

fn validate_n_threads(n_threads: usize) -> Result<(), ConfigError> {
    if n_threads == 0 {
        Err(ConfigError::InvalidNThreads)
    } else {
        Ok(())
    }
}

fn validate_begin_end(begin: f64, end: f64) -> Result<(), ConfigError> {
    if begin > end {
        Err(ConfigError::InvalidBeginEnd)
    } else {
        Ok(())
    }
}

fn validate_columns(columns: &[usize]) -> Result<(), ConfigError> {
    if columns.is_empty() {
        Err(ConfigError::NoColumns)
    } else if columns.contains(&0) {
        Err(ConfigError::TimeColumn)
    } else if let Some((_, &duplicate)) = columns
        .iter()
        .enumerate()
        .find(|(i, column)| columns[..*i].contains(*column))
    {
        Err(ConfigError::DuplicateColumn(duplicate))
    } else {
        Ok(())
    }
}

impl Estimation {
    pub fn new() -> EstimationBuilder {
        EstimationBuilder::default()
    }

    /// Read the parameters of the estimation from a yaml file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Estimation, ConfigError> {
        let name = path.as_ref().to_string_lossy().into_owned();
        let string =
            read_to_string(&path).map_err(|_| ConfigError::CouldNotOpenConfig(name.clone()))?;
        let estimation: Estimation = serde_yaml::from_str(&string)
            .map_err(|e| ConfigError::CouldNotParseConfig(name, e))?;

        estimation.validate()?;
        Ok(estimation)
    }

    /// Check that the Estimation structure is valid. Used after deserialization from config yaml file.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_step(self.step)?;
        validate_n_threads(self.n_threads)?;
        validate_begin_end(self.begin, self.end)?;

        if let Some(columns) = &self.columns {
            validate_columns(columns)?;
        }

        Ok(())
    }

    /// Alias for `output_yaml`.
    #[inline(always)]
    pub fn output(&self) -> &String {
        &self.output_yaml
    }

    /// Log basic info about the estimation.
    pub(crate) fn info(&self) {
        log::info!("Will analyze time series from '{}'.", self.input);
        match &self.columns {
            Some(columns) => log::info!("Will analyze observables in columns {:?}.", columns),
            None => log::info!("Will analyze all observables."),
        }

        if self.begin != 0.0 || self.end.is_finite() {
            log::info!(
                "Will only use samples with time between {} and {}.",
                self.begin,
                self.end
            );
        }

        if self.step != 1 {
            log::info!("Will use every {}. sample.", self.step);
        }

        if self.n_threads != 1 {
            log::info!("Will use {} threads.", self.n_threads);
        }

        log::info!("Will write results into '{}'.", self.output_yaml);
        if let Some(blocking) = &self.output_blocking {
            log::info!(
                "Will write block variances using the filename pattern '{}'.",
                blocking
            );
        }
    }
}

impl EstimationBuilder {
    /// Be silent. Print nothing to the standard output during the analysis.
    #[inline(always)]
    pub fn silent(&mut self) -> &mut Self {
        self.silent = Some(true);
        self
    }

    /// Do not make backups. Overwrite all output files.
    #[inline(always)]
    pub fn overwrite(&mut self) -> &mut Self {
        self.overwrite = Some(true);
        self
    }

    /// Alias for `output_yaml`.
    #[inline(always)]
    pub fn output(&mut self, value: &str) -> &mut Self {
        self.output_yaml(value)
    }

    /// Validate the process of estimation building.
    fn validate(&self) -> Result<(), String> {
        if let Some(step) = self.step {
            validate_step(step).map_err(|e| e.to_string())?;
        }

        if let Some(n_threads) = self.n_threads {
            validate_n_threads(n_threads).map_err(|e| e.to_string())?;
        }

        if let (Some(begin), Some(end)) = (self.begin, self.end) {
            validate_begin_end(begin, end).map_err(|e| e.to_string())?;
        }

        if let Some(Some(columns)) = &self.columns {
            validate_columns(columns).map_err(|e| e.to_string())?;
        }

        Ok(())
    }
}
