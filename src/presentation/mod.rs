// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! This module contains structures and methods for presenting the results of the estimation.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use getset::{CopyGetters, Getters};
use indexmap::IndexMap;
use ndarray::ArrayView1;
use serde::{Serialize, Serializer};

use crate::{
    blocking::{averror, ErrorEstimate},
    errors::WriteError,
    input::Estimation,
    BLOCKERR_VERSION,
};

/// Number of significant digits of the values written into the output yaml file.
const SIGNIFICANT_DIGITS: i32 = 6;

macro_rules! write_line {
    ($dst:expr, $path:expr, $($arg:tt)*) => {
        writeln!($dst, $($arg)*).map_err(|_| WriteError::CouldNotWriteLine(Box::from($path)))?
    };
}

/// Block variances and the fitted saturation curve of a single observable.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct BlockingCurve {
    /// Block sizes (in samples).
    #[getset(get = "pub")]
    block_sizes: Vec<usize>,
    /// Recorded variances of block averages.
    #[getset(get = "pub")]
    variances: Vec<f64>,
    /// Values of the fitted curve.
    #[getset(get = "pub")]
    fitted: Vec<f64>,
    /// Fitted correlation length (in samples).
    #[getset(get_copy = "pub")]
    correlation_length: f64,
}

/// Results of the error estimation for a single observable.
#[derive(Debug, Clone, PartialEq, Serialize, Getters, CopyGetters)]
pub struct ObservableResults {
    /// Name of the observable.
    #[serde(skip)]
    #[getset(get = "pub")]
    name: String,
    /// Number of samples analyzed.
    #[getset(get_copy = "pub")]
    n_samples: usize,
    /// Mean of the observable.
    #[serde(serialize_with = "round_serialize")]
    #[getset(get_copy = "pub")]
    mean: f64,
    /// Population standard deviation of the observable.
    #[serde(serialize_with = "round_serialize")]
    #[getset(get_copy = "pub")]
    std: f64,
    /// Standard error of the mean assuming uncorrelated samples.
    #[serde(serialize_with = "round_serialize")]
    #[getset(get_copy = "pub")]
    naive_error: f64,
    /// Correlation length (in samples). `None` if the series is too short.
    #[serde(serialize_with = "round_serialize_option")]
    #[getset(get_copy = "pub")]
    correlation_length: Option<f64>,
    /// Effective number of independent samples. `None` if the series is too short.
    #[serde(serialize_with = "round_serialize_option")]
    #[getset(get_copy = "pub")]
    n_effective: Option<f64>,
    /// Standard error of the mean corrected for correlation. `None` if the series is too short.
    #[serde(serialize_with = "round_serialize_option")]
    #[getset(get_copy = "pub")]
    error: Option<f64>,
    /// Block variances and the fitted curve.
    #[serde(skip)]
    #[getset(get = "pub")]
    blocking: Option<BlockingCurve>,
}

impl ObservableResults {
    /// Convert a complete error estimate into presentable results.
    pub(crate) fn from_estimate(name: &str, estimate: &ErrorEstimate) -> Self {
        let blocking = BlockingCurve {
            block_sizes: estimate.blocks().block_sizes().clone(),
            variances: estimate.blocks().variances().clone(),
            fitted: estimate.fitted_curve(),
            correlation_length: estimate.correlation_length(),
        };

        ObservableResults {
            name: name.to_owned(),
            n_samples: estimate.n_samples(),
            mean: estimate.mean(),
            std: estimate.std(),
            naive_error: estimate.naive_error(),
            correlation_length: Some(estimate.correlation_length()),
            n_effective: Some(estimate.n_effective()),
            error: Some(estimate.error()),
            blocking: Some(blocking),
        }
    }

    /// Results for a series that is too short to estimate its correlation length.
    /// The series must not be empty.
    pub(crate) fn without_correlation(name: &str, series: ArrayView1<f64>) -> Self {
        let values = series.to_vec();

        ObservableResults {
            name: name.to_owned(),
            n_samples: values.len(),
            mean: statistical::mean(&values),
            std: statistical::population_standard_deviation(&values, None),
            naive_error: averror(series, None).unwrap_or(f64::NAN),
            correlation_length: None,
            n_effective: None,
            error: None,
            blocking: None,
        }
    }

    /// Write the block variances and the fitted curve in an xvg format.
    fn write_xvg(
        &self,
        writer: &mut impl Write,
        path: &Path,
        curve: &BlockingCurve,
    ) -> Result<(), WriteError> {
        write_line!(
            writer,
            path,
            "# Fitted correlation length: {:.4} samples.",
            curve.correlation_length
        );
        write_line!(writer, path, "@    title \"Block variances of {}\"", self.name);
        write_line!(writer, path, "@    xaxis  label \"Block size\"");
        write_line!(
            writer,
            path,
            "@    yaxis  label \"Variance of block averages\""
        );
        write_line!(writer, path, "@TYPE xy");
        write_line!(writer, path, "@ s0 legend \"Block variance\"");
        write_line!(writer, path, "@ s1 legend \"Fitted curve\"");

        for ((bs, variance), fitted) in curve
            .block_sizes
            .iter()
            .zip(curve.variances.iter())
            .zip(curve.fitted.iter())
        {
            write_line!(writer, path, "{:>8} {:>16.8e} {:>16.8e}", bs, variance, fitted);
        }

        Ok(())
    }
}

/// Results of the error estimation for all analyzed observables.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EstimationResults {
    /// Results for the individual observables, in the order of columns.
    observables: IndexMap<String, ObservableResults>,
    /// Path to the analyzed data file.
    #[serde(skip)]
    input: String,
}

impl EstimationResults {
    pub(crate) fn new(input: &str, observables: Vec<ObservableResults>) -> Self {
        EstimationResults {
            observables: observables
                .into_iter()
                .map(|obs| (obs.name.clone(), obs))
                .collect(),
            input: input.to_owned(),
        }
    }

    /// Get results for an observable with the given name.
    #[inline(always)]
    pub fn get(&self, name: &str) -> Option<&ObservableResults> {
        self.observables.get(name)
    }

    /// Iterate over the results for the individual observables.
    #[inline(always)]
    pub fn iter(&self) -> impl Iterator<Item = &ObservableResults> {
        self.observables.values()
    }

    /// Number of analyzed observables.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.observables.len()
    }

    /// No observable has been analyzed.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.observables.is_empty()
    }

    /// Write all the output files requested by the estimation.
    pub(crate) fn write_all(&self, estimation: &Estimation) -> Result<(), WriteError> {
        log::info!("Writing results into '{}'...", estimation.output_yaml());
        self.write_yaml(estimation.output_yaml(), estimation.overwrite())?;

        if let Some(pattern) = estimation.output_blocking() {
            self.write_blocking(pattern, estimation.overwrite())?;
        }

        Ok(())
    }

    /// Write the results of the estimation into a yaml file.
    pub fn write_yaml(&self, filename: impl AsRef<Path>, overwrite: bool) -> Result<(), WriteError> {
        let mut writer = prepare_file(&filename, "yaml", overwrite)?;
        write_header(&mut writer, filename.as_ref(), &self.input)?;

        serde_yaml::to_writer(writer, self)
            .map_err(|_| WriteError::CouldNotWriteYaml(Box::from(filename.as_ref())))?;

        Ok(())
    }

    /// Write the block variances of the individual observables into xvg files.
    /// The name of the observable is appended to the file stem of the pattern.
    /// Observables without a fitted correlation length are skipped.
    pub fn write_blocking(
        &self,
        file_pattern: impl AsRef<Path>,
        overwrite: bool,
    ) -> Result<(), WriteError> {
        for observable in self.observables.values() {
            let Some(curve) = &observable.blocking else {
                log::warn!(
                    "No block variances available for observable '{}'. Skipping.",
                    observable.name
                );
                continue;
            };

            let filename = append_to_stem(file_pattern.as_ref(), &observable.name);
            log::info!("Writing an xvg file '{}'...", filename.to_string_lossy());

            let mut writer = prepare_file(&filename, "xvg", overwrite)?;
            write_header(&mut writer, &filename, &self.input)?;
            observable.write_xvg(&mut writer, &filename, curve)?;
        }

        Ok(())
    }
}

/// Insert `_name` between the file stem and the extension of a path.
fn append_to_stem(pattern: &Path, name: &str) -> PathBuf {
    let stem = pattern
        .file_stem()
        .map(|x| x.to_string_lossy().into_owned())
        .unwrap_or_default();

    let filename = match pattern.extension() {
        Some(extension) => format!("{}_{}.{}", stem, name, extension.to_string_lossy()),
        None => format!("{}_{}", stem, name),
    };

    pattern.with_file_name(filename)
}

/// Back up a file and create a new one.
fn prepare_file(
    filename: &impl AsRef<Path>,
    file_type: &str,
    overwrite: bool,
) -> Result<BufWriter<File>, WriteError> {
    try_backup_file(filename, overwrite, file_type)?;
    create_and_open_file(filename)
}

/// Write header into an output file.
fn write_header(writer: &mut impl Write, filename: &Path, input: &str) -> Result<(), WriteError> {
    writeln!(
        writer,
        "# Errors estimated with 'blockerr v{}' from data file '{}'.",
        BLOCKERR_VERSION, input
    )
    .map_err(|_| WriteError::CouldNotWriteLine(Box::from(filename)))
}

/// Create and open file for buffered writing.
fn create_and_open_file(filename: &impl AsRef<Path>) -> Result<BufWriter<File>, WriteError> {
    let file = File::create(filename.as_ref())
        .map_err(|_| WriteError::CouldNotCreateFile(Box::from(filename.as_ref())))?;

    Ok(BufWriter::new(file))
}

/// Back up an output file, if it is necessary and if it is requested.
fn try_backup_file(
    filename: &impl AsRef<Path>,
    overwrite: bool,
    file_type: &str,
) -> Result<(), WriteError> {
    let path = filename.as_ref();
    if path.exists() {
        if !overwrite {
            log::warn!(
                "Output {} file '{}' already exists. Backing it up.",
                file_type,
                path.to_string_lossy()
            );
            backitup::backup(path).map_err(|_| WriteError::CouldNotBackupFile(Box::from(path)))?;
        } else {
            log::warn!(
                "Output {} file '{}' already exists. It will be overwritten as requested.",
                file_type,
                path.to_string_lossy()
            );
        }
    }

    Ok(())
}

/// Round a number to a fixed number of significant digits.
fn round_significant(x: f64) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }

    let magnitude = x.abs().log10().floor() as i32;
    let factor = 10f64.powi(SIGNIFICANT_DIGITS - 1 - magnitude);
    (x * factor).round() / factor
}

#[inline(always)]
fn round_serialize<S>(x: &f64, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_f64(round_significant(*x))
}

#[inline(always)]
fn round_serialize_option<S>(x: &Option<f64>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match x {
        Some(value) => s.serialize_f64(round_significant(*value)),
        None => s.serialize_none(),
    }
}
