// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! This module contains error types that can be returned by the `blockerr` crate.

use std::path::Path;

use colored::{ColoredString, Colorize};
use thiserror::Error;

fn path_to_yellow(path: &Path) -> ColoredString {
    path.to_string_lossy().yellow()
}

/// Errors that can occur when estimating the error of a single series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
    #[error("{} the provided series is not one-dimensional (shape: '{}')", "error:".red().bold(), format!("{:?}", .0).yellow())]
    InvalidShape(Vec<usize>),

    #[error("{} series of '{}' samples is too short to estimate the correlation length (at least '{}' samples are required)", "error:".red().bold(), .0.to_string().yellow(), crate::blocking::MIN_SAMPLES_FOR_FIT.to_string().yellow())]
    InsufficientData(usize),

    #[error("{} could not fit the correlation length ({})", "error:".red().bold(), .0)]
    FitFailed(String),
}

/// Errors that can occur when reading the configuration of the estimation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{} could not open the configuration file '{}'", "error:".red().bold(), .0.yellow())]
    CouldNotOpenConfig(String),

    #[error("{} could not understand the contents of the configuration file '{}' ({})", "error:".red().bold(), .0.yellow(), .1)]
    CouldNotParseConfig(String, serde_yaml::Error),

    #[error("{} every Nth sample to use ('{}') must be a positive integer", "error:".red().bold(), "step".yellow())]
    InvalidStep,

    #[error("{} the number of threads ('{}') must be a positive integer", "error:".red().bold(), "n_threads".yellow())]
    InvalidNThreads,

    #[error("{} the starting time ('{}') is higher than the ending time ('{}')", "error:".red().bold(), "begin".yellow(), "end".yellow())]
    InvalidBeginEnd,

    #[error("{} no columns to analyze were specified", "error:".red().bold())]
    NoColumns,

    #[error("{} column '{}' cannot be analyzed (column 0 contains time; observables are numbered from 1)", "error:".red().bold(), "0".yellow())]
    TimeColumn,

    #[error("{} column '{}' is listed multiple times", "error:".red().bold(), .0.to_string().yellow())]
    DuplicateColumn(usize),
}

/// Errors that can occur when reading the input data file.
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("{} could not open the data file '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotOpenFile(Box<Path>),

    #[error("{} could not read line '{}' of the data file '{}'", "error:".red().bold(), .1.to_string().yellow(), path_to_yellow(.0))]
    CouldNotReadLine(Box<Path>, usize),

    #[error("{} could not parse '{}' on line '{}' of the data file '{}'", "error:".red().bold(), .2.yellow(), .1.to_string().yellow(), path_to_yellow(.0))]
    CouldNotParseValue(Box<Path>, usize, String),

    #[error("{} line '{}' of the data file '{}' contains '{}' columns, expected '{}'", "error:".red().bold(), .1.to_string().yellow(), path_to_yellow(.0), .2.to_string().yellow(), .3.to_string().yellow())]
    InconsistentColumns(Box<Path>, usize, usize, usize),

    #[error("{} the data file '{}' contains no data", "error:".red().bold(), path_to_yellow(.0))]
    EmptyFile(Box<Path>),

    #[error("{} column '{}' does not exist in the data file '{}' (the file contains '{}' observables)", "error:".red().bold(), .1.to_string().yellow(), path_to_yellow(.0), .2.to_string().yellow())]
    ColumnOutOfRange(Box<Path>, usize, usize),
}

/// Errors that can occur while analyzing the observables.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{} could not analyze observable '{}'\n{}", "error:".red().bold(), .0.yellow(), .1)]
    ObservableFailed(String, EstimationError),

    #[error("{} no samples of the data file '{}' lie in the selected time range", "error:".red().bold(), path_to_yellow(.0))]
    NoSamples(Box<Path>),

    #[error("{} could not set up a thread pool with '{}' threads ({})", "error:".red().bold(), .0.to_string().yellow(), .1)]
    ThreadPool(usize, String),
}

/// Errors that can occur while writing the results.
#[derive(Error, Debug)]
pub enum WriteError {
    #[error("{} could not create file '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotCreateFile(Box<Path>),

    #[error("{} could not create a backup for file '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotBackupFile(Box<Path>),

    #[error("{} could not write results in yaml format into '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotWriteYaml(Box<Path>),

    #[error("{} could not write line into '{}'", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotWriteLine(Box<Path>),
}
