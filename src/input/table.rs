// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Reading time series from xvg files and plain whitespace-separated tables.

use std::{
    collections::HashSet,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use getset::Getters;
use ndarray::{s, Array2, ArrayView1, Axis};

use crate::errors::ReadError;

/// Time series of several observables sampled at the same times.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct DataTable {
    /// Names of the observables.
    #[getset(get = "pub")]
    names: Vec<String>,
    /// Time of each sample.
    #[getset(get = "pub")]
    time: Vec<f64>,
    /// Values of the observables. Each row corresponds to one time, each column to one observable.
    #[getset(get = "pub")]
    values: Array2<f64>,
}

impl DataTable {
    /// Read a data table from an xvg file or a plain table.
    ///
    /// Lines starting with `#` or `@` are not data. Legends (`@ sN legend "name"`) are used to
    /// name the observables. The first column contains time, unless it is the only column.
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Self, ReadError> {
        let path = filename.as_ref();
        let file = File::open(path).map_err(|_| ReadError::CouldNotOpenFile(Box::from(path)))?;

        Self::from_reader(BufReader::new(file), path)
    }

    /// Read a data table from any buffered reader. `path` is only used for error reporting.
    pub fn from_reader(reader: impl BufRead, path: &Path) -> Result<Self, ReadError> {
        let mut legends: Vec<(usize, String)> = Vec::new();
        let mut rows: Vec<Vec<f64>> = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line_number = i + 1;
            let line = line.map_err(|_| ReadError::CouldNotReadLine(Box::from(path), line_number))?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(metadata) = line.strip_prefix('@') {
                if let Some(legend) = parse_legend(metadata) {
                    legends.push(legend);
                }
                continue;
            }

            let row = line
                .split_whitespace()
                .map(|value| {
                    value.parse::<f64>().map_err(|_| {
                        ReadError::CouldNotParseValue(
                            Box::from(path),
                            line_number,
                            value.to_owned(),
                        )
                    })
                })
                .collect::<Result<Vec<f64>, ReadError>>()?;

            if let Some(first) = rows.first() {
                if first.len() != row.len() {
                    return Err(ReadError::InconsistentColumns(
                        Box::from(path),
                        line_number,
                        row.len(),
                        first.len(),
                    ));
                }
            }

            rows.push(row);
        }

        let n_columns = match rows.first() {
            Some(row) => row.len(),
            None => return Err(ReadError::EmptyFile(Box::from(path))),
        };

        let n_rows = rows.len();
        let table = Array2::from_shape_vec((n_rows, n_columns), rows.concat())
            .map_err(|_| ReadError::EmptyFile(Box::from(path)))?;

        // a single column contains values of one observable without time
        let (time, values) = if n_columns == 1 {
            ((0..n_rows).map(|x| x as f64).collect(), table)
        } else {
            (
                table.column(0).to_vec(),
                table.slice(s![.., 1..]).to_owned(),
            )
        };

        let names = observable_names(values.ncols(), &legends);

        Ok(DataTable {
            names,
            time,
            values,
        })
    }

    /// Number of observables in the table.
    #[inline(always)]
    pub fn n_observables(&self) -> usize {
        self.values.ncols()
    }

    /// Number of samples of each observable.
    #[inline(always)]
    pub fn n_samples(&self) -> usize {
        self.values.nrows()
    }

    /// Get the series of an observable. Observables are numbered from 1.
    pub fn observable(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        if index == 0 || index > self.n_observables() {
            None
        } else {
            Some(self.values.column(index - 1))
        }
    }

    /// Get the name of an observable. Observables are numbered from 1.
    pub fn name(&self, index: usize) -> Option<&str> {
        if index == 0 {
            None
        } else {
            self.names.get(index - 1).map(|x| x.as_str())
        }
    }

    /// Select samples with time in the range `[begin, end]`, using only every `step`-th of them.
    pub fn select(&self, begin: f64, end: f64, step: usize) -> DataTable {
        let rows: Vec<usize> = self
            .time
            .iter()
            .enumerate()
            .filter(|(_, t)| **t >= begin && **t <= end)
            .map(|(i, _)| i)
            .step_by(step.max(1))
            .collect();

        DataTable {
            names: self.names.clone(),
            time: rows.iter().map(|&i| self.time[i]).collect(),
            values: self.values.select(Axis(0), &rows),
        }
    }
}

/// Parse an xvg legend line (with the leading `@` removed) into an index of a data set and its name.
fn parse_legend(metadata: &str) -> Option<(usize, String)> {
    let mut split = metadata.trim().splitn(2, char::is_whitespace);
    let set = split.next()?.strip_prefix('s')?.parse::<usize>().ok()?;
    let name = split.next()?.trim().strip_prefix("legend")?.trim();
    let name = name.trim_matches('"').trim();

    if name.is_empty() {
        None
    } else {
        Some((set, name.to_owned()))
    }
}

/// Assign unique names to the observables.
fn observable_names(n_observables: usize, legends: &[(usize, String)]) -> Vec<String> {
    let mut names: Vec<String> = (1..=n_observables)
        .map(|i| format!("column_{}", i))
        .collect();

    for (set, name) in legends {
        if let Some(slot) = names.get_mut(*set) {
            *slot = name.split_whitespace().collect::<Vec<_>>().join("_");
        }
    }

    let mut seen = HashSet::new();
    for (i, name) in names.iter_mut().enumerate() {
        if !seen.insert(name.clone()) {
            log::warn!(
                "Observable name '{}' is used multiple times. Renaming column {} to '{}_{}'.",
                name,
                i + 1,
                name,
                i + 1
            );
            *name = format!("{}_{}", name, i + 1);
            seen.insert(name.clone());
        }
    }

    names
}
