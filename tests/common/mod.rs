// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Functions used in various integration tests.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Test utility. Read the output yaml file, checking its header.
#[allow(dead_code)]
pub(super) fn read_results(file: impl AsRef<Path>) -> serde_yaml::Value {
    let mut reader = BufReader::new(File::open(file.as_ref()).unwrap());

    let mut header = String::new();
    reader.read_line(&mut header).unwrap();
    assert!(header.starts_with("# Errors estimated with 'blockerr v"));

    serde_yaml::from_reader(reader).unwrap()
}

/// Test utility. Get names of the observables in the order they appear in the output yaml file.
#[allow(dead_code)]
pub(super) fn observable_names(results: &serde_yaml::Value) -> Vec<String> {
    results
        .as_mapping()
        .unwrap()
        .keys()
        .map(|key| key.as_str().unwrap().to_owned())
        .collect()
}

/// Test utility. Get a floating point value of an observable from the output yaml file.
#[allow(dead_code)]
pub(super) fn value(results: &serde_yaml::Value, observable: &str, key: &str) -> f64 {
    results[observable][key].as_f64().unwrap()
}
