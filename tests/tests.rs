// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Integration tests for the `blockerr` library.

use std::io::Write;

use approx::assert_relative_eq;
use blockerr::{
    errors::{AnalysisError, ReadError},
    prelude::*,
};
use tempfile::{NamedTempFile, TempDir};

mod common;

fn estimation_all() -> Estimation {
    Estimation::new()
        .input("tests/files/series.xvg")
        .output("errors.yaml")
        .silent()
        .build()
        .unwrap()
}

#[test]
fn test_estimate_all_observables() {
    let results = estimation_all().estimate().unwrap();

    assert_eq!(results.len(), 3);
    let names: Vec<&str> = results.iter().map(|x| x.name().as_str()).collect();
    assert_eq!(names, vec!["Potential", "Box-X", "Temperature"]);

    let potential = results.get("Potential").unwrap();
    assert_eq!(potential.n_samples(), 5000);
    assert_relative_eq!(potential.mean(), -41249.99182, epsilon = 1e-4);
    assert_relative_eq!(potential.std(), 35.10262, epsilon = 1e-4);
    assert!(potential.correlation_length().unwrap() < 1.5);
    assert!(potential.n_effective().unwrap() > 5000.0 / 1.5);
    assert!(potential.error().unwrap() < 1.3 * potential.naive_error());

    let box_x = results.get("Box-X").unwrap();
    assert_relative_eq!(box_x.mean(), 7.49986, epsilon = 1e-5);
    let tau = box_x.correlation_length().unwrap();
    assert!(tau > 2.5 && tau < 15.0);
    assert!(box_x.error().unwrap() > box_x.naive_error());

    let temperature = results.get("Temperature").unwrap();
    let tau = temperature.correlation_length().unwrap();
    assert!(tau > 8.0 && tau < 60.0);
    assert_relative_eq!(
        temperature.n_effective().unwrap(),
        5000.0 / tau,
        max_relative = 1e-12
    );
    assert!(temperature.error().unwrap() > 2.0 * temperature.naive_error());

    for observable in results.iter() {
        let curve = observable.blocking().as_ref().unwrap();
        assert_eq!(curve.block_sizes().len(), 66);
        assert_eq!(curve.block_sizes().last(), Some(&490));
    }
}

#[test]
fn test_estimate_selected_observable() {
    let estimation = Estimation::new()
        .input("tests/files/series.xvg")
        .output("errors.yaml")
        .columns(vec![3usize])
        .begin(10_000.0)
        .step(2)
        .silent()
        .build()
        .unwrap();

    let results = estimation.estimate().unwrap();
    assert_eq!(results.len(), 1);
    assert!(results.get("Potential").is_none());

    let temperature = results.get("Temperature").unwrap();
    assert_eq!(temperature.n_samples(), 2000);
    let tau = temperature.correlation_length().unwrap();
    assert!(tau > 4.0 && tau < 40.0);

    let curve = temperature.blocking().as_ref().unwrap();
    assert_eq!(curve.block_sizes().len(), 56);
}

#[test]
fn test_estimate_threads_give_identical_results() {
    let single = estimation_all().estimate().unwrap();

    let estimation = Estimation::new()
        .input("tests/files/series.xvg")
        .output("errors.yaml")
        .n_threads(3)
        .silent()
        .build()
        .unwrap();
    let multiple = estimation.estimate().unwrap();

    assert_eq!(single, multiple);
}

#[test]
fn test_estimate_short_series() {
    let estimation = Estimation::new()
        .input("tests/files/short.xvg")
        .output("errors.yaml")
        .silent()
        .build()
        .unwrap();

    let results = estimation.estimate().unwrap();
    assert_eq!(results.len(), 2);

    for observable in results.iter() {
        assert_eq!(observable.n_samples(), 15);
        assert!(observable.naive_error() > 0.0);
        assert!(observable.correlation_length().is_none());
        assert!(observable.n_effective().is_none());
        assert!(observable.error().is_none());
        assert!(observable.blocking().is_none());
    }
}

#[test]
fn test_run_yaml() {
    let output = NamedTempFile::new().unwrap();
    let path_to_output = output.path().to_str().unwrap();

    let estimation = Estimation::new()
        .input("tests/files/series.xvg")
        .output(path_to_output)
        .silent()
        .overwrite()
        .build()
        .unwrap();

    estimation.run().unwrap();
    let expected = estimation.estimate().unwrap();

    let results = common::read_results(path_to_output);
    assert_eq!(
        common::observable_names(&results),
        vec!["Potential", "Box-X", "Temperature"]
    );

    for observable in expected.iter() {
        let name = observable.name().as_str();
        assert_eq!(
            results[name]["n_samples"].as_u64().unwrap(),
            observable.n_samples() as u64
        );
        assert_relative_eq!(
            common::value(&results, name, "mean"),
            observable.mean(),
            max_relative = 1e-5
        );
        assert_relative_eq!(
            common::value(&results, name, "naive_error"),
            observable.naive_error(),
            max_relative = 1e-5
        );
        assert_relative_eq!(
            common::value(&results, name, "correlation_length"),
            observable.correlation_length().unwrap(),
            max_relative = 1e-5
        );
        assert_relative_eq!(
            common::value(&results, name, "n_effective"),
            observable.n_effective().unwrap(),
            max_relative = 1e-5
        );
        assert_relative_eq!(
            common::value(&results, name, "error"),
            observable.error().unwrap(),
            max_relative = 1e-5
        );
    }
}

#[test]
fn test_run_yaml_constant_observable() {
    let mut input = NamedTempFile::new().unwrap();
    writeln!(input, "@ s0 legend \"Box-X\"\n@ s1 legend \"Index\"").unwrap();
    for i in 0..500 {
        writeln!(input, "{} 7.529159 {}", i * 10, (i % 13) as f64).unwrap();
    }
    input.flush().unwrap();

    let output = NamedTempFile::new().unwrap();
    let path_to_output = output.path().to_str().unwrap();

    let estimation = Estimation::new()
        .input(input.path().to_str().unwrap())
        .output(path_to_output)
        .silent()
        .overwrite()
        .build()
        .unwrap();

    estimation.run().unwrap();

    let results = common::read_results(path_to_output);
    assert_relative_eq!(
        common::value(&results, "Box-X", "mean"),
        7.529159,
        max_relative = 1e-5
    );
    assert_relative_eq!(common::value(&results, "Box-X", "correlation_length"), 1.0);
    assert_relative_eq!(common::value(&results, "Box-X", "n_effective"), 500.0);
    let error = common::value(&results, "Box-X", "error");
    assert!(error.is_finite());
    assert!(error < 1e-12);
}

#[test]
fn test_run_yaml_short() {
    let output = NamedTempFile::new().unwrap();
    let path_to_output = output.path().to_str().unwrap();

    let estimation = Estimation::new()
        .input("tests/files/short.xvg")
        .output(path_to_output)
        .silent()
        .overwrite()
        .build()
        .unwrap();

    estimation.run().unwrap();

    let results = common::read_results(path_to_output);
    assert_eq!(
        common::observable_names(&results),
        vec!["Potential", "Pressure"]
    );
    assert_eq!(results["Pressure"]["n_samples"].as_u64().unwrap(), 15);
    assert!(results["Pressure"]["correlation_length"].is_null());
    assert!(results["Pressure"]["n_effective"].is_null());
    assert!(results["Pressure"]["error"].is_null());
}

#[test]
fn test_run_blocking() {
    let directory = TempDir::new().unwrap();
    let path_to_yaml = directory.path().join("errors.yaml");
    let path_to_pattern = directory.path().join("blocking.xvg");

    let estimation = Estimation::new()
        .input("tests/files/series.xvg")
        .output(path_to_yaml.to_str().unwrap())
        .output_blocking(path_to_pattern.to_str().unwrap())
        .columns(vec![1usize, 2])
        .silent()
        .build()
        .unwrap();

    estimation.run().unwrap();

    assert!(path_to_yaml.exists());
    assert!(!directory.path().join("blocking_Temperature.xvg").exists());

    let results = estimation.estimate().unwrap();
    for name in ["Potential", "Box-X"] {
        let table = DataTable::from_file(directory.path().join(format!("blocking_{}.xvg", name)))
            .unwrap();
        assert_eq!(table.names(), &["Block_variance", "Fitted_curve"]);
        assert_eq!(table.n_samples(), 66);

        let curve = results.get(name).unwrap().blocking().as_ref().unwrap();
        for (i, (&bs, &time)) in curve.block_sizes().iter().zip(table.time()).enumerate() {
            assert_relative_eq!(bs as f64, time);
            assert_relative_eq!(
                table.observable(1).unwrap()[i],
                curve.variances()[i],
                max_relative = 1e-7
            );
            assert_relative_eq!(
                table.observable(2).unwrap()[i],
                curve.fitted()[i],
                max_relative = 1e-7
            );
        }
    }
}

#[test]
fn test_run_backup() {
    let directory = TempDir::new().unwrap();
    let path_to_yaml = directory.path().join("errors.yaml");

    let estimation = Estimation::new()
        .input("tests/files/short.xvg")
        .output(path_to_yaml.to_str().unwrap())
        .silent()
        .build()
        .unwrap();

    estimation.run().unwrap();
    estimation.run().unwrap();
    estimation.run().unwrap();

    assert_eq!(std::fs::read_dir(directory.path()).unwrap().count(), 3);
}

#[test]
fn test_fail_nonexistent_input() {
    let estimation = Estimation::new()
        .input("tests/files/nonexistent.xvg")
        .output("errors.yaml")
        .silent()
        .build()
        .unwrap();

    let error = estimation.estimate().unwrap_err();
    assert!(matches!(
        error.downcast_ref::<ReadError>(),
        Some(ReadError::CouldNotOpenFile(_))
    ));
}

#[test]
fn test_fail_column_out_of_range() {
    let estimation = Estimation::new()
        .input("tests/files/series.xvg")
        .output("errors.yaml")
        .columns(vec![2usize, 4])
        .silent()
        .build()
        .unwrap();

    match estimation.estimate().unwrap_err().downcast_ref::<ReadError>() {
        Some(ReadError::ColumnOutOfRange(_, 4, 3)) => (),
        _ => panic!("Should have failed with ColumnOutOfRange."),
    }
}

#[test]
fn test_fail_no_samples() {
    let estimation = Estimation::new()
        .input("tests/files/series.xvg")
        .output("errors.yaml")
        .begin(1_000_000.0)
        .silent()
        .build()
        .unwrap();

    assert!(matches!(
        estimation.estimate().unwrap_err().downcast_ref::<AnalysisError>(),
        Some(AnalysisError::NoSamples(_))
    ));
}
