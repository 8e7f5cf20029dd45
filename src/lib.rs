// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! # blockerr: Statistical errors of correlated time series
//!
//! Crate for estimating the standard error of the mean of time-correlated samples
//! (e.g., energies or distances from molecular dynamics simulations) using block averaging.
//!
//! The variance of block averages is calculated for a range of block sizes and a saturation curve
//! `A * bs / (tau + bs)` is fitted to it. The fitted correlation length `tau` provides
//! the effective number of independent samples (`n / tau`) which is then used
//! to calculate the error of the mean.
//!
//! ## Usage
//!
//! Run:
//!
//! ```bash
//! $ cargo add blockerr
//! ```
//!
//! Import the crate in your Rust code:
//!
//! ```rust
//! use blockerr::prelude::*;
//! ```
//!
//! `blockerr` is also available as a command line tool. You can install it using:
//! ```bash
//! $ cargo install blockerr
//! ```
//!
//! ## Examples
//!
//! Estimating the error of a single series.
//! ```
//! use blockerr::prelude::*;
//! use ndarray::Array1;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     // each value is repeated 8 times
//!     let series = Array1::from_iter((0..4000).map(|i| ((i / 8) as f64 * 2.1).cos()));
//!
//!     // effective number of independent samples
//!     let n_eff = effective_samples(series.view())?;
//!     // standard error of the mean
//!     let error = averror(series.view(), Some(n_eff))?;
//!
//!     // the same in a single step
//!     let estimate = ErrorEstimate::new(series.view())?;
//!     assert!((estimate.error() - error).abs() < 1e-12);
//!
//!     Ok(())
//! }
//! ```
//!
//! ***
//!
//! Estimating errors of all observables in an xvg file.
//! ```no_run
//! use blockerr::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     // construct the estimation
//!     let estimation = Estimation::new()
//!             .input("energy.xvg")                       // data file to analyze
//!             .output("errors.yaml")                     // output yaml file
//!             .build()?;                                 // constructing the estimation
//!
//!     // activate colog if you want logging (requires the `colog` crate)
//!     colog::init();
//!
//!     // run the estimation and write the output
//!     estimation.run()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ***
//!
//! The `Estimation` structure has several other, optional fields.
//!
//! ```no_run
//! use blockerr::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let estimation = Estimation::new()
//!             .input("energy.xvg")                       // data file to analyze
//!             .output_yaml("errors.yaml")                // output yaml file
//!             .output_blocking("blocking.xvg")           // pattern for output xvg files
//!             .columns(vec![1usize, 3])                  // observables to analyze
//!             .begin(100_000.0)                          // starting time of the analysis
//!             .end(200_000.0)                            // ending time of the analysis
//!             .step(5)                                   // use every Nth sample
//!             .n_threads(4)                              // number of threads to use
//!             .build()?;
//!
//!     // results can also be obtained without writing any files
//!     let results = estimation.estimate()?;
//!     for observable in results.iter() {
//!         println!("{}: {:?}", observable.name(), observable.error());
//!     }
//!
//!     Ok(())
//! }
//! ```

/// Version of the `blockerr` crate.
pub const BLOCKERR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Message that should be added to every panic.
pub(crate) const PANIC_MESSAGE: &str =
    "\n\n\n            >>> THIS SHOULD NOT HAVE HAPPENED! PLEASE REPORT THIS ERROR <<<\n\n";

mod analysis;
pub mod blocking;
pub mod errors;
pub mod input;
pub mod presentation;

/// This module contains re-exported public structures of the `blockerr` crate.
pub mod prelude {
    pub use super::blocking::{
        averror, effective_samples, BlockSizes, BlockVariances, CorrelationFit, ErrorEstimate,
    };

    pub use super::input::{estimation::EstimationBuilder, DataTable, Estimation};

    pub use super::presentation::{BlockingCurve, EstimationResults, ObservableResults};
}
