// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! This module contains structures and methods for specifying parameters of the estimation
//! and for reading the analyzed time series.

pub mod estimation;
pub mod table;

pub use estimation::Estimation;
pub use table::DataTable;
