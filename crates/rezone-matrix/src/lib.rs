//! # rezone-matrix
//!
//! Rezoning engine for the Rezone workspace.
//! Contains correspondence tables, sparse OD matrices, the matrix
//! rezoner, and delimited-file loaders and writers.

pub mod correspondence;
pub mod io;
pub mod matrix;
pub mod rezone;

pub use correspondence::{CorrespondenceRecord, CorrespondenceTable, SpatialCorrespondence};
pub use matrix::{CostMatrix, MatrixSummary, ODMatrix};
pub use rezone::{MatrixRezoner, RezoneOptions, RezoneReport, Rezoned};
