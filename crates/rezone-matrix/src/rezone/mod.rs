//! Matrix and vector rezoning.

pub mod batch;
pub mod rezoner;
pub mod types;
pub mod vector;
pub mod weighted;

pub use batch::BatchResult;
pub use rezoner::MatrixRezoner;
pub use types::{
    DimensionReport, RezoneOptions, RezoneReport, Rezoned, RezonedVector, VectorReport,
    WeightedCost,
};
