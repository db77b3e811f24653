//! Sparse OD matrices and matrix utilities.

pub mod cost;
pub mod od;
pub mod ops;
pub mod summary;

pub use cost::CostMatrix;
pub use od::ODMatrix;
pub use summary::MatrixSummary;
