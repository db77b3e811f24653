//! Error taxonomy for the Rezone workspace.
//!
//! Structural problems (malformed rows, unreadable files, empty tables)
//! abort the operation. Data-quality problems (missing or unbalanced zones)
//! only become errors when the caller asks for strict handling.

pub mod config_error;
pub mod correspondence_error;
pub mod load_error;
pub mod matrix_error;
pub mod rezone_error;

pub use config_error::ConfigError;
pub use correspondence_error::{CorrespondenceError, MalformedReason};
pub use load_error::LoadError;
pub use matrix_error::MatrixError;
pub use rezone_error::{MissingZones, RezoneError, UnbalancedZones};
