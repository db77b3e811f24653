//! # rezone-core
//!
//! Foundation crate for the Rezone workspace.
//! Contains the zone identifier types, collections, error taxonomy,
//! configuration, and tracing setup shared by the engine crates.

pub mod config;
pub mod errors;
pub mod tracing;
pub mod types;

pub use config::{RezoneConfig, UnbalancedPolicy};
pub use types::{Dimension, Zone, ZoneId};
