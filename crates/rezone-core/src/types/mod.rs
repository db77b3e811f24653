//! Shared types used across Rezone crates.

pub mod collections;
pub mod zone;

pub use zone::{Dimension, Zone, ZoneId};
