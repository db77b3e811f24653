//! Tracing subscriber setup.

mod setup;

pub use setup::{init_for_tests, init_tracing};
