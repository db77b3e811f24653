//! Configuration for correspondence validation, rezoning, and logging.

pub mod rezone_config;

pub use rezone_config::{
    CorrespondenceConfig, LoggingConfig, RezoneConfig, RezoneSection, UnbalancedPolicy,
    DEFAULT_TOLERANCE,
};
