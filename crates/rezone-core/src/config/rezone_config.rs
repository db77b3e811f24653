//! RezoneConfig: TOML-backed settings passed explicitly into the engine.
//!
//! ```toml
//! [correspondence]
//! tolerance = 1e-6
//!
//! [rezone]
//! strict = false
//! unbalanced = "normalize"
//!
//! [logging]
//! level = "info"
//! use_env = true
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Default tolerance on the per-zone splitting factor sum.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// What to do with an old zone whose splitting factors do not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnbalancedPolicy {
    /// Apply the factors as given; trips are under- or over-counted.
    #[default]
    Keep,
    /// Rescale each unbalanced zone's factors to sum to 1 before applying.
    Normalize,
    /// Abort rezoning if the matrix touches an unbalanced zone.
    Reject,
}

impl UnbalancedPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Normalize => "normalize",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for UnbalancedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// `[correspondence]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrespondenceConfig {
    /// Allowed deviation of a zone's factor sum from 1.0.
    pub tolerance: f64,
}

impl Default for CorrespondenceConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// `[rezone]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RezoneSection {
    /// Abort when any trip volume would be dropped.
    pub strict: bool,
    pub unbalanced: UnbalancedPolicy,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `"info"` or `"rezone_matrix=debug"`.
    pub level: String,
    /// Let `RUST_LOG` override `level` when set.
    pub use_env: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            use_env: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RezoneConfig {
    pub correspondence: CorrespondenceConfig,
    pub rezone: RezoneSection,
    pub logging: LoggingConfig,
}

impl RezoneConfig {
    /// Parse and validate a TOML string. Missing keys take their defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.correspondence.tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "correspondence.tolerance",
                reason: format!("{tolerance} must be a positive finite number"),
            });
        }

        // Only the bare level is checked; target directives are left to the filter parser.
        let level = self.logging.level.trim();
        if !level.contains('=') && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                field: "logging.level",
                reason: format!("unknown level '{level}', expected one of {LOG_LEVELS:?}"),
            });
        }
        Ok(())
    }
}
