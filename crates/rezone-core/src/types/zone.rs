//! Zone identifiers.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Any key usable as a zone identifier.
///
/// Identifiers from different zoning systems are distinct type parameters
/// wherever the engine relates two systems, so they are never compared
/// with each other by accident.
pub trait Zone: Clone + Eq + Hash + Ord + fmt::Debug + fmt::Display + Send + Sync {}

impl<T> Zone for T where T: Clone + Eq + Hash + Ord + fmt::Debug + fmt::Display + Send + Sync {}

/// Zone identifier as read from a delimited file.
///
/// Numeric text becomes `Number`, anything else becomes `Label`.
/// Numbers order before labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZoneId {
    Number(i64),
    Label(String),
}

impl ZoneId {
    /// Parse a raw field. Returns `None` for an empty (null) field.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<i64>() {
            Ok(n) => Some(Self::Number(n)),
            Err(_) => Some(Self::Label(trimmed.to_string())),
        }
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Label(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ZoneId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ZoneId {
    fn from(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| Self::Label(String::new()))
    }
}

/// Matrix dimension a correspondence is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Origin,
    Destination,
    /// Single-dimension zone vectors (trip ends, households).
    Zone,
}

impl Dimension {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Destination => "destination",
            Self::Zone => "zone",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
