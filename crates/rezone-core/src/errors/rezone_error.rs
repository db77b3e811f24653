//! Rezoning errors.

use std::fmt;

use crate::types::Dimension;

/// Zones of one dimension that have no correspondence entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingZones {
    pub dimension: Dimension,
    pub zones: Vec<String>,
}

impl fmt::Display for MissingZones {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "there are {} zones missing from the {} lookup: [{}]",
            self.zones.len(),
            self.dimension,
            self.zones.join(", ")
        )
    }
}

/// Zones of one dimension whose splitting factors do not sum to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnbalancedZones {
    pub dimension: Dimension,
    pub zones: Vec<String>,
}

impl fmt::Display for UnbalancedZones {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} unbalanced zones in the {} lookup: [{}]",
            self.zones.len(),
            self.dimension,
            self.zones.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RezoneError {
    #[error("correspondence table for the {dimension} dimension is empty")]
    EmptyCorrespondence { dimension: Dimension },

    #[error("{}", join_lists(.missing))]
    MissingLookupValues { missing: Vec<MissingZones> },

    #[error("{}", join_lists(.unbalanced))]
    UnbalancedCorrespondence { unbalanced: Vec<UnbalancedZones> },
}

impl RezoneError {
    /// Every zone named by a `MissingLookupValues` error, across dimensions.
    pub fn missing_zones(&self) -> Vec<&str> {
        match self {
            Self::MissingLookupValues { missing } => missing
                .iter()
                .flat_map(|m| m.zones.iter().map(String::as_str))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Every zone named by an `UnbalancedCorrespondence` error, across dimensions.
    pub fn unbalanced_zones(&self) -> Vec<&str> {
        match self {
            Self::UnbalancedCorrespondence { unbalanced } => unbalanced
                .iter()
                .flat_map(|u| u.zones.iter().map(String::as_str))
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn join_lists<T: fmt::Display>(lists: &[T]) -> String {
    lists
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
