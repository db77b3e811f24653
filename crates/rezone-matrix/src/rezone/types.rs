//! Rezoning options, results, and reports.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use rezone_core::config::{RezoneConfig, UnbalancedPolicy};
use rezone_core::Zone;
use serde::Serialize;

use crate::matrix::{CostMatrix, ODMatrix};

/// How the rezoner treats lossy or imperfect correspondences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RezoneOptions {
    /// Abort with `MissingLookupValues` instead of dropping trips.
    pub strict: bool,
    pub unbalanced: UnbalancedPolicy,
}

impl RezoneOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_unbalanced(mut self, policy: UnbalancedPolicy) -> Self {
        self.unbalanced = policy;
        self
    }
}

impl From<&RezoneConfig> for RezoneOptions {
    fn from(config: &RezoneConfig) -> Self {
        Self {
            strict: config.rezone.strict,
            unbalanced: config.rezone.unbalanced,
        }
    }
}

/// Data-quality findings for one rezoned dimension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionReport<O: Ord> {
    /// Zones in the input with no correspondence entry.
    pub missing: BTreeSet<O>,
    /// Unbalanced zones referenced by the input, with their factor sums.
    pub unbalanced: BTreeMap<O, f64>,
}

impl<O: Ord> Default for DimensionReport<O> {
    fn default() -> Self {
        Self {
            missing: BTreeSet::new(),
            unbalanced: BTreeMap::new(),
        }
    }
}

impl<O: Ord> DimensionReport<O> {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty() && self.unbalanced.is_empty()
    }
}

/// Outcome of rezoning an OD matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RezoneReport<O: Ord> {
    pub input_total: f64,
    pub output_total: f64,
    /// Trips dropped because their origin or destination had no correspondence.
    pub dropped_volume: f64,
    pub origin: DimensionReport<O>,
    pub destination: DimensionReport<O>,
    pub unbalanced_policy: UnbalancedPolicy,
}

impl<O: Zone> RezoneReport<O> {
    /// Dropped volume as a percentage of the input total.
    pub fn dropped_percentage(&self) -> f64 {
        if self.input_total > 0.0 {
            self.dropped_volume / self.input_total * 100.0
        } else {
            0.0
        }
    }

    /// Missing zones across both dimensions.
    pub fn missing_zones(&self) -> BTreeSet<&O> {
        self.origin
            .missing
            .iter()
            .chain(self.destination.missing.iter())
            .collect()
    }

    /// Unbalanced zones across both dimensions.
    pub fn unbalanced_zones(&self) -> BTreeSet<&O> {
        self.origin
            .unbalanced
            .keys()
            .chain(self.destination.unbalanced.keys())
            .collect()
    }

    /// True when nothing was dropped.
    pub fn is_lossless(&self) -> bool {
        self.dropped_volume == 0.0
    }

    /// `output_total - (input_total - dropped_volume)`.
    ///
    /// Zero up to summation error when every used zone is balanced or was
    /// normalised.
    pub fn conservation_error(&self) -> f64 {
        self.output_total - (self.input_total - self.dropped_volume)
    }

    pub fn to_json(&self) -> serde_json::Result<String>
    where
        O: Serialize,
    {
        serde_json::to_string_pretty(self)
    }
}

impl<O: Zone> fmt::Display for RezoneReport<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rezoned {:.3} of {:.3} trips; dropped {:.3} ({:.2}%), {} missing zones, {} unbalanced zones",
            self.output_total,
            self.input_total,
            self.dropped_volume,
            self.dropped_percentage(),
            self.missing_zones().len(),
            self.unbalanced_zones().len()
        )
    }
}

/// A rezoned OD matrix and its report.
#[derive(Debug, Clone)]
pub struct Rezoned<O: Zone, N: Zone> {
    pub matrix: ODMatrix<N>,
    pub report: RezoneReport<O>,
}

/// Outcome of rezoning a single-dimension zone vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorReport<O: Ord> {
    pub input_total: f64,
    pub output_total: f64,
    pub dropped_volume: f64,
    pub zones: DimensionReport<O>,
}

/// A rezoned zone vector, keyed by new zone.
#[derive(Debug, Clone)]
pub struct RezonedVector<O: Zone, N: Zone> {
    pub values: BTreeMap<N, f64>,
    pub report: VectorReport<O>,
}

/// Demand-weighted cost matrix on the new zoning system.
#[derive(Debug, Clone)]
pub struct WeightedCost<O: Zone, N: Zone> {
    /// Average cost per trip in each new cell that receives demand.
    pub costs: CostMatrix<N>,
    /// Rezoned demand used as the weights.
    pub demand: ODMatrix<N>,
    pub report: RezoneReport<O>,
    /// Demand in cells with no cost entry, left out of the weighting.
    pub unmatched_demand: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RezoneReport<&'static str> {
        RezoneReport {
            input_total: 200.0,
            output_total: 150.0,
            dropped_volume: 50.0,
            origin: DimensionReport {
                missing: ["Z"].into_iter().collect(),
                unbalanced: [("B", 0.9)].into_iter().collect(),
            },
            destination: DimensionReport {
                missing: ["Z", "W"].into_iter().collect(),
                unbalanced: BTreeMap::new(),
            },
            unbalanced_policy: UnbalancedPolicy::Keep,
        }
    }

    #[test]
    fn test_report_accessors() {
        let r = report();
        assert_eq!(r.dropped_percentage(), 25.0);
        assert_eq!(r.missing_zones().into_iter().copied().collect::<Vec<_>>(), vec!["W", "Z"]);
        assert_eq!(r.unbalanced_zones().into_iter().copied().collect::<Vec<_>>(), vec!["B"]);
        assert!(!r.is_lossless());
        assert_eq!(r.conservation_error(), 0.0);
    }

    #[test]
    fn test_report_json() {
        let json = report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["dropped_volume"], 50.0);
        assert_eq!(value["origin"]["unbalanced"]["B"], 0.9);
        assert_eq!(value["destination"]["missing"][0], "W");
        assert_eq!(value["unbalanced_policy"], "keep");
    }

    #[test]
    fn test_report_display() {
        assert_eq!(
            report().to_string(),
            "rezoned 150.000 of 200.000 trips; dropped 50.000 (25.00%), 2 missing zones, 1 unbalanced zones"
        );
    }

    #[test]
    fn test_options_from_config() {
        let config = RezoneConfig::from_toml("[rezone]\nstrict = true\nunbalanced = \"reject\"").unwrap();
        let options = RezoneOptions::from(&config);
        assert!(options.strict);
        assert_eq!(options.unbalanced, UnbalancedPolicy::Reject);
        assert_eq!(
            RezoneOptions::strict().with_unbalanced(UnbalancedPolicy::Normalize),
            RezoneOptions {
                strict: true,
                unbalanced: UnbalancedPolicy::Normalize
            }
        );
    }
}
