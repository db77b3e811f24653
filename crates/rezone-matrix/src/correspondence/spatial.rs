//! Two-way correspondence from overlaying two zoning systems.
//!
//! Each row describes one intersection of a zone in system 1 with a zone in
//! system 2, as the share of each zone's area (or population) that falls in
//! the intersection.

use rezone_core::errors::CorrespondenceError;
use rezone_core::Zone;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::table::CorrespondenceTable;
use super::types::CorrespondenceRecord;

/// One intersection between a system-1 zone and a system-2 zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialRow<A, B> {
    pub zone_1: A,
    pub zone_2: B,
    /// Share of `zone_1` inside the intersection.
    pub zone_1_to_zone_2: f64,
    /// Share of `zone_2` inside the intersection.
    pub zone_2_to_zone_1: f64,
}

/// Overlay of two zoning systems, usable in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialCorrespondence<A, B> {
    rows: Vec<SpatialRow<A, B>>,
}

impl<A: Zone, B: Zone> SpatialCorrespondence<A, B> {
    pub fn new(rows: Vec<SpatialRow<A, B>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[SpatialRow<A, B>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Split off slivers: intersections that are a small share of both zones.
    ///
    /// A row is a sliver when both of its factors are below `1 - tolerance`
    /// (a tolerance of 0.98 keeps only overlaps covering at least 2% of one
    /// side). Returns `(kept, slivers)`.
    pub fn filter_slivers(&self, tolerance: f64) -> (Self, Self) {
        let threshold = 1.0 - tolerance;
        let (slivers, kept): (Vec<_>, Vec<_>) = self.rows.iter().cloned().partition(|r| {
            r.zone_1_to_zone_2 < threshold && r.zone_2_to_zone_1 < threshold
        });
        debug!(kept = kept.len(), slivers = slivers.len(), "filtered sliver overlaps");
        (Self::new(kept), Self::new(slivers))
    }

    /// Correspondence from system 1 onto system 2.
    pub fn forward_table(&self, tolerance: f64) -> Result<CorrespondenceTable<A, B>, CorrespondenceError> {
        CorrespondenceTable::new(
            self.rows.iter().map(|r| {
                CorrespondenceRecord::new(r.zone_1.clone(), r.zone_2.clone(), r.zone_1_to_zone_2)
            }),
            tolerance,
        )
    }

    /// Correspondence from system 2 onto system 1.
    pub fn reverse_table(&self, tolerance: f64) -> Result<CorrespondenceTable<B, A>, CorrespondenceError> {
        CorrespondenceTable::new(
            self.rows.iter().map(|r| {
                CorrespondenceRecord::new(r.zone_2.clone(), r.zone_1.clone(), r.zone_2_to_zone_1)
            }),
            tolerance,
        )
    }
}
