//! Headline statistics of an OD matrix.

use std::fmt;

use rezone_core::Zone;
use serde::Serialize;

use super::od::ODMatrix;

/// Summary of an OD matrix, for logging and reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixSummary {
    pub total_trips: f64,
    /// Non-zero cells.
    pub cells: usize,
    pub zones: usize,
    pub origins: usize,
    pub destinations: usize,
    /// Trips whose origin and destination are the same zone.
    pub intrazonal_trips: f64,
    pub max_cell: f64,
}

impl<Z: Zone> ODMatrix<Z> {
    pub fn summary(&self) -> MatrixSummary {
        let mut intrazonal_trips = 0.0;
        let mut max_cell = 0.0f64;
        for (o, d, v) in self.iter() {
            if o == d {
                intrazonal_trips += v;
            }
            max_cell = max_cell.max(v);
        }
        MatrixSummary {
            total_trips: self.total(),
            cells: self.len(),
            zones: self.zones().len(),
            origins: self.origins().len(),
            destinations: self.destinations().len(),
            intrazonal_trips,
            max_cell,
        }
    }
}

impl fmt::Display for MatrixSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.3} trips in {} cells over {} zones ({:.3} intrazonal, largest cell {:.3})",
            self.total_trips, self.cells, self.zones, self.intrazonal_trips, self.max_cell
        )
    }
}
