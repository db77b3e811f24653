//! Demand-weighted rezoning of cost matrices.
//!
//! Costs cannot be split like trips: a new cell's cost is the demand-weighted
//! average of the old cells that feed it. Both `cost × trips` and `trips` are
//! rezoned, then divided cell by cell.

use rezone_core::errors::RezoneError;
use rezone_core::Zone;
use tracing::{debug_span, warn};

use crate::correspondence::CorrespondenceTable;
use crate::matrix::{CostMatrix, ODMatrix};

use super::rezoner::MatrixRezoner;
use super::types::WeightedCost;

impl MatrixRezoner {
    /// Rezone `cost` weighted by `demand`.
    ///
    /// Demand and cost are inner-joined on cell. Zero-cost cells take part and
    /// pull the average down; demand in cells with no cost entry is excluded
    /// and reported as `unmatched_demand`.
    pub fn rezone_weighted_cost<O: Zone, N: Zone>(
        &self,
        cost: &CostMatrix<O>,
        demand: &ODMatrix<O>,
        origin_table: &CorrespondenceTable<O, N>,
        destination_table: &CorrespondenceTable<O, N>,
    ) -> Result<WeightedCost<O, N>, RezoneError> {
        let _span = debug_span!("rezone_weighted_cost", cost_cells = cost.len(), demand_cells = demand.len())
            .entered();

        let mut trips = ODMatrix::with_capacity(demand.len());
        let mut cost_x_trips = ODMatrix::with_capacity(demand.len());
        let mut unmatched_demand = 0.0;

        for (o, d, t) in demand.iter() {
            let Some(c) = cost.get(o, d) else {
                unmatched_demand += t;
                continue;
            };
            trips.cells_mut().insert((o.clone(), d.clone()), t);
            let weighted = c * t;
            // Zero-cost cells still count through `trips`.
            if weighted > 0.0 {
                cost_x_trips.cells_mut().insert((o.clone(), d.clone()), weighted);
            }
        }
        if unmatched_demand > 0.0 {
            warn!(unmatched_demand, "demand without a matching cost left out of the weighting");
        }

        let rezoned_trips = self.rezone_od(&trips, origin_table, destination_table)?;
        let rezoned_cost = self.rezone_od(&cost_x_trips, origin_table, destination_table)?;

        let mut costs = CostMatrix::with_capacity(rezoned_trips.matrix.len());
        for (o, d, t) in rezoned_trips.matrix.iter() {
            let average = rezoned_cost.matrix.get(o, d) / t;
            if costs.set(o.clone(), d.clone(), average).is_err() {
                warn!(origin = %o, destination = %d, "non-finite weighted cost skipped");
            }
        }

        Ok(WeightedCost {
            costs,
            demand: rezoned_trips.matrix,
            report: rezoned_trips.report,
            unmatched_demand,
        })
    }
}
