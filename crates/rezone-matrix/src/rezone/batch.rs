//! Parallel rezoning of independent matrices.

use rayon::prelude::*;
use rezone_core::errors::RezoneError;
use rezone_core::Zone;
use tracing::{info, info_span};

use crate::correspondence::CorrespondenceTable;
use crate::matrix::ODMatrix;

use super::rezoner::MatrixRezoner;
use super::types::Rezoned;

/// Result of one named matrix in a batch.
pub type BatchResult<O, N> = (String, Result<Rezoned<O, N>, RezoneError>);

impl MatrixRezoner {
    /// Rezone many named matrices (time periods, vehicle types) in parallel.
    ///
    /// Each matrix gets its own accumulator; one failure does not stop the
    /// others. Results come back in input order.
    pub fn rezone_batch<O: Zone, N: Zone>(
        &self,
        matrices: &[(String, ODMatrix<O>)],
        origin_table: &CorrespondenceTable<O, N>,
        destination_table: &CorrespondenceTable<O, N>,
    ) -> Vec<BatchResult<O, N>> {
        let results: Vec<BatchResult<O, N>> = matrices
            .par_iter()
            .map(|(name, matrix)| {
                let _span = info_span!("rezone_batch_item", name = %name).entered();
                (name.clone(), self.rezone_od(matrix, origin_table, destination_table))
            })
            .collect();

        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        info!(matrices = results.len(), failed, "batch rezoning complete");
        results
    }
}
