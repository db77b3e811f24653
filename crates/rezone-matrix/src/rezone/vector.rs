//! Single-dimension rezoning of zone vectors (trip ends, households, floorspace).

use std::collections::BTreeMap;

use rezone_core::errors::RezoneError;
use rezone_core::{Dimension, Zone};
use tracing::{debug, debug_span, warn};

use crate::correspondence::CorrespondenceTable;

use super::rezoner::{ensure_populated, MatrixRezoner, SplitResolver};
use super::types::{RezonedVector, VectorReport};

impl MatrixRezoner {
    /// Rezone `(zone, value)` pairs with the same rules as matrix rezoning.
    ///
    /// Repeated input zones are summed. Non-finite values are skipped.
    pub fn rezone_vector<O, N, I>(
        &self,
        values: I,
        table: &CorrespondenceTable<O, N>,
    ) -> Result<RezonedVector<O, N>, RezoneError>
    where
        O: Zone,
        N: Zone,
        I: IntoIterator<Item = (O, f64)>,
    {
        ensure_populated(table, Dimension::Zone)?;
        let _span = debug_span!("rezone_vector").entered();

        let options = self.options();
        let mut resolver = SplitResolver::new(table, options.unbalanced);
        let mut out: BTreeMap<N, f64> = BTreeMap::new();
        let mut input_total = 0.0;
        let mut dropped_volume = 0.0;
        let mut skipped = 0usize;

        for (zone, value) in values {
            if !value.is_finite() {
                skipped += 1;
                continue;
            }
            input_total += value;
            let Some((splits, scale)) = resolver.resolve(&zone) else {
                dropped_volume += value;
                continue;
            };
            for (new_zone, factor) in splits {
                let share = value * factor * scale;
                if share != 0.0 {
                    *out.entry(new_zone.clone()).or_insert(0.0) += share;
                }
            }
        }

        let zones = resolver.finish();
        self.check_strict(&[(Dimension::Zone, &zones)])?;

        if skipped > 0 {
            warn!(skipped, "non-finite values skipped while rezoning vector");
        }
        if dropped_volume != 0.0 {
            warn!(
                dropped = dropped_volume,
                missing = zones.missing.len(),
                "values dropped for zones missing from the correspondence"
            );
        }

        let output_total: f64 = out.values().sum();
        debug!(input = input_total, output = output_total, "vector rezoning complete");

        Ok(RezonedVector {
            values: out,
            report: VectorReport {
                input_total,
                output_total,
                dropped_volume,
                zones,
            },
        })
    }
}
