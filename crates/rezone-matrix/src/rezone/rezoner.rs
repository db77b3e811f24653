//! Two-pass fractional redistribution of OD matrices.
//!
//! Every input cell `(o, d, trips)` contributes `trips * f_i * g_j` to the
//! output cell `(o_i, d_j)` for each origin split `(o_i, f_i)` and
//! destination split `(d_j, g_j)`. Contributions are accumulated into a
//! sparse map keyed by new zone pair, so no dense zone × zone matrix is ever
//! materialised.

use std::collections::{BTreeMap, BTreeSet};

use rezone_core::config::UnbalancedPolicy;
use rezone_core::errors::{MissingZones, RezoneError, UnbalancedZones};
use rezone_core::types::collections::fx_map_with_capacity;
use rezone_core::{Dimension, Zone};
use tracing::{debug, debug_span, warn};

use crate::correspondence::CorrespondenceTable;
use crate::matrix::ODMatrix;

use super::types::{DimensionReport, RezoneOptions, RezoneReport, Rezoned};

/// Relative tolerance for the post-run conservation check.
const CONSERVATION_TOLERANCE: f64 = 1e-9;

/// Applies correspondence tables to OD matrices.
///
/// Stateless apart from its options; one rezoner can serve any number of
/// concurrent calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixRezoner {
    options: RezoneOptions,
}

impl MatrixRezoner {
    pub fn new(options: RezoneOptions) -> Self {
        Self { options }
    }

    /// Lenient rezoner: missing zones are dropped and unbalanced factors kept.
    pub fn with_defaults() -> Self {
        Self::new(RezoneOptions::default())
    }

    pub fn options(&self) -> RezoneOptions {
        self.options
    }

    /// Rezone both dimensions with the same table.
    pub fn rezone<O: Zone, N: Zone>(
        &self,
        matrix: &ODMatrix<O>,
        table: &CorrespondenceTable<O, N>,
    ) -> Result<Rezoned<O, N>, RezoneError> {
        self.rezone_od(matrix, table, table)
    }

    /// Rezone origins with `origin_table` and destinations with `destination_table`.
    ///
    /// Cells whose origin or destination is absent from its table are dropped
    /// and reported, or abort the run in strict mode.
    pub fn rezone_od<O: Zone, N: Zone>(
        &self,
        matrix: &ODMatrix<O>,
        origin_table: &CorrespondenceTable<O, N>,
        destination_table: &CorrespondenceTable<O, N>,
    ) -> Result<Rezoned<O, N>, RezoneError> {
        ensure_populated(origin_table, Dimension::Origin)?;
        ensure_populated(destination_table, Dimension::Destination)?;

        let _span = debug_span!(
            "rezone_od",
            cells = matrix.len(),
            strict = self.options.strict,
            unbalanced = %self.options.unbalanced
        )
        .entered();

        let policy = self.options.unbalanced;
        let mut origins = SplitResolver::new(origin_table, policy);
        let mut destinations = SplitResolver::new(destination_table, policy);

        let mut out = fx_map_with_capacity(matrix.len());
        let mut input_total = 0.0;
        let mut dropped_volume = 0.0;

        for (o, d, trips) in matrix.iter() {
            input_total += trips;

            // Resolve both ends first so every missing zone gets recorded.
            let origin_splits = origins.resolve(o);
            let destination_splits = destinations.resolve(d);
            let (Some((o_splits, o_scale)), Some((d_splits, d_scale))) =
                (origin_splits, destination_splits)
            else {
                dropped_volume += trips;
                continue;
            };

            for (new_o, f) in o_splits {
                let origin_share = trips * f * o_scale;
                if origin_share == 0.0 {
                    continue;
                }
                for (new_d, g) in d_splits {
                    let value = origin_share * g * d_scale;
                    if value > 0.0 {
                        *out.entry((new_o.clone(), new_d.clone())).or_insert(0.0) += value;
                    }
                }
            }
        }

        let origin = origins.finish();
        let destination = destinations.finish();
        self.check_strict(&[(Dimension::Origin, &origin), (Dimension::Destination, &destination)])?;

        let rezoned = ODMatrix::from_accumulator(out);
        let report = RezoneReport {
            input_total,
            output_total: rezoned.total(),
            dropped_volume,
            origin,
            destination,
            unbalanced_policy: policy,
        };
        log_outcome(&report);

        Ok(Rezoned {
            matrix: rezoned,
            report,
        })
    }

    /// Apply strict-mode and `Reject` policy checks to finished dimension reports.
    pub(crate) fn check_strict<O: Zone>(
        &self,
        dimensions: &[(Dimension, &DimensionReport<O>)],
    ) -> Result<(), RezoneError> {
        if self.options.strict {
            let missing: Vec<MissingZones> = dimensions
                .iter()
                .filter(|(_, report)| !report.missing.is_empty())
                .map(|(dimension, report)| MissingZones {
                    dimension: *dimension,
                    zones: report.missing.iter().map(ToString::to_string).collect(),
                })
                .collect();
            if !missing.is_empty() {
                return Err(RezoneError::MissingLookupValues { missing });
            }
        }

        if self.options.unbalanced == UnbalancedPolicy::Reject {
            let unbalanced: Vec<UnbalancedZones> = dimensions
                .iter()
                .filter(|(_, report)| !report.unbalanced.is_empty())
                .map(|(dimension, report)| UnbalancedZones {
                    dimension: *dimension,
                    zones: report.unbalanced.keys().map(ToString::to_string).collect(),
                })
                .collect();
            if !unbalanced.is_empty() {
                return Err(RezoneError::UnbalancedCorrespondence { unbalanced });
            }
        }
        Ok(())
    }
}

pub(crate) fn ensure_populated<O: Zone, N: Zone>(
    table: &CorrespondenceTable<O, N>,
    dimension: Dimension,
) -> Result<(), RezoneError> {
    if table.is_empty() {
        return Err(RezoneError::EmptyCorrespondence { dimension });
    }
    Ok(())
}

/// Looks up splits for one dimension and records what it had to skip.
pub(crate) struct SplitResolver<'a, O: Zone, N: Zone> {
    table: &'a CorrespondenceTable<O, N>,
    policy: UnbalancedPolicy,
    missing: BTreeSet<O>,
    unbalanced: BTreeMap<O, f64>,
}

impl<'a, O: Zone, N: Zone> SplitResolver<'a, O, N> {
    pub(crate) fn new(table: &'a CorrespondenceTable<O, N>, policy: UnbalancedPolicy) -> Self {
        Self {
            table,
            policy,
            missing: BTreeSet::new(),
            unbalanced: BTreeMap::new(),
        }
    }

    /// Splits of `zone` and the scale to apply to each factor, or `None`
    /// when the zone cannot be rezoned.
    pub(crate) fn resolve(&mut self, zone: &O) -> Option<(&'a [(N, f64)], f64)> {
        let table = self.table;
        let splits = table.lookup(zone);
        if splits.is_empty() {
            if !self.missing.contains(zone) {
                self.missing.insert(zone.clone());
            }
            return None;
        }

        if !table.is_unbalanced(zone) {
            return Some((splits, 1.0));
        }

        let sum = table.factor_sum(zone).unwrap_or(0.0);
        if !self.unbalanced.contains_key(zone) {
            self.unbalanced.insert(zone.clone(), sum);
        }
        match self.policy {
            UnbalancedPolicy::Normalize if sum > 0.0 => Some((splits, 1.0 / sum)),
            UnbalancedPolicy::Normalize => {
                // Nothing to rescale: the zone carries no weight at all.
                if !self.missing.contains(zone) {
                    self.missing.insert(zone.clone());
                }
                None
            }
            UnbalancedPolicy::Keep | UnbalancedPolicy::Reject => Some((splits, 1.0)),
        }
    }

    pub(crate) fn finish(self) -> DimensionReport<O> {
        DimensionReport {
            missing: self.missing,
            unbalanced: self.unbalanced,
        }
    }
}

fn log_outcome<O: Zone>(report: &RezoneReport<O>) {
    if report.dropped_volume > 0.0 {
        warn!(
            dropped = report.dropped_volume,
            percent = report.dropped_percentage(),
            missing_origins = report.origin.missing.len(),
            missing_destinations = report.destination.missing.len(),
            "trips dropped for zones missing from the correspondence"
        );
    }
    if !report.origin.unbalanced.is_empty() || !report.destination.unbalanced.is_empty() {
        warn!(
            zones = report.unbalanced_zones().len(),
            policy = %report.unbalanced_policy,
            "matrix references zones with unbalanced splitting factors"
        );
    }

    let balanced = report.unbalanced_zones().is_empty()
        || report.unbalanced_policy == UnbalancedPolicy::Normalize;
    let error = report.conservation_error().abs();
    if balanced && error > CONSERVATION_TOLERANCE * report.input_total.max(1.0) {
        warn!(error, "rezoned total differs from input less dropped volume");
    }

    debug!(
        input = report.input_total,
        output = report.output_total,
        dropped = report.dropped_volume,
        "rezoning complete"
    );
}
