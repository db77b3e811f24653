//! Raw correspondence rows as supplied by a tabular source.

use rezone_core::errors::{CorrespondenceError, MalformedReason};
use rezone_core::Zone;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// New-zone splits of one old zone. Fan-out is usually a handful of zones.
pub type Splits<N> = SmallVec<[(N, f64); 4]>;

/// One unvalidated row of a correspondence table.
///
/// Zones are optional because tabular sources can contain null cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrespondenceRecord<O, N> {
    pub old_zone: Option<O>,
    pub new_zone: Option<N>,
    pub splitting_factor: f64,
}

impl<O: Zone, N: Zone> CorrespondenceRecord<O, N> {
    pub fn new(old_zone: O, new_zone: N, splitting_factor: f64) -> Self {
        Self {
            old_zone: Some(old_zone),
            new_zone: Some(new_zone),
            splitting_factor,
        }
    }

    /// Check the row in isolation. `row` is the 1-based data row for error reporting.
    pub(crate) fn validate(self, row: usize) -> Result<(O, N, f64), CorrespondenceError> {
        let old = self.old_zone.ok_or(CorrespondenceError::malformed(
            row,
            MalformedReason::NullZone { column: "old" },
        ))?;
        let new = self.new_zone.ok_or(CorrespondenceError::malformed(
            row,
            MalformedReason::NullZone { column: "new" },
        ))?;

        let value = self.splitting_factor;
        if !value.is_finite() {
            return Err(CorrespondenceError::malformed(
                row,
                MalformedReason::NonFiniteFactor { value },
            ));
        }
        if value < 0.0 {
            return Err(CorrespondenceError::malformed(
                row,
                MalformedReason::NegativeFactor { value },
            ));
        }
        Ok((old, new, value))
    }
}

impl<O: Zone, N: Zone> From<(O, N, f64)> for CorrespondenceRecord<O, N> {
    fn from((old_zone, new_zone, splitting_factor): (O, N, f64)) -> Self {
        Self::new(old_zone, new_zone, splitting_factor)
    }
}
