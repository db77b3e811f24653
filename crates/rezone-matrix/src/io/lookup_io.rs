//! Correspondence lookup files: `old, new, splitting_factor`.

use std::path::Path;

use rezone_core::errors::{CorrespondenceError, LoadError, MalformedReason};
use rezone_core::ZoneId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::correspondence::{CorrespondenceRecord, CorrespondenceTable};

use super::delimited::{read_delimited, Delimited, HeaderMode};

/// Column names that mark the first line of an unnamed lookup as a header.
const LOOKUP_COLUMNS: &[&str] = &[
    "old", "new", "splitting_factor", "factor", "split", "share", "weight", "old_zone", "new_zone",
    "zone_1", "zone_2",
];

/// Header names of the lookup columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupColumns {
    pub old: String,
    pub new: String,
    pub splitting_factor: String,
}

impl Default for LookupColumns {
    fn default() -> Self {
        Self {
            old: "old".to_string(),
            new: "new".to_string(),
            splitting_factor: "splitting_factor".to_string(),
        }
    }
}

impl LookupColumns {
    fn resolve(&self, file: &Delimited) -> Result<[usize; 3], LoadError> {
        let names = [&self.old, &self.new, &self.splitting_factor];
        let indices: Vec<Option<usize>> = names.iter().map(|n| file.column_index(n)).collect();

        let missing: Vec<String> = names
            .iter()
            .zip(&indices)
            .filter(|(_, idx)| idx.is_none())
            .map(|(n, _)| n.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns {
                name: file.path.display().to_string(),
                columns: missing,
            });
        }
        Ok([
            indices[0].unwrap_or(0),
            indices[1].unwrap_or(1),
            indices[2].unwrap_or(2),
        ])
    }
}

/// Read and validate a correspondence lookup.
///
/// With `columns` the file must have a header containing those names. Without
/// it the first three columns are taken as old, new and splitting factor, and
/// a header row is skipped when present.
pub fn read_correspondence(
    path: &Path,
    columns: Option<&LookupColumns>,
    tolerance: f64,
) -> Result<CorrespondenceTable<ZoneId, ZoneId>, LoadError> {
    let header = match columns {
        Some(_) => HeaderMode::Present,
        None => HeaderMode::Detect {
            numeric_column: 2,
            names: LOOKUP_COLUMNS,
        },
    };
    let file = read_delimited(path, header)?;
    let [old_idx, new_idx, factor_idx] = match columns {
        Some(cols) => cols.resolve(&file)?,
        None => [0, 1, 2],
    };
    let width = old_idx.max(new_idx).max(factor_idx) + 1;

    let mut records = Vec::with_capacity(file.rows.len());
    for (i, row) in file.rows.iter().enumerate() {
        if row.fields.len() < width {
            return Err(file.parse_error(
                row.line,
                format!("expected at least {width} columns, found {}", row.fields.len()),
            ));
        }
        let raw_factor = row.field(factor_idx).unwrap_or_default();
        let splitting_factor: f64 = raw_factor.parse().map_err(|_| {
            CorrespondenceError::malformed(
                i + 1,
                MalformedReason::NonNumericFactor {
                    value: raw_factor.to_string(),
                },
            )
        })?;
        records.push(CorrespondenceRecord {
            old_zone: row.field(old_idx).and_then(ZoneId::parse),
            new_zone: row.field(new_idx).and_then(ZoneId::parse),
            splitting_factor,
        });
    }

    let table = CorrespondenceTable::new(records, tolerance)?;
    info!(
        path = %path.display(),
        old_zones = table.len(),
        entries = table.entry_count(),
        unbalanced = table.unbalanced_zones().len(),
        "loaded correspondence lookup"
    );
    Ok(table)
}
