//! OD matrix files: `origin, destination, trips`.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rezone_core::errors::LoadError;
use rezone_core::{Zone, ZoneId};
use tracing::{debug, info};

use crate::matrix::ODMatrix;

use super::delimited::{read_delimited, HeaderMode};

/// Column names that mark the first line of a matrix file as a header.
const MATRIX_COLUMNS: &[&str] = &[
    "origin", "destination", "trips", "orig", "dest", "o", "d", "from", "to", "demand", "value",
];

/// Read a three-column OD matrix.
///
/// The file may be comma or tab separated, with or without a header row.
/// Only the first three columns are used. Repeated cells are summed and
/// blank or zero trip values are skipped.
pub fn read_od_matrix(path: &Path) -> Result<ODMatrix<ZoneId>, LoadError> {
    let header = HeaderMode::Detect {
        numeric_column: 2,
        names: MATRIX_COLUMNS,
    };
    let file = read_delimited(path, header)?;
    let mut matrix = ODMatrix::with_capacity(file.rows.len());

    for row in &file.rows {
        let (Some(o), Some(d), Some(t)) = (row.field(0), row.field(1), row.field(2)) else {
            return Err(file.parse_error(
                row.line,
                format!("expected 3 columns, found {}", row.fields.len()),
            ));
        };
        let origin = ZoneId::parse(o).ok_or_else(|| file.parse_error(row.line, "null origin zone"))?;
        let destination =
            ZoneId::parse(d).ok_or_else(|| file.parse_error(row.line, "null destination zone"))?;
        if t.is_empty() {
            continue;
        }
        let trips: f64 = t
            .parse()
            .map_err(|_| file.parse_error(row.line, format!("trips '{t}' is not a number")))?;
        matrix.insert(origin, destination, trips)?;
    }

    info!(
        path = %path.display(),
        rows = file.rows.len(),
        cells = matrix.len(),
        total = matrix.total(),
        "loaded OD matrix"
    );
    Ok(matrix)
}

/// Write a matrix as `origin,destination,trips`, sorted by origin then destination.
///
/// With `include_zeros` every origin × destination pair over the matrix's
/// zone set is written, including empty cells.
pub fn write_od_matrix<Z: Zone>(
    path: &Path,
    matrix: &ODMatrix<Z>,
    include_zeros: bool,
) -> Result<(), LoadError> {
    let zones = include_zeros.then(|| matrix.zones());
    write_matrix_file(path, matrix, zones.as_ref())
}

/// Write every origin × destination pair over `zones` plus the matrix's own
/// zones, so zones of the target system that received no trips still appear.
pub fn write_od_matrix_dense<'a, Z, I>(
    path: &Path,
    matrix: &'a ODMatrix<Z>,
    zones: I,
) -> Result<(), LoadError>
where
    Z: Zone + 'a,
    I: IntoIterator<Item = &'a Z>,
{
    let mut all = matrix.zones();
    all.extend(zones);
    write_matrix_file(path, matrix, Some(&all))
}

fn write_matrix_file<Z: Zone>(
    path: &Path,
    matrix: &ODMatrix<Z>,
    dense_zones: Option<&BTreeSet<&Z>>,
) -> Result<(), LoadError> {
    let file = File::create(path).map_err(|e| LoadError::io(path, e))?;
    let mut out = BufWriter::new(file);
    write_matrix_rows(&mut out, matrix, dense_zones).map_err(|e| LoadError::io(path, e))?;
    debug!(
        path = %path.display(),
        cells = matrix.len(),
        dense_zones = dense_zones.map(BTreeSet::len),
        "wrote OD matrix"
    );
    Ok(())
}

fn write_matrix_rows<Z: Zone, W: Write>(
    out: &mut W,
    matrix: &ODMatrix<Z>,
    dense_zones: Option<&BTreeSet<&Z>>,
) -> std::io::Result<()> {
    writeln!(out, "origin,destination,trips")?;
    match dense_zones {
        Some(zones) => {
            for o in zones {
                for d in zones {
                    writeln!(out, "{},{},{}", o, d, matrix.get(o, d))?;
                }
            }
        }
        None => {
            for (o, d, v) in matrix.sorted_cells() {
                writeln!(out, "{o},{d},{v}")?;
            }
        }
    }
    out.flush()
}

/// Write a zone vector as `zone,<value_column>`, sorted by zone.
pub fn write_zone_vector<Z: Zone>(
    path: &Path,
    values: &BTreeMap<Z, f64>,
    value_column: &str,
) -> Result<(), LoadError> {
    let file = File::create(path).map_err(|e| LoadError::io(path, e))?;
    let mut out = BufWriter::new(file);
    write_vector_rows(&mut out, values, value_column).map_err(|e| LoadError::io(path, e))
}

fn write_vector_rows<Z: Zone, W: Write>(
    out: &mut W,
    values: &BTreeMap<Z, f64>,
    value_column: &str,
) -> std::io::Result<()> {
    writeln!(out, "zone,{value_column}")?;
    for (zone, value) in values {
        writeln!(out, "{zone},{value}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_rows(matrix: &ODMatrix<u32>, include_zeros: bool) -> String {
        let zones = include_zeros.then(|| matrix.zones());
        let mut buf = Vec::new();
        write_matrix_rows(&mut buf, matrix, zones.as_ref()).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_write_sparse_rows() {
        let m = ODMatrix::from_cells(vec![(2u32, 1u32, 1.5), (1, 2, 3.0)]).unwrap();
        assert_eq!(write_rows(&m, false), "origin,destination,trips\n1,2,3\n2,1,1.5\n");
    }

    #[test]
    fn test_write_vector_rows() {
        let values: BTreeMap<&str, f64> = [("south", 475.0), ("north", 125.5)].into_iter().collect();
        let mut buf = Vec::new();
        write_vector_rows(&mut buf, &values, "households").unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "zone,households\nnorth,125.5\nsouth,475\n"
        );
    }

    #[test]
    fn test_write_dense_rows() {
        let m = ODMatrix::from_cells(vec![(1u32, 2u32, 3.0)]).unwrap();
        assert_eq!(
            write_rows(&m, true),
            "origin,destination,trips\n1,1,0\n1,2,3\n2,1,0\n2,2,0\n"
        );
    }

    #[test]
    fn test_dense_file_covers_zones_without_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dense.csv");
        let m = ODMatrix::from_cells(vec![(1u32, 2u32, 3.0)]).unwrap();
        let system = [1u32, 2, 3];

        write_od_matrix_dense(&path, &m, &system).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1 + 9);
        assert!(text.contains("\n1,2,3\n"));
        assert!(text.contains("\n3,3,0\n"));
    }

    #[test]
    fn test_non_numeric_first_row_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix.csv");
        std::fs::write(&path, "A,X,lots\nB,Y,4\n").unwrap();
        let err = read_od_matrix(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { line: 1, .. }));
    }
}
