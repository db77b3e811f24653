//! End-to-end rezoning through delimited files.

use std::fs;

use rezone_core::config::{RezoneConfig, DEFAULT_TOLERANCE};
use rezone_core::errors::{LoadError, RezoneError};
use rezone_core::ZoneId;
use rezone_matrix::io::{
    read_correspondence, read_od_matrix, write_od_matrix, write_od_matrix_dense, LookupColumns,
};
use rezone_matrix::{MatrixRezoner, RezoneOptions};

const LOOKUP: &str = "\
lsoa,msoa,split
E01,M1,1
E02,M1,0.25
E02,M2,0.75
E03,M2,1
";

const MATRIX: &str = "\
origin\tdestination\ttrips
E01\tE02\t100
E02\tE03\t40
E03\tE01\t12.5
E09\tE01\t7
";

fn columns() -> LookupColumns {
    LookupColumns {
        old: "lsoa".into(),
        new: "msoa".into(),
        splitting_factor: "split".into(),
    }
}

#[test]
fn test_rezone_files_and_write_back() {
    rezone_core::tracing::init_for_tests();
    let dir = tempfile::tempdir().unwrap();
    let lookup_path = dir.path().join("lookup.csv");
    let matrix_path = dir.path().join("matrix.tsv");
    let out_path = dir.path().join("rezoned.csv");
    fs::write(&lookup_path, LOOKUP).unwrap();
    fs::write(&matrix_path, MATRIX).unwrap();

    let table = read_correspondence(&lookup_path, Some(&columns()), DEFAULT_TOLERANCE).unwrap();
    let matrix = read_od_matrix(&matrix_path).unwrap();
    assert_eq!(matrix.len(), 4);

    let result = MatrixRezoner::with_defaults().rezone(&matrix, &table).unwrap();
    let m1 = ZoneId::from("M1");
    let m2 = ZoneId::from("M2");
    assert_eq!(result.matrix.get(&m1, &m1), 25.0);
    assert_eq!(result.matrix.get(&m1, &m2), 85.0);
    assert_eq!(result.matrix.get(&m2, &m2), 30.0);
    assert_eq!(result.matrix.get(&m2, &m1), 12.5);
    assert_eq!(result.report.dropped_volume, 7.0);
    assert!(result.report.origin.missing.contains(&ZoneId::from("E09")));

    write_od_matrix(&out_path, &result.matrix, false).unwrap();
    let written = fs::read_to_string(&out_path).unwrap();
    assert_eq!(
        written,
        "origin,destination,trips\nM1,M1,25\nM1,M2,85\nM2,M1,12.5\nM2,M2,30\n"
    );
    assert_eq!(read_od_matrix(&out_path).unwrap(), result.matrix);
}

#[test]
fn test_strict_config_aborts_on_missing_zone() {
    let dir = tempfile::tempdir().unwrap();
    let lookup_path = dir.path().join("lookup.csv");
    let matrix_path = dir.path().join("matrix.tsv");
    fs::write(&lookup_path, LOOKUP).unwrap();
    fs::write(&matrix_path, MATRIX).unwrap();

    let config = RezoneConfig::from_toml("[rezone]\nstrict = true\n").unwrap();
    let table = read_correspondence(
        &lookup_path,
        Some(&columns()),
        config.correspondence.tolerance,
    )
    .unwrap();
    let matrix = read_od_matrix(&matrix_path).unwrap();

    let err = MatrixRezoner::new(RezoneOptions::from(&config))
        .rezone(&matrix, &table)
        .unwrap_err();
    assert!(matches!(err, RezoneError::MissingLookupValues { .. }));
    assert_eq!(err.missing_zones(), vec!["E09"]);
}

#[test]
fn test_dense_output_includes_zero_cells() {
    let dir = tempfile::tempdir().unwrap();
    let matrix_path = dir.path().join("matrix.csv");
    let out_path = dir.path().join("dense.csv");
    fs::write(&matrix_path, "1,2,5\n2,2,1.5\n").unwrap();

    let matrix = read_od_matrix(&matrix_path).unwrap();
    write_od_matrix(&out_path, &matrix, true).unwrap();
    assert_eq!(
        fs::read_to_string(&out_path).unwrap(),
        "origin,destination,trips\n1,1,0\n1,2,5\n2,1,0\n2,2,1.5\n"
    );
}

#[test]
fn test_dense_output_keeps_target_zones_without_trips() {
    let dir = tempfile::tempdir().unwrap();
    let lookup_path = dir.path().join("lookup.csv");
    let out_path = dir.path().join("dense.csv");
    fs::write(&lookup_path, "old,new,splitting_factor\n1,10,1\n2,20,1\n3,30,1\n").unwrap();

    let table = read_correspondence(&lookup_path, None, DEFAULT_TOLERANCE).unwrap();
    let matrix = rezone_matrix::ODMatrix::from_cells(vec![(ZoneId::from(1), ZoneId::from(2), 4.0)]).unwrap();
    let result = MatrixRezoner::with_defaults().rezone(&matrix, &table).unwrap();

    write_od_matrix_dense(&out_path, &result.matrix, table.new_zones()).unwrap();
    let text = fs::read_to_string(&out_path).unwrap();
    let rows: Vec<&str> = text.lines().skip(1).collect();
    assert_eq!(rows.len(), 9);
    assert_eq!(rows[1], "10,20,4");
    assert_eq!(rows[8], "30,30,0");
}

#[test]
fn test_conflicting_duplicate_rows_fail_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lookup.csv");
    fs::write(&path, "A,X,0.5\nA,X,0.5\nB,Y,1\nA,X,0.7\n").unwrap();

    let err = read_correspondence(&path, None, DEFAULT_TOLERANCE).unwrap_err();
    match err {
        LoadError::Correspondence(e) => assert_eq!(e.row(), 4),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_od_matrix(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}
