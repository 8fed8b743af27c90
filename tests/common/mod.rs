// Released under MIT License.
// Copyright (c) 2024 Ladislav Bartos

//! Functions used in various integration tests.

use std::fs::read_to_string;

/// Test utility. Read the standard deviations and the name of the input file from a `boot.dat` file.
/// Panics if the file does not have the expected format.
#[allow(dead_code)]
pub(super) fn read_boot_dat(file: &str) -> (f64, f64, f64, String) {
    let content = read_to_string(file).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(lines.len(), 2, "Output file must have 2 lines");
    assert_eq!(lines[0], "# Closed interi interii");

    let fields: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(fields.len(), 4, "Data line must have 4 columns");

    (
        fields[0].parse().unwrap(),
        fields[1].parse().unwrap(),
        fields[2].parse().unwrap(),
        fields[3].to_owned(),
    )
}
