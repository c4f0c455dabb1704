// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs;

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use crate::{get_cmd_output, make_data_dir, varsky};

#[test]
fn test_scintillate_positions() {
    let tmp = TempDir::new().unwrap();
    make_data_dir(tmp.path());
    let out = tmp.path().join("los.csv");

    #[rustfmt::skip]
    let cmd = varsky()
        .args([
            "scintillate",
            "--ra", "10", "200.5",
            "--dec", "-30", "45",
            "--data-dir", &tmp.path().display().to_string(),
            "-o", &out.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "scintillate failed: {:?}", get_cmd_output(cmd));

    let contents = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("RA,DEC,H_Alpha"));
    for (line, (ra, dec)) in lines[1..].iter().zip([(10.0, -30.0), (200.5, 45.0)]) {
        let fields: Vec<f64> = line.split(',').map(|f| f.parse().unwrap()).collect();
        assert_eq!(fields.len(), 15);
        assert_abs_diff_eq!(fields[0], ra, epsilon = 1e-10);
        assert_abs_diff_eq!(fields[1], dec, epsilon = 1e-10);
        // Hα and its error.
        assert_abs_diff_eq!(fields[2], 1.0);
        assert_abs_diff_eq!(fields[3], 0.1, epsilon = 1e-7);
    }
}

#[test]
fn test_scintillate_grid_is_logged() {
    let tmp = TempDir::new().unwrap();
    make_data_dir(tmp.path());

    #[rustfmt::skip]
    let cmd = varsky()
        .args([
            "los",
            "--grid-step", "90",
            "--data-dir", &tmp.path().display().to_string(),
            "--map-version", "1",
        ])
        .ok();
    assert!(cmd.is_ok(), "scintillate failed: {:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("12 positions"));
    assert!(stdout.contains("RA  270.000° Dec   90.000°"));
}

#[test]
fn test_scintillate_mismatched_positions_fail() {
    let tmp = TempDir::new().unwrap();
    make_data_dir(tmp.path());

    #[rustfmt::skip]
    let cmd = varsky()
        .args([
            "scintillate",
            "--ra", "10", "20",
            "--dec", "-30",
            "--data-dir", &tmp.path().display().to_string(),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("2 RAs were given, but 1 Decs"), "{stderr}");
}

#[test]
fn test_scintillate_positions_conflict_with_grid() {
    #[rustfmt::skip]
    let cmd = varsky()
        .args([
            "scintillate",
            "--ra", "10",
            "--dec", "-30",
            "--grid-step", "10",
        ])
        .ok();
    assert!(cmd.is_err());
}
