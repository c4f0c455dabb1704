// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use super::*;
use crate::raster::{tests::write_uniform_data_dir, MapVersion};

fn args_with_maps(dir: &TempDir) -> ScintillateArgs {
    write_uniform_data_dir(dir.path(), MapVersion::Legacy, 1.0, 0.1, 1e-4);
    ScintillateArgs {
        map_args: SkyMapArgs {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn grid_covers_the_sky() {
    let grid = sky_grid(30.0).unwrap();
    // 12 RAs and 7 Decs (-90 to 90 inclusive).
    assert_eq!(grid.len(), 12 * 7);
    assert_abs_diff_eq!(grid[0].dec.to_degrees(), -90.0, epsilon = 1e-10);
    assert_abs_diff_eq!(grid[grid.len() - 1].dec.to_degrees(), 90.0, epsilon = 1e-10);
    assert_abs_diff_eq!(grid[11].ra.to_degrees(), 330.0, epsilon = 1e-10);

    // Steps that don't divide 360 still cover the whole of RA.
    let grid = sky_grid(50.0).unwrap();
    assert_eq!(grid.len(), 8 * 4);
}

#[test]
fn bad_grid_steps() {
    for step in [0.0, -1.0, 181.0, f64::NAN] {
        assert!(matches!(
            sky_grid(step),
            Err(ScintillateArgsError::BadGridStep(_))
        ));
    }
}

#[test]
fn positions_are_required() {
    let result = ScintillateArgs::default().parse();
    assert!(matches!(result, Err(VarskyError::InvalidConfiguration(_))));

    let result = ScintillateArgs {
        ra: Some(vec![10.0]),
        ..Default::default()
    }
    .parse();
    assert!(matches!(result, Err(VarskyError::InvalidConfiguration(_))));
}

#[test]
fn mismatched_positions() {
    let result = ScintillateArgs {
        ra: Some(vec![10.0, 20.0]),
        dec: Some(vec![-30.0]),
        ..Default::default()
    }
    .parse();
    match result {
        Err(VarskyError::InvalidConfiguration(msg)) => assert!(msg.contains("2 RAs")),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected an error"),
    }
}

#[test]
fn invalid_dec() {
    let result = ScintillateArgs {
        ra: Some(vec![10.0]),
        dec: Some(vec![-95.0]),
        ..Default::default()
    }
    .parse();
    assert!(matches!(result, Err(VarskyError::InvalidConfiguration(_))));
}

#[test]
fn non_positive_size() {
    let result = ScintillateArgs {
        ra: Some(vec![10.0]),
        dec: Some(vec![-30.0]),
        size: Some(0.0),
        ..Default::default()
    }
    .parse();
    match result {
        Err(VarskyError::InvalidConfiguration(msg)) => assert!(msg.contains("--size")),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("expected an error"),
    }
}

#[test]
fn parse_converts_units() {
    let tmp = TempDir::new().unwrap();
    let mut args = args_with_maps(&tmp);
    args.ra = Some(vec![-10.0, 370.0]);
    args.dec = Some(vec![-30.0, 45.0]);
    args.freq = Some(150.0);
    args.size = Some(10.0);
    args.velocity = Some(20.0);

    let params = args.parse().unwrap();
    assert_eq!(params.positions.len(), 2);
    assert_abs_diff_eq!(params.positions[0].ra.to_degrees(), 350.0, epsilon = 1e-10);
    assert_abs_diff_eq!(params.positions[1].ra.to_degrees(), 10.0, epsilon = 1e-10);
    assert_abs_diff_eq!(params.freq, 150e6);
    assert_abs_diff_eq!(params.size, 10e-3 / 3600.0);
    assert_abs_diff_eq!(params.velocity, 20e3);
    assert_abs_diff_eq!(params.num_years, DEFAULT_NUM_YEARS);
    assert!(params.out.is_none());
}

#[test]
fn run_writes_lines_of_sight() {
    let tmp = TempDir::new().unwrap();
    let mut args = args_with_maps(&tmp);
    let out = tmp.path().join("los.csv");
    args.grid_step = Some(90.0);
    args.out = Some(out.clone());

    let params = args.parse().unwrap();
    let lines = params.run().unwrap();
    // 4 RAs and 3 Decs.
    assert_eq!(lines.len(), 12);
    // The maps are uniform, so every line of sight is the same.
    for l in &lines[1..] {
        assert_abs_diff_eq!(l.modulation.value, lines[0].modulation.value);
        assert_abs_diff_eq!(l.halpha.value, 1.0);
    }

    let contents = std::fs::read_to_string(out).unwrap();
    assert_eq!(contents.lines().count(), 13);
    assert!(contents.starts_with("RA,DEC,"));
}
