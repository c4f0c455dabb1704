// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs;
use std::path::{Path, PathBuf};

use indoc::indoc;
use tempfile::TempDir;

use crate::{get_cmd_output, make_data_dir, varsky};

fn write_region(dir: &Path) -> PathBuf {
    let region = dir.join("field.toml");
    fs::write(
        &region,
        indoc! {"
            [[cap]]
            ra = 60.0
            dec = -30.0
            radius = 5.0
        "},
    )
    .unwrap();
    region
}

#[test]
fn test_simulate_dry_run() {
    let tmp = TempDir::new().unwrap();
    make_data_dir(tmp.path());
    let region = write_region(tmp.path());

    let cmd = varsky()
        .args([
            "simulate",
            "--region",
            &region.display().to_string(),
            "--data-dir",
            &tmp.path().display().to_string(),
            "--num-sources",
            "200",
            "--seed",
            "1",
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate --dry-run failed: {:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run"));
    assert!(stdout.contains("Base seed: 1"));
}

#[test]
fn test_simulate_writes_reports_and_catalogs() {
    let tmp = TempDir::new().unwrap();
    make_data_dir(tmp.path());
    let region = write_region(tmp.path());
    let out = tmp.path().join("survey.csv");
    let catalogs = tmp.path().join("catalogs");

    let cmd = varsky()
        .args([
            "sim",
            "-r",
            &region.display().to_string(),
            "--data-dir",
            &tmp.path().display().to_string(),
            "-n",
            "200",
            "-i",
            "3",
            "--seed",
            "12",
            "-o",
            &out.display().to_string(),
            "--catalog-dir",
            &catalogs.display().to_string(),
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {:?}", get_cmd_output(cmd));

    let data = fs::read_to_string(tmp.path().join("survey_data.csv")).unwrap();
    assert_eq!(data.lines().count(), 4);
    assert!(data.starts_with("Iteration,"));
    let results = fs::read_to_string(tmp.path().join("survey_results.csv")).unwrap();
    assert!(results.contains("Areal Sky Density Mean"));
    assert!(results.contains(",Seed,12"));
    for i in 1..=3 {
        assert!(catalogs
            .join(format!("field_tau_m0_iter{i:04}_data.csv"))
            .exists());
    }
}

#[test]
fn test_simulate_runs_are_reproducible() {
    let tmp = TempDir::new().unwrap();
    make_data_dir(tmp.path());
    let region = write_region(tmp.path());

    let mut outputs = vec![];
    for name in ["a.tsv", "b.tsv"] {
        let out = tmp.path().join(name);
        let cmd = varsky()
            .args([
                "simulate",
                "-r",
                &region.display().to_string(),
                "--data-dir",
                &tmp.path().display().to_string(),
                "-n",
                "200",
                "-i",
                "2",
                "--seed",
                "99",
                "-o",
                &out.display().to_string(),
                "--no-progress-bars",
            ])
            .ok();
        assert!(cmd.is_ok(), "simulate failed: {:?}", get_cmd_output(cmd));
        let data = out.with_file_name(name.replace('.', "_data."));
        outputs.push(fs::read_to_string(data).unwrap());
    }
    assert_eq!(outputs[0], outputs[1]);
    assert!(outputs[0].contains('\t'));
}

#[test]
fn test_simulate_with_arg_file_and_save_toml() {
    let tmp = TempDir::new().unwrap();
    make_data_dir(tmp.path());
    let region = write_region(tmp.path());
    let arg_file = tmp.path().join("args.toml");
    fs::write(
        &arg_file,
        format!(
            "[maps]\ndata_dir = {:?}\nmap_version = 1\n\n[simulate]\nregion = {:?}\nnum_sources = 150\nseed = 3\n",
            tmp.path().display().to_string(),
            region.display().to_string()
        ),
    )
    .unwrap();
    let saved = tmp.path().join("saved.toml");

    let cmd = varsky()
        .args([
            "simulate",
            &arg_file.display().to_string(),
            "--iterations",
            "4",
            "--save-toml",
            &saved.display().to_string(),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Map version 1"));
    assert!(stdout.contains("4 iterations"));

    let saved_contents = fs::read_to_string(&saved).unwrap();
    assert!(saved_contents.contains("[simulate]"));
    assert!(saved_contents.contains("iterations = 4"));
    assert!(saved_contents.contains("num_sources = 150"));

    // The saved arguments reproduce the run.
    let cmd = varsky()
        .args(["simulate", &saved.display().to_string(), "--dry-run"])
        .ok();
    assert!(cmd.is_ok(), "simulate failed: {:?}", get_cmd_output(cmd));
}

#[test]
fn test_simulate_without_region_fails() {
    let tmp = TempDir::new().unwrap();
    make_data_dir(tmp.path());

    let cmd = varsky()
        .args([
            "simulate",
            "--data-dir",
            &tmp.path().display().to_string(),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("No survey region"), "{stderr}");
}

#[test]
fn test_simulate_with_missing_maps_fails() {
    let tmp = TempDir::new().unwrap();
    let region = write_region(tmp.path());

    let cmd = varsky()
        .args([
            "simulate",
            "-r",
            &region.display().to_string(),
            "--data-dir",
            &tmp.path().join("nothing_here").display().to_string(),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("--data-dir"), "{stderr}");
}
