// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod scintillate;
mod simulate;

use std::path::Path;
use std::process::Output;
use std::str::from_utf8;

use assert_cmd::{output::OutputError, Command};
use fitsio::{
    images::{ImageDescription, ImageType},
    FitsFile,
};

fn varsky() -> Command {
    Command::cargo_bin("varsky").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// Write a coarse all-sky plate-carrée raster with a single value.
fn write_uniform_raster(file: &Path, value: f32, ctypes: [&str; 2]) {
    let (ny, nx) = (18, 36);
    let description = ImageDescription {
        data_type: ImageType::Float,
        dimensions: &[ny, nx],
    };
    let mut fptr = FitsFile::create(file)
        .with_custom_primary(&description)
        .open()
        .unwrap();
    let hdu = fptr.primary_hdu().unwrap();
    for (i, axis) in ["1", "2"].into_iter().enumerate() {
        hdu.write_key(&mut fptr, &format!("CTYPE{axis}"), ctypes[i])
            .unwrap();
        hdu.write_key(&mut fptr, &format!("CRPIX{axis}"), [18.5, 9.5][i])
            .unwrap();
        hdu.write_key(&mut fptr, &format!("CRVAL{axis}"), 0.0)
            .unwrap();
        hdu.write_key(&mut fptr, &format!("CDELT{axis}"), [-10.0, 10.0][i])
            .unwrap();
    }
    hdu.write_image(&mut fptr, &vec![value; ny * nx]).unwrap();
}

/// Populate a data directory with the rasters of both map versions.
fn make_data_dir(dir: &Path) {
    for name in ["Halpha_map.fits", "Ha_map_new.fits"] {
        write_uniform_raster(&dir.join(name), 1.0, ["RA---CAR", "DEC--CAR"]);
    }
    for name in ["Halpha_error.fits", "Ha_err_new.fits"] {
        write_uniform_raster(&dir.join(name), 0.1, ["RA---CAR", "DEC--CAR"]);
    }
    write_uniform_raster(&dir.join("tau_map.fits"), 1e-5, ["GLON-CAR", "GLAT-CAR"]);
}
