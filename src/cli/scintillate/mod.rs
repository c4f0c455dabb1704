// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Evaluate the scintillation model along particular lines of sight.

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use thiserror::Error;

use super::common::{display_warnings, InfoPrinter, SkyMapArgs, FREQ_HELP, VELOCITY_HELP};
use crate::{
    constants::{AGN_SIZE_DEG, DEFAULT_FREQ_MHZ, DEFAULT_SCREEN_VELOCITY},
    coord::RADec,
    io::write::can_write_to_file,
    params::ScintillateParams,
    VarskyError,
};

/// \[milliarcseconds\]
const DEFAULT_SIZE_MAS: f64 = AGN_SIZE_DEG * 3600.0 * 1e3;
const DEFAULT_NUM_YEARS: f64 = 1.0;

lazy_static::lazy_static! {
    static ref SIZE_HELP: String =
        format!("The angular size of the source [milliarcseconds]. Default: {DEFAULT_SIZE_MAS} (a compact AGN)");

    static ref YEARS_HELP: String =
        format!("The time over which the RMS variability is reported [years]. Default: {DEFAULT_NUM_YEARS}");
}

#[derive(Parser, Debug, Clone, Default)]
pub(super) struct ScintillateArgs {
    /// Right ascensions of the lines of sight [degrees]. Must be paired with
    /// --dec.
    #[clap(
        long,
        multiple_values(true),
        allow_hyphen_values = true,
        help_heading = "POSITIONS"
    )]
    pub(super) ra: Option<Vec<f64>>,

    /// Declinations of the lines of sight [degrees].
    #[clap(
        long,
        multiple_values(true),
        allow_hyphen_values = true,
        help_heading = "POSITIONS"
    )]
    pub(super) dec: Option<Vec<f64>>,

    /// Rather than particular positions, use a regular grid over the whole
    /// sky with this spacing in RA and Dec [degrees].
    #[clap(long, conflicts_with_all = &["ra", "dec"], help_heading = "POSITIONS")]
    pub(super) grid_step: Option<f64>,

    #[clap(short = 'f', long, help = FREQ_HELP.as_str(), help_heading = "SCINTILLATION")]
    pub(super) freq: Option<f64>,

    #[clap(short, long, help = SIZE_HELP.as_str(), help_heading = "SCINTILLATION")]
    pub(super) size: Option<f64>,

    #[clap(long, help = VELOCITY_HELP.as_str(), help_heading = "SCINTILLATION")]
    pub(super) velocity: Option<f64>,

    #[clap(long, help = YEARS_HELP.as_str(), help_heading = "SCINTILLATION")]
    pub(super) years: Option<f64>,

    /// Write the results to this CSV (or TSV) file. If not given, the
    /// results are logged.
    #[clap(short = 'o', long, help_heading = "OUTPUT FILES")]
    pub(super) out: Option<PathBuf>,

    #[clap(flatten)]
    pub(super) map_args: SkyMapArgs,
}

impl ScintillateArgs {
    fn parse(self) -> Result<ScintillateParams, VarskyError> {
        debug!("{:#?}", self);

        let ScintillateArgs {
            ra,
            dec,
            grid_step,
            freq,
            size,
            velocity,
            years,
            out,
            map_args,
        } = self;

        let positions = match (ra, dec, grid_step) {
            (Some(ra), Some(dec), None) => {
                if ra.len() != dec.len() {
                    return Err(ScintillateArgsError::MismatchedPositions {
                        num_ra: ra.len(),
                        num_dec: dec.len(),
                    }
                    .into());
                }
                ra.into_iter()
                    .zip(dec)
                    .map(|(ra, dec)| {
                        if !(-90.0..=90.0).contains(&dec) {
                            return Err(ScintillateArgsError::DecInvalid(dec));
                        }
                        Ok(RADec::from_degrees(ra.rem_euclid(360.0), dec))
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
            (None, None, Some(step)) => sky_grid(step)?,
            (None, None, None) => return Err(ScintillateArgsError::NoPositions.into()),
            _ => return Err(ScintillateArgsError::OnlyOneRAOrDec.into()),
        };

        let freq_mhz = freq.unwrap_or(DEFAULT_FREQ_MHZ);
        let size_mas = size.unwrap_or(DEFAULT_SIZE_MAS);
        let velocity = velocity.map(|v| v * 1e3).unwrap_or(DEFAULT_SCREEN_VELOCITY);
        let num_years = years.unwrap_or(DEFAULT_NUM_YEARS);
        for (arg, value) in [
            ("--freq", freq_mhz),
            ("--size", size_mas),
            ("--velocity", velocity),
            ("--years", num_years),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ScintillateArgsError::NonPositive { arg, value }.into());
            }
        }

        let mut printer = InfoPrinter::new("Lines of sight".into());
        printer.push_line(format!("{} positions", positions.len()).into());
        printer.push_block(vec![
            format!("Frequency:       {freq_mhz} MHz").into(),
            format!("Source size:     {size_mas} mas").into(),
            format!("Screen velocity: {} km/s", velocity / 1e3).into(),
            format!("RMS over:        {num_years} years").into(),
        ]);
        if let Some(out) = out.as_ref() {
            can_write_to_file(out)?;
            printer.push_line(format!("Writing to {}", out.display()).into());
        }
        printer.display();

        let (_, maps) = map_args.parse()?;

        display_warnings();

        Ok(ScintillateParams {
            maps,
            positions,
            freq: freq_mhz * 1e6,
            size: size_mas / 3600.0 / 1e3,
            velocity,
            num_years,
            out,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), VarskyError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

/// A regular grid of positions over the whole sky, from RA 0° and Dec -90°.
fn sky_grid(step: f64) -> Result<Vec<RADec>, ScintillateArgsError> {
    if !(step.is_finite() && step > 0.0 && step <= 180.0) {
        return Err(ScintillateArgsError::BadGridStep(step));
    }
    let num_ra = (360.0 / step).ceil() as usize;
    let num_dec = (180.0 / step).floor() as usize + 1;
    let mut positions = Vec::with_capacity(num_ra * num_dec);
    for i_dec in 0..num_dec {
        let dec = -90.0 + i_dec as f64 * step;
        for i_ra in 0..num_ra {
            positions.push(RADec::from_degrees(i_ra as f64 * step, dec));
        }
    }
    Ok(positions)
}

#[derive(Error, Debug)]
pub(super) enum ScintillateArgsError {
    #[error("No positions were given; use --ra and --dec, or --grid-step")]
    NoPositions,

    #[error("One of RA and Dec was specified, but none or both are required!")]
    OnlyOneRAOrDec,

    #[error("{num_ra} RAs were given, but {num_dec} Decs")]
    MismatchedPositions { num_ra: usize, num_dec: usize },

    #[error("Declination {0} was not within -90 to 90!")]
    DecInvalid(f64),

    #[error("The grid step must be positive and no more than 180 degrees; got {0}")]
    BadGridStep(f64),

    #[error("{arg} must be positive; got {value}")]
    NonPositive { arg: &'static str, value: f64 },
}
