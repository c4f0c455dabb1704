// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters for evaluating the scintillation model at positions.

use std::path::PathBuf;

use log::info;
use rayon::prelude::*;

use crate::{
    coord::RADec,
    io::write::{write_lines_of_sight, WriteError},
    raster::SkyMaps,
    scintillation::{LineOfSight, ScintillationModel},
};

pub(crate) struct ScintillateParams {
    pub(crate) maps: SkyMaps,
    pub(crate) positions: Vec<RADec>,

    /// \[Hz\]
    pub(crate) freq: f64,

    /// The source's angular size \[degrees\]
    pub(crate) size: f64,

    /// \[m/s\]
    pub(crate) velocity: f64,

    /// The RMS variability is over this many years.
    pub(crate) num_years: f64,

    pub(crate) out: Option<PathBuf>,
}

impl ScintillateParams {
    pub(crate) fn run(&self) -> Result<Vec<LineOfSight>, WriteError> {
        let model = ScintillationModel::new(&self.maps, self.freq, self.velocity);
        let lines: Vec<LineOfSight> = self
            .positions
            .par_iter()
            .map(|pos| model.line_of_sight(pos, self.size, self.num_years))
            .collect();

        match &self.out {
            Some(out) => {
                write_lines_of_sight(out, &lines)?;
                info!("Wrote {} lines of sight to {}", lines.len(), out.display());
            }
            None => {
                for l in &lines {
                    info!(
                        "RA {:>8.3}° Dec {:>8.3}°: Hα {}, m {}, t0 {} yr, θ {}°, τ {} s, rms {}, ν0 {:.3} GHz",
                        l.ra,
                        l.dec,
                        l.halpha,
                        l.modulation,
                        l.timescale,
                        l.theta,
                        l.tau,
                        l.rms,
                        l.nu0
                    );
                }
            }
        }

        Ok(lines)
    }
}
