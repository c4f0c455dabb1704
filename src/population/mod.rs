// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthetic radio-source populations.
//!
//! A population is drawn in three steps: flux densities from power-law
//! source counts (optionally calibrated to a target number of sources),
//! positions uniformly within the survey region, and a class (and hence
//! angular size) for each source.

mod error;
mod flux;
mod position;
mod source;
#[cfg(test)]
mod tests;

pub use error::PopulationError;
pub use flux::{Calibration, FluxDistribution};
pub use position::{sample_in_region, sample_sphere};
pub use source::{SourceClass, SyntheticSource};

use log::debug;
use rand::Rng;

use crate::{
    constants::{DEFAULT_MAX_CALIBRATION_STEPS, DEFAULT_MAX_REGION_ROUNDS},
    deadline::Deadline,
    region::Region,
};

/// Bounds on the otherwise open-ended loops of population generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingLimits {
    /// The maximum number of normalisation adjustments when calibrating to a
    /// target number of sources.
    pub max_calibration_steps: usize,

    /// The maximum number of rounds of region-constrained position sampling.
    pub max_region_rounds: usize,
}

impl Default for SamplingLimits {
    fn default() -> Self {
        SamplingLimits {
            max_calibration_steps: DEFAULT_MAX_CALIBRATION_STEPS,
            max_region_rounds: DEFAULT_MAX_REGION_ROUNDS,
        }
    }
}

/// A generated population.
#[derive(Debug, Clone)]
pub struct Population {
    pub sources: Vec<SyntheticSource>,

    /// The flux distribution the sources were drawn from (after any
    /// calibration).
    pub distribution: FluxDistribution,

    /// The number of calibration steps taken (zero without a target).
    pub calibration_steps: usize,
}

/// Draws populations of sources within a region.
pub struct PopulationGenerator<'a> {
    distribution: FluxDistribution,
    target_count: Option<usize>,
    region: &'a dyn Region,
    limits: SamplingLimits,
}

impl<'a> PopulationGenerator<'a> {
    pub fn new(
        distribution: FluxDistribution,
        target_count: Option<usize>,
        region: &'a dyn Region,
        limits: SamplingLimits,
    ) -> PopulationGenerator<'a> {
        PopulationGenerator {
            distribution,
            target_count,
            region,
            limits,
        }
    }

    /// Work out the flux distribution to draw from, calibrating it to the
    /// target number of sources if there is one.
    pub fn calibrated_distribution(
        &self,
        deadline: &Deadline,
    ) -> Result<Calibration, PopulationError> {
        let area = self.region.area(false);
        if !(area.is_finite() && area > 0.0) {
            return Err(PopulationError::InvalidArea(area));
        }
        match self.target_count {
            Some(target) => self.distribution.calibrate(
                target,
                area,
                self.limits.max_calibration_steps,
                deadline,
            ),
            None => Ok(Calibration {
                distribution: self.distribution,
                count: self.distribution.expected_count(area),
                steps: 0,
            }),
        }
    }

    pub fn generate<R: Rng + ?Sized>(
        &self,
        deadline: &Deadline,
        rng: &mut R,
    ) -> Result<Population, PopulationError> {
        let Calibration {
            distribution,
            steps,
            ..
        } = self.calibrated_distribution(deadline)?;

        let fluxes = distribution.sample_fluxes(self.region.area(false), rng);
        let (ra, dec) = sample_in_region(
            fluxes.len(),
            self.region,
            self.limits.max_region_rounds,
            deadline,
            rng,
        )?;
        let sources: Vec<SyntheticSource> = fluxes
            .into_iter()
            .zip(ra)
            .zip(dec)
            .map(|((flux, ra), dec)| SyntheticSource {
                flux,
                ra,
                dec,
                class: SourceClass::draw(rng),
            })
            .collect();
        debug!("Generated {} sources", sources.len());

        Ok(Population {
            sources,
            distribution,
            calibration_steps: steps,
        })
    }
}
