// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Monte Carlo simulation of how many scintillating sources a survey sees.
//!
//! Each iteration draws a population within the survey region, derives the
//! scintillation of every source, and counts the sources that vary enough
//! to be noticed. Iterations are independent given their seeds, so they can
//! be run in any order (or in parallel) and then summarised.

mod error;
#[cfg(feature = "plotting")]
pub mod plot;

pub use error::SurveyError;

use std::time::Duration;

use log::{debug, trace};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use crate::{
    constants::{DETECTION_FLUX_DIVISOR, SECONDS_PER_YEAR},
    coord::RADec,
    deadline::Deadline,
    math::{nan_mean_std, Measurement},
    population::{
        FluxDistribution, PopulationError, PopulationGenerator, SamplingLimits, SourceClass,
    },
    region::Region,
    scintillation::ScintillationModel,
};

/// Which sources have their modulation limited by the observation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowRescale {
    /// Every source except the last one in the catalogue. This reproduces
    /// the results of earlier versions of this simulation.
    #[default]
    AllButLast,

    /// Every source.
    All,
}

/// Everything about a survey that doesn't change between iterations.
#[derive(Debug, Clone)]
pub struct SurveyConfiguration {
    /// Observing frequency \[Hz\]
    pub freq: f64,

    /// Sources with a (perturbed) modulation index at least this large are
    /// variable.
    pub mod_cutoff: f64,

    /// The source flux-density distribution, including the survey's flux
    /// limits.
    pub flux_distribution: FluxDistribution,

    /// If given, the flux distribution is calibrated so that the survey
    /// contains this many sources.
    pub target_count: Option<usize>,

    /// The length of the observing campaign \[s\]
    pub obs_time: f64,

    pub num_iterations: usize,

    pub window_rescale: WindowRescale,

    pub limits: SamplingLimits,

    /// The wall-clock budget of each iteration.
    pub iteration_timeout: Option<Duration>,
}

impl SurveyConfiguration {
    pub fn validate(&self) -> Result<(), SurveyError> {
        if !(self.freq.is_finite() && self.freq > 0.0) {
            return Err(SurveyError::InvalidFrequency(self.freq));
        }
        if !(self.obs_time.is_finite() && self.obs_time > 0.0) {
            return Err(SurveyError::InvalidObservationTime(self.obs_time));
        }
        if !self.mod_cutoff.is_finite() {
            return Err(SurveyError::InvalidModulationCutoff(self.mod_cutoff));
        }
        if self.num_iterations == 0 {
            return Err(SurveyError::NoIterations);
        }
        if self.target_count == Some(0) {
            return Err(PopulationError::InvalidTargetCount.into());
        }
        Ok(())
    }

    /// The observation time \[years\].
    pub fn obs_years(&self) -> f64 {
        self.obs_time / SECONDS_PER_YEAR
    }
}

/// One synthetic source and its scintillation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceRecord {
    /// \[degrees\]
    pub ra: f64,

    /// \[degrees\]
    pub dec: f64,

    /// \[Jy\]
    pub flux: f64,

    pub class: SourceClass,

    /// \[degrees\]
    pub size: f64,

    /// \[Rayleigh\]
    pub halpha: Measurement,

    /// The modulation index, after any limiting by the observation window.
    pub modulation: Measurement,

    /// \[years\]
    pub timescale: Measurement,

    /// \[degrees\]
    pub theta: Measurement,

    /// \[s\]
    pub tau: Measurement,
}

/// The outcome of one Monte Carlo iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationResult {
    pub records: Vec<SourceRecord>,

    /// Each source's modulation index, perturbed by its uncertainty. NaN if
    /// the modulation index is undefined.
    pub perturbed_modulation: Vec<f64>,

    /// The number of sources with a perturbed modulation index at or above
    /// the cutoff, per square degree.
    pub areal_density: f64,

    /// The number of sources whose modulated flux density is detectable,
    /// per square degree.
    pub detectable_density: f64,

    /// The source-count normalisation used.
    pub normalisation: f64,

    pub calibration_steps: usize,
}

impl IterationResult {
    pub fn num_sources(&self) -> usize {
        self.records.len()
    }

    pub fn summary(&self) -> IterationSummary {
        let stats = |f: &dyn Fn(&SourceRecord) -> f64| {
            let values: Vec<f64> = self.records.iter().map(f).collect();
            MeanStd::from(nan_mean_std(&values))
        };
        IterationSummary {
            halpha: stats(&|r| r.halpha.value),
            modulation: MeanStd::from(nan_mean_std(&self.perturbed_modulation)),
            timescale: stats(&|r| r.timescale.value),
            theta: stats(&|r| r.theta.value),
            areal_density: self.areal_density,
            detectable_density: self.detectable_density,
            num_sources: self.num_sources(),
            normalisation: self.normalisation,
        }
    }
}

/// A mean and (population) standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanStd {
    pub mean: f64,
    pub std: f64,
}

impl From<(f64, f64)> for MeanStd {
    fn from((mean, std): (f64, f64)) -> Self {
        MeanStd { mean, std }
    }
}

/// Statistics of one iteration. Undefined (NaN) values are excluded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IterationSummary {
    pub halpha: MeanStd,

    /// Of the perturbed modulation indices.
    pub modulation: MeanStd,

    pub timescale: MeanStd,
    pub theta: MeanStd,
    pub areal_density: f64,
    pub detectable_density: f64,
    pub num_sources: usize,
    pub normalisation: f64,
}

/// Statistics over all iterations. Each [`MeanStd`] is of the per-iteration
/// values (for source properties, the per-iteration means).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurveySummary {
    pub num_iterations: usize,
    pub halpha: MeanStd,
    pub modulation: MeanStd,
    pub timescale: MeanStd,
    pub theta: MeanStd,
    pub areal_density: MeanStd,
    pub detectable_density: MeanStd,

    /// The average number of sources per iteration.
    pub avg_num_sources: f64,

    /// The average number of variable sources (modulation above the
    /// cutoff) per iteration.
    pub avg_variables: f64,

    /// The average number of sources with detectable variability per
    /// iteration.
    pub avg_detectable_variables: f64,

    /// The average source-count normalisation.
    pub avg_normalisation: f64,

    /// \[deg²\]
    pub area: f64,
}

impl SurveySummary {
    /// Summarise iterations of a survey covering `area` \[deg²\].
    pub fn new(iterations: &[IterationSummary], area: f64) -> SurveySummary {
        let stats = |f: &dyn Fn(&IterationSummary) -> f64| {
            let values: Vec<f64> = iterations.iter().map(f).collect();
            MeanStd::from(nan_mean_std(&values))
        };
        let areal_density = stats(&|s| s.areal_density);
        let detectable_density = stats(&|s| s.detectable_density);
        SurveySummary {
            num_iterations: iterations.len(),
            halpha: stats(&|s| s.halpha.mean),
            modulation: stats(&|s| s.modulation.mean),
            timescale: stats(&|s| s.timescale.mean),
            theta: stats(&|s| s.theta.mean),
            areal_density,
            detectable_density,
            avg_num_sources: stats(&|s| s.num_sources as f64).mean,
            avg_variables: area * areal_density.mean,
            avg_detectable_variables: area * detectable_density.mean,
            avg_normalisation: stats(&|s| s.normalisation).mean,
            area,
        }
    }
}

/// Limit modulation indices by the observation window: if a source's
/// refractive timescale is at least `obs_years`, its modulation index (and
/// uncertainty) is scaled by `obs_years / t0`.
pub fn apply_observation_window(records: &mut [SourceRecord], obs_years: f64, mode: WindowRescale) {
    let num = match mode {
        WindowRescale::AllButLast => records.len().saturating_sub(1),
        WindowRescale::All => records.len(),
    };
    for r in records.iter_mut().take(num) {
        if obs_years <= r.timescale.value {
            r.modulation = r.modulation.scaled(obs_years / r.timescale.value);
        }
    }
}

/// Draw a value from N(m, σ) for each modulation index. Undefined
/// modulation indices (or uncertainties) give NaN.
fn perturb<R: rand::Rng + ?Sized>(modulation: &[Measurement], rng: &mut R) -> Vec<f64> {
    modulation
        .iter()
        .map(|m| {
            if !m.is_finite() || m.error < 0.0 {
                return f64::NAN;
            }
            Normal::new(m.value, m.error)
                .map(|n| n.sample(rng))
                .unwrap_or(f64::NAN)
        })
        .collect()
}

/// Run one Monte Carlo iteration of a survey. The result depends only on the
/// inputs, including the seed.
pub fn run_iteration(
    config: &SurveyConfiguration,
    model: &ScintillationModel,
    region: &dyn Region,
    seed: u64,
) -> Result<IterationResult, PopulationError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let deadline = Deadline::new(config.iteration_timeout);

    let generator = PopulationGenerator::new(
        config.flux_distribution,
        config.target_count,
        region,
        config.limits,
    );
    let population = generator.generate(&deadline, &mut rng)?;

    let mut records: Vec<SourceRecord> = population
        .sources
        .iter()
        .map(|s| {
            let size = s.angular_size();
            let obs = model.observables(&RADec::from_degrees(s.ra, s.dec), size);
            SourceRecord {
                ra: s.ra,
                dec: s.dec,
                flux: s.flux,
                class: s.class,
                size,
                halpha: obs.halpha,
                modulation: obs.modulation,
                timescale: obs.timescale,
                theta: obs.theta,
                tau: obs.tau,
            }
        })
        .collect();
    apply_observation_window(&mut records, config.obs_years(), config.window_rescale);

    let modulation: Vec<Measurement> = records.iter().map(|r| r.modulation).collect();
    let perturbed_modulation = perturb(&modulation, &mut rng);

    let detection_limit = config.flux_distribution.low / DETECTION_FLUX_DIVISOR;
    let mut num_variable = 0;
    let mut num_detectable = 0;
    for (r, &mp) in records.iter().zip(perturbed_modulation.iter()) {
        if mp * r.flux >= detection_limit {
            num_detectable += 1;
        }
        if mp >= config.mod_cutoff {
            num_variable += 1;
        }
    }
    trace!(
        "seed {seed}: {} sources, {num_variable} variable, {num_detectable} detectably variable",
        records.len()
    );

    let area = region.area(true);
    Ok(IterationResult {
        records,
        perturbed_modulation,
        areal_density: num_variable as f64 / area,
        detectable_density: num_detectable as f64 / area,
        normalisation: population.distribution.a,
        calibration_steps: population.calibration_steps,
    })
}

/// Run iteration `index` of a survey, with the seed `base_seed + index`.
pub fn run_indexed_iteration(
    config: &SurveyConfiguration,
    model: &ScintillationModel,
    region: &dyn Region,
    base_seed: u64,
    index: usize,
) -> Result<IterationResult, SurveyError> {
    let seed = base_seed.wrapping_add(index as u64);
    debug!("Starting iteration {index} (seed {seed})");
    run_iteration(config, model, region, seed).map_err(|err| SurveyError::Iteration {
        iteration: index,
        err,
    })
}
