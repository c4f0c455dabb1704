// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Power-law source counts, and drawing flux densities from them.

use log::{debug, trace};
use rand::prelude::*;

use super::PopulationError;
use crate::{
    constants::{CALIBRATION_TOLERANCE, DEFAULT_COUNTS_INDEX, NUM_FLUX_BIN_EDGES},
    deadline::Deadline,
    math::logspace,
};

/// Euclidean-like differential source counts, integrated into
/// logarithmically-spaced flux-density bins. The cumulative count at flux
/// density S is `a S^(1-b) / (1-b)` per steradian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluxDistribution {
    /// Normalisation
    pub a: f64,

    /// Power-law index
    pub b: f64,

    /// Lower flux-density limit \[Jy\]
    pub low: f64,

    /// Upper flux-density limit \[Jy\]
    pub upp: f64,
}

/// The result of calibrating a [`FluxDistribution`] to a target number of
/// sources.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub distribution: FluxDistribution,

    /// The number of sources the calibrated distribution yields.
    pub count: usize,

    /// How many times the normalisation was adjusted.
    pub steps: usize,
}

impl FluxDistribution {
    /// A distribution with the default power-law index.
    pub fn new(a: f64, low: f64, upp: f64) -> Result<FluxDistribution, PopulationError> {
        Self::with_index(a, DEFAULT_COUNTS_INDEX, low, upp)
    }

    pub fn with_index(
        a: f64,
        b: f64,
        low: f64,
        upp: f64,
    ) -> Result<FluxDistribution, PopulationError> {
        if !(low.is_finite() && upp.is_finite() && low > 0.0 && upp > low) {
            return Err(PopulationError::InvalidFluxBounds { low, upp });
        }
        if !(a.is_finite() && a > 0.0) {
            return Err(PopulationError::InvalidNormalisation(a));
        }
        if !b.is_finite() || b == 1.0 {
            return Err(PopulationError::InvalidIndex(b));
        }
        Ok(FluxDistribution { a, b, low, upp })
    }

    /// The same distribution with a different normalisation.
    fn renormalised(&self, a: f64) -> FluxDistribution {
        FluxDistribution { a, ..*self }
    }

    fn cumulative(&self, s: f64) -> f64 {
        self.a * s.powf(1.0 - self.b) / (1.0 - self.b)
    }

    /// The flux-density bin edges \[Jy\]. There is one fewer bin than edges.
    pub fn bin_edges(&self) -> Vec<f64> {
        logspace(self.low, self.upp, NUM_FLUX_BIN_EDGES)
    }

    /// The number of sources per steradian in each flux-density bin.
    pub fn differential_counts(&self) -> Vec<f64> {
        self.bin_edges()
            .windows(2)
            .map(|w| self.cumulative(w[1]) - self.cumulative(w[0]))
            .collect()
    }

    /// The (truncated) number of sources in each bin for a survey of the
    /// given area \[sr\].
    pub fn bin_counts(&self, area: f64) -> Vec<usize> {
        self.differential_counts()
            .into_iter()
            .map(|n| (n * area).max(0.0) as usize)
            .collect()
    }

    /// The total number of sources in a survey of the given area \[sr\].
    pub fn expected_count(&self, area: f64) -> usize {
        self.bin_counts(area).into_iter().sum()
    }

    /// Adjust the normalisation until the number of sources in a survey of
    /// the given area \[sr\] is within 1% of `target`. Each step changes the
    /// normalisation by 1%. If this takes more than `max_steps` steps, or the
    /// deadline expires, an error is returned.
    pub fn calibrate(
        &self,
        target: usize,
        area: f64,
        max_steps: usize,
        deadline: &Deadline,
    ) -> Result<Calibration, PopulationError> {
        if target == 0 {
            return Err(PopulationError::InvalidTargetCount);
        }
        if !(area.is_finite() && area > 0.0) {
            return Err(PopulationError::InvalidArea(area));
        }

        let upper = target as f64 * (1.0 + CALIBRATION_TOLERANCE);
        let lower = target as f64 * (1.0 - CALIBRATION_TOLERANCE);
        let mut a = self.a;
        let mut count = self.expected_count(area);
        let mut steps = 0;
        // The band is exclusive at both ends.
        while count as f64 >= upper || count as f64 <= lower {
            if steps == max_steps {
                return Err(PopulationError::CalibrationDivergence {
                    target,
                    steps,
                    last_count: count,
                    normalisation: a,
                });
            }
            if deadline.expired() {
                // The budget is always set if the deadline has expired.
                return Err(PopulationError::Cancelled(
                    deadline.budget().unwrap_or_default(),
                ));
            }

            if count as f64 >= upper {
                a -= CALIBRATION_TOLERANCE * a;
            } else {
                a += CALIBRATION_TOLERANCE * a;
            }
            count = self.renormalised(a).expected_count(area);
            steps += 1;
            trace!("Calibration step {steps}: a = {a}, count = {count}");
        }
        debug!("Calibrated to {count} sources (target {target}) with a = {a} after {steps} steps");

        Ok(Calibration {
            distribution: self.renormalised(a),
            count,
            steps,
        })
    }

    /// Draw flux densities \[Jy\] for a survey of the given area \[sr\]. Each
    /// bin receives its (truncated) expected number of sources, drawn
    /// uniformly in log flux density within the bin. The result is shuffled.
    pub fn sample_fluxes<R: Rng + ?Sized>(&self, area: f64, rng: &mut R) -> Vec<f64> {
        let edges = self.bin_edges();
        let counts = self.bin_counts(area);
        let mut fluxes = Vec::with_capacity(counts.iter().sum());
        for (w, &n) in edges.windows(2).zip(counts.iter()) {
            let (lo, hi) = (w[0], w[1]);
            let (log_lo, log_hi) = (lo.log10(), hi.log10());
            for _ in 0..n {
                let s = 10_f64.powf(rng.gen_range(log_lo..=log_hi));
                fluxes.push(s.clamp(lo, hi));
            }
        }
        fluxes.shuffle(rng);
        fluxes
    }
}
