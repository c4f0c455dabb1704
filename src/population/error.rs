// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with generating synthetic source populations.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PopulationError {
    #[error("Invalid flux-density limits: the lower limit ({low} Jy) must be positive and less than the upper limit ({upp} Jy)")]
    InvalidFluxBounds { low: f64, upp: f64 },

    #[error("The source-count normalisation must be positive and finite; got {0}")]
    InvalidNormalisation(f64),

    #[error("The source-count power-law index must be finite and not 1; got {0}")]
    InvalidIndex(f64),

    #[error("The target number of sources must be positive")]
    InvalidTargetCount,

    #[error("The survey area must be positive and finite; got {0} sr")]
    InvalidArea(f64),

    #[error("Couldn't calibrate the source counts to {target} sources after {steps} steps (last count: {last_count}, normalisation: {normalisation})")]
    CalibrationDivergence {
        target: usize,
        steps: usize,
        last_count: usize,
        normalisation: f64,
    },

    #[error("Only {accepted} of {requested} positions landed in the survey region after {rounds} rounds of sampling")]
    RegionUnsatisfiable {
        requested: usize,
        accepted: usize,
        rounds: usize,
    },

    #[error("Population generation exceeded its time budget of {0:?}")]
    Cancelled(Duration),
}
