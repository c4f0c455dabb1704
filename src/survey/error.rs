// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with simulating surveys.

use thiserror::Error;

use crate::population::PopulationError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SurveyError {
    #[error("The observing frequency must be positive; got {0} Hz")]
    InvalidFrequency(f64),

    #[error("The observation time must be positive; got {0} s")]
    InvalidObservationTime(f64),

    #[error("The screen velocity must be positive; got {0} m/s")]
    InvalidVelocity(f64),

    #[error("The modulation cutoff must be finite; got {0}")]
    InvalidModulationCutoff(f64),

    #[error("The number of iterations must be positive")]
    NoIterations,

    #[error("Iteration {iteration}: {err}")]
    Iteration {
        iteration: usize,
        err: PopulationError,
    },

    #[error(transparent)]
    Population(#[from] PopulationError),
}
