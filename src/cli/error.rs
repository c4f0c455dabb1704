// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all varsky-related errors. This should be the *only* error
//! enum that is publicly visible.

use thiserror::Error;

use super::{scintillate::ScintillateArgsError, simulate::SimulateArgsError};
use crate::{
    io::{read::fits::FitsError, write::WriteError},
    params::SimulateError,
    population::PopulationError,
    raster::RasterError,
    region::RegionError,
    survey::SurveyError,
};

/// The *only* publicly visible error from varsky. The variants are the kinds
/// of errors a user can act on.
#[derive(Error, Debug)]
pub enum VarskyError {
    /// The user asked for something that doesn't make sense.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A sky raster or region file is absent or can't be read.
    #[error("{0}\n\nCheck the data directory (--data-dir) and the raster and region paths.")]
    MissingAsset(String),

    /// Not enough sources could be placed in the survey region.
    #[error("{0}\n\nTry a larger --max-region-rounds, a smaller target number of sources, or a larger region.")]
    RegionUnsatisfiable(String),

    /// The source counts couldn't be calibrated to the target number of
    /// sources.
    #[error("{0}\n\nTry a larger --max-calibration-steps, or a target number of sources that suits the flux limits and region.")]
    CalibrationDivergence(String),

    /// An iteration ran out of time.
    #[error("{0}\n\nTry a larger --iteration-timeout.")]
    Cancelled(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A cfitsio error. Because these are usually quite spartan, some
    /// suggestions are provided here.
    #[error("cfitsio error: {0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv) and maybe disabling progress bars.")]
    Cfitsio(String),

    /// An error when writing output files.
    #[error("{0}")]
    Write(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<SimulateArgsError> for VarskyError {
    fn from(e: SimulateArgsError) -> Self {
        match e {
            SimulateArgsError::NoRegion => Self::MissingAsset(e.to_string()),
            SimulateArgsError::NoPlottingFeature => Self::Generic(e.to_string()),
            SimulateArgsError::NonPositive { .. }
            | SimulateArgsError::TimeoutTooLarge(_)
            | SimulateArgsError::ZeroThreads => Self::InvalidConfiguration(e.to_string()),
        }
    }
}

impl From<ScintillateArgsError> for VarskyError {
    fn from(e: ScintillateArgsError) -> Self {
        Self::InvalidConfiguration(e.to_string())
    }
}

impl From<SimulateError> for VarskyError {
    fn from(e: SimulateError) -> Self {
        match e {
            SimulateError::Survey(e) => Self::from(e),
            SimulateError::Write(e) => Self::from(e),
            #[cfg(feature = "plotting")]
            SimulateError::Draw(e) => Self::Write(e.to_string()),
            SimulateError::ThreadPool(_) => Self::Generic(e.to_string()),
        }
    }
}

impl From<RasterError> for VarskyError {
    fn from(e: RasterError) -> Self {
        match e {
            RasterError::InvalidMapVersion(_) => Self::InvalidConfiguration(e.to_string()),
            RasterError::Fits(e) => Self::from(e),
            RasterError::DoesntExist(_)
            | RasterError::NotTwoDimensional { .. }
            | RasterError::UnsupportedProjection { .. }
            | RasterError::UnknownFrame { .. }
            | RasterError::BadPixelScale { .. }
            | RasterError::BadDataLength { .. } => Self::MissingAsset(e.to_string()),
        }
    }
}

impl From<RegionError> for VarskyError {
    fn from(e: RegionError) -> Self {
        match e {
            RegionError::DoesntExist(_)
            | RegionError::UnknownFileType(_)
            | RegionError::Parse { .. }
            | RegionError::IO(_) => Self::MissingAsset(e.to_string()),
            RegionError::NoShapes
            | RegionError::InvalidShape { .. }
            | RegionError::NonPositiveArea(_) => Self::InvalidConfiguration(e.to_string()),
        }
    }
}

impl From<PopulationError> for VarskyError {
    fn from(e: PopulationError) -> Self {
        match e {
            PopulationError::InvalidFluxBounds { .. }
            | PopulationError::InvalidNormalisation(_)
            | PopulationError::InvalidIndex(_)
            | PopulationError::InvalidTargetCount
            | PopulationError::InvalidArea(_) => Self::InvalidConfiguration(e.to_string()),
            PopulationError::CalibrationDivergence { .. } => {
                Self::CalibrationDivergence(e.to_string())
            }
            PopulationError::RegionUnsatisfiable { .. } => Self::RegionUnsatisfiable(e.to_string()),
            PopulationError::Cancelled(_) => Self::Cancelled(e.to_string()),
        }
    }
}

impl From<SurveyError> for VarskyError {
    fn from(e: SurveyError) -> Self {
        match e {
            SurveyError::InvalidFrequency(_)
            | SurveyError::InvalidObservationTime(_)
            | SurveyError::InvalidVelocity(_)
            | SurveyError::InvalidModulationCutoff(_)
            | SurveyError::NoIterations => Self::InvalidConfiguration(e.to_string()),
            SurveyError::Population(e) => Self::from(e),
            // Keep the iteration number in the message, but classify by the
            // underlying error.
            SurveyError::Iteration { iteration, ref err } => {
                let msg = format!("Iteration {iteration}: {err}");
                match Self::from(err.clone()) {
                    Self::InvalidConfiguration(_) => Self::InvalidConfiguration(msg),
                    Self::CalibrationDivergence(_) => Self::CalibrationDivergence(msg),
                    Self::RegionUnsatisfiable(_) => Self::RegionUnsatisfiable(msg),
                    Self::Cancelled(_) => Self::Cancelled(msg),
                    _ => Self::Generic(msg),
                }
            }
        }
    }
}

impl From<FitsError> for VarskyError {
    fn from(e: FitsError) -> Self {
        match e {
            FitsError::Open { .. }
            | FitsError::MissingKey { .. }
            | FitsError::NotImage { .. }
            | FitsError::Parse { .. } => Self::MissingAsset(e.to_string()),
            FitsError::Fitsio { .. } => Self::Cfitsio(e.to_string()),
        }
    }
}

impl From<WriteError> for VarskyError {
    fn from(e: WriteError) -> Self {
        Self::Write(e.to_string())
    }
}

impl From<std::io::Error> for VarskyError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
