// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Simulations of how many interstellar-scintillating radio sources a survey can
expect to see.

A synthetic population of radio sources is drawn from a flux-density power
law within a survey region. The scintillation of each source is derived from
Hα and scattering-delay sky rasters, and sources that vary enough are
counted to give an areal sky density. Many Monte Carlo iterations are run and
averaged.
 */

mod cli;
mod deadline;
mod io;
mod params;

pub mod constants;
pub mod coord;
pub mod math;
pub mod population;
pub mod raster;
pub mod region;
pub mod scintillation;
pub mod survey;

// Re-exports.
pub use cli::{Varsky, VarskyError};
pub use coord::{Frame, RADec};
pub use deadline::Deadline;
pub use math::Measurement;
pub use population::{FluxDistribution, PopulationGenerator, SourceClass, SyntheticSource};
pub use raster::{MapVersion, RasterField, SkyMapPaths, SkyMaps};
pub use region::{Region, RegionShape, SkyRegion};
pub use scintillation::{LineOfSight, ScintillationModel, ScreenProperties};
pub use survey::{run_iteration, IterationResult, SurveyConfiguration, SurveySummary};

use crossbeam_utils::atomic::AtomicCell;

/// Should progress bars be drawn?
pub(crate) static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
