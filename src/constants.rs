// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Physical constants are SI unless
stated otherwise.
 */

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Speed of light in a vacuum \[m/s\].
pub const VEL_C: f64 = 299_792_458.0;

/// One kiloparsec \[m\].
pub const KPC_M: f64 = 3.085_677_581_491_367e19;

/// Classical electron radius \[m\].
pub const ELECTRON_RADIUS_M: f64 = 2.817e-15;

/// Seconds in a Julian year.
pub const SECONDS_PER_YEAR: f64 = 3600.0 * 24.0 * 365.25;

/// Seconds in a day.
pub const SECONDS_PER_DAY: f64 = 24.0 * 3600.0;

/// One arcsecond \[radians\].
pub const ARCSEC_RAD: f64 = PI / (180.0 * 3600.0);

/// Square degrees on the whole sky.
pub const FULL_SKY_DEG2: f64 = 4.0 * PI * (180.0 / PI) * (180.0 / PI);

// Scattering-screen model constants.

/// Spectral index of the Kolmogorov turbulence spectrum.
pub const BETA: f64 = 11.0 / 3.0;

/// Temperature of the ionised gas in units of 10^4 K.
pub const T4: f64 = 0.8;

/// Ratio of the density fluctuations to the mean density.
pub const EPSILON: f64 = 1.0;

/// Outer scale of the turbulence (10^18 m) expressed in pc.
pub const OUTER_SCALE_PC: f64 = 1e18 / (KPC_M * 1e-3);

/// Frequency scaling index of the scattering delay (tau ∝ ν^-ALPHA).
pub const TAU_FREQ_INDEX: f64 = 4.0;

/// Reference frequency of the scattering-delay raster \[Hz\].
pub const TAU_REF_FREQ_HZ: f64 = 1e9;

/// Fractional uncertainty assigned to every scattering delay.
pub const TAU_FRACTIONAL_ERROR: f64 = 0.1;

/// Default relative velocity between the screen and observer \[m/s\].
pub const DEFAULT_SCREEN_VELOCITY: f64 = 10e3;

// Population constants.

/// Power-law index of the differential source counts.
pub const DEFAULT_COUNTS_INDEX: f64 = 1.6;

/// Number of logarithmically-spaced flux-density bin edges.
pub const NUM_FLUX_BIN_EDGES: usize = 100;

/// Fractional tolerance on the calibrated source count, and the fractional
/// step applied to the normalisation each calibration step.
pub const CALIBRATION_TOLERANCE: f64 = 0.01;

/// Probability that a source is an extended star-forming galaxy. All other
/// sources are compact AGN.
pub const SFG_PROBABILITY: f64 = 1.0 - 0.84839;

/// Angular size of a compact AGN \[degrees\] (0.5 milliarcseconds).
pub const AGN_SIZE_DEG: f64 = 0.5e-3 / 3600.0;

/// Angular size of an extended star-forming galaxy \[degrees\] (10
/// milliarcseconds).
pub const SFG_SIZE_DEG: f64 = 10e-3 / 3600.0;

/// The number of positions drawn on the sphere per requested source each
/// round of region-constrained sampling.
pub const POSITION_OVERSAMPLING: usize = 40;

/// Extra cube draws per sphere position, covering the points rejected for
/// lying outside the unit ball.
pub const CUBE_SAFETY_FACTOR: f64 = 2.5;

/// A source varies detectably if its modulated flux density is at least
/// the lower flux limit divided by this.
pub const DETECTION_FLUX_DIVISOR: f64 = 5.0;

// Run defaults.

/// Default upper flux-density limit \[Jy\].
pub const DEFAULT_UPPER_FLUX_LIMIT: f64 = 1.0;

/// Default lower flux-density limit \[Jy\].
pub const DEFAULT_LOWER_FLUX_LIMIT: f64 = 0.01;

/// Default modulation-index cutoff.
pub const DEFAULT_MOD_CUTOFF: f64 = 0.05;

/// Default observation duration \[days\].
pub const DEFAULT_OBS_TIME_DAYS: f64 = 365.0;

/// Default source-count normalisation.
pub const DEFAULT_COUNTS_NORMALISATION: f64 = 3300.0;

/// Default observing frequency \[MHz\].
pub const DEFAULT_FREQ_MHZ: f64 = 185.0;

/// Default number of Monte Carlo iterations.
pub const DEFAULT_NUM_ITERATIONS: usize = 20;

/// Default maximum number of normalisation calibration steps.
pub const DEFAULT_MAX_CALIBRATION_STEPS: usize = 1000;

/// Default maximum number of region-constrained sampling rounds.
pub const DEFAULT_MAX_REGION_ROUNDS: usize = 100_000;
