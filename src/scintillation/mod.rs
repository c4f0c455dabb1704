// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Interstellar scintillation of compact extragalactic radio sources.
//!
//! The scattering screen along a line of sight is characterised by its
//! scattering measure, which is derived from the Hα intensity (Cordes 2002),
//! and by its scattering delay, which is read from a raster made at 1 GHz.
//! From these, the diffractive scale (Macquart & Koay 2013, eq. 7a), the
//! Fresnel scale and the scattering strength ξ = r_F / r_diff follow, and
//! with them the refractive modulation index, timescale and angular size of
//! the scattering disk (Narayan 1992; Walker 1998). Every quantity carries a
//! propagated 1σ uncertainty.
//!
//! Degenerate lines of sight (e.g. zero Hα) produce NaN or infinite values;
//! these are not errors.

#[cfg(test)]
mod tests;

use libm::tgamma;
use serde::Serialize;

use crate::{
    constants::*,
    coord::RADec,
    math::{power_law_error, quadrature, Measurement},
    raster::SkyMaps,
};

/// The part of the diffractive-scale expression that doesn't depend on the
/// scattering measure or wavelength:
/// 2^(2-β) π rₑ² β kpc Γ(-β/2) / Γ(β/2).
fn rdiff_coefficient() -> f64 {
    2.0_f64.powf(2.0 - BETA)
        * PI
        * ELECTRON_RADIUS_M
        * ELECTRON_RADIUS_M
        * BETA
        * KPC_M
        * tgamma(-BETA / 2.0)
        / tgamma(BETA / 2.0)
}

/// The scattering measure \[kpc m^-20/3\] implied by an Hα intensity
/// \[Rayleigh\].
pub fn scattering_measure(halpha: Measurement) -> Measurement {
    let sm = halpha.value / 198.0
        * T4.powf(0.9)
        * EPSILON.powi(2)
        / (1.0 + EPSILON.powi(2))
        * OUTER_SCALE_PC.powf(-2.0 / 3.0);
    Measurement::new(sm, halpha.relative_error() * sm)
}

/// The properties of the scattering screen along one line of sight, at one
/// observing frequency. These do not depend on the source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScreenProperties {
    /// Observing frequency \[Hz\]
    pub freq: f64,

    /// Hα intensity \[Rayleigh\]
    pub halpha: Measurement,

    /// Scattering measure \[kpc m^-20/3\]
    pub sm: Measurement,

    /// Diffractive scale \[m\]
    pub rdiff: Measurement,

    /// Scattering delay at the observing frequency \[s\]
    pub tau: Measurement,

    /// Fresnel scale \[m\]
    pub rf: Measurement,

    /// Scattering strength (dimensionless)
    pub xi: Measurement,

    /// Angular size of the scattering disk \[degrees\]
    pub theta: Measurement,
}

impl ScreenProperties {
    /// Derive the screen properties from an Hα intensity and the scattering
    /// delay at 1 GHz \[s\].
    pub fn new(halpha: Measurement, tau_ref: f64, freq: f64) -> ScreenProperties {
        let sm = scattering_measure(halpha);

        let wavelength = VEL_C / freq;
        let exponent = 1.0 / (2.0 - BETA);
        let rdiff = (rdiff_coefficient() * wavelength * wavelength * sm.value).powf(exponent);
        let rdiff = Measurement::new(rdiff, power_law_error(exponent, sm.relative_error(), rdiff));

        let tau = tau_ref * (freq / TAU_REF_FREQ_HZ).powf(-TAU_FREQ_INDEX);
        let tau = Measurement::new(tau, TAU_FRACTIONAL_ERROR * tau);

        // The relative errors are combined without a square root.
        let rf = rdiff.value * (4.0 * PI * freq * tau.value).sqrt();
        let rf = Measurement::new(
            rf,
            (rdiff.relative_error().powi(2) + (0.5 * tau.relative_error()).powi(2)) * rf,
        );

        let xi = rf.value / rdiff.value;
        let xi = Measurement::new(
            xi,
            quadrature(&[rdiff.relative_error(), rf.relative_error()]) * xi,
        );

        let theta = (wavelength / (TAU * rdiff.value)).to_degrees();
        let theta = Measurement::new(theta, theta * rdiff.relative_error());

        ScreenProperties {
            freq,
            halpha,
            sm,
            rdiff,
            tau,
            rf,
            xi,
            theta,
        }
    }

    /// Is a source of this angular size \[degrees\] larger than the
    /// scattering disk?
    pub fn resolves(&self, size: f64) -> bool {
        size > self.theta.value
    }

    /// The modulation index of a source with the given angular size
    /// \[degrees\]. Sources larger than the scattering disk have their
    /// modulation suppressed by (θ/size)^(7/6).
    pub fn modulation(&self, size: f64) -> Measurement {
        let m = self.xi.value.powf(-1.0 / 3.0);
        let m = Measurement::new(m, (1.0 / 3.0) * self.xi.relative_error() * m);
        if !self.resolves(size) {
            return m;
        }

        let m = m.scaled((self.theta.value / size).powf(7.0 / 6.0));
        let error = quadrature(&[
            m.relative_error(),
            (7.0 / 6.0) * self.theta.relative_error(),
        ]) * m.value;
        Measurement::new(m.value, error)
    }

    /// The refractive timescale \[years\] of a source with the given angular
    /// size \[degrees\], for a screen moving at `velocity` \[m/s\]. Sources
    /// larger than the scattering disk vary more slowly, by a factor
    /// size/θ.
    pub fn timescale(&self, size: f64, velocity: f64) -> Measurement {
        let t0 = self.rf.value * self.xi.value / velocity / SECONDS_PER_YEAR;
        let t0 = Measurement::new(
            t0,
            quadrature(&[self.xi.relative_error(), self.rf.relative_error()]) * t0,
        );
        if !self.resolves(size) {
            return t0;
        }

        let t0 = t0.scaled(size / self.theta.value);
        let error = quadrature(&[t0.relative_error(), self.theta.relative_error()]) * t0.value;
        Measurement::new(t0.value, error)
    }

    /// The modulation index expected when a source is only monitored for
    /// `num_years`. If this is shorter than the refractive timescale, the
    /// modulation is reduced by `num_years / t0`.
    pub fn rms_variability(&self, size: f64, velocity: f64, num_years: f64) -> Measurement {
        let m = self.modulation(size);
        let t0 = self.timescale(size, velocity);
        if num_years >= t0.value {
            return m;
        }

        let m = m.scaled(num_years / t0.value);
        let error = quadrature(&[m.relative_error(), t0.relative_error()]) * m.value;
        Measurement::new(m.value, error)
    }

    /// The frequency \[GHz\] of the transition between strong and weak
    /// scattering.
    pub fn transition_frequency(&self) -> f64 {
        let exponent = 1.0 / (2.0 - BETA);
        let a = (rdiff_coefficient() * self.sm.value).powf(exponent);
        let ratio = self.rf.value * (VEL_C / self.freq).sqrt() / a;
        VEL_C * ratio.powf(1.0 / (0.5 - 2.0 * exponent)) / 1e9
    }
}

/// The quantities reported for each simulated source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observables {
    pub halpha: Measurement,
    pub modulation: Measurement,
    pub timescale: Measurement,
    pub theta: Measurement,
    pub tau: Measurement,
}

/// Everything known about the line of sight towards a position, for a source
/// of a particular angular size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineOfSight {
    /// \[degrees\]
    pub ra: f64,

    /// \[degrees\]
    pub dec: f64,

    pub halpha: Measurement,
    pub modulation: Measurement,
    pub timescale: Measurement,
    pub theta: Measurement,
    pub tau: Measurement,

    /// The RMS variability over the requested number of years.
    pub rms: Measurement,

    /// The transition frequency \[GHz\]
    pub nu0: f64,
}

/// Scintillation at a single observing frequency, using Hα and scattering
/// delay rasters.
#[derive(Debug, Clone, Copy)]
pub struct ScintillationModel<'a> {
    maps: &'a SkyMaps,

    /// \[Hz\]
    freq: f64,

    /// The relative velocity of the screen and the observer \[m/s\].
    velocity: f64,
}

impl<'a> ScintillationModel<'a> {
    pub fn new(maps: &'a SkyMaps, freq: f64, velocity: f64) -> ScintillationModel<'a> {
        ScintillationModel {
            maps,
            freq,
            velocity,
        }
    }

    /// A model with the default screen velocity.
    pub fn at_freq(maps: &'a SkyMaps, freq: f64) -> ScintillationModel<'a> {
        Self::new(maps, freq, DEFAULT_SCREEN_VELOCITY)
    }

    pub fn freq(&self) -> f64 {
        self.freq
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Look up the rasters and derive everything about the screen towards
    /// `pos`.
    pub fn screen(&self, pos: &RADec) -> ScreenProperties {
        ScreenProperties::new(self.maps.halpha_at(pos), self.maps.tau_at(pos), self.freq)
    }

    pub fn halpha(&self, pos: &RADec) -> Measurement {
        self.maps.halpha_at(pos)
    }

    pub fn scattering_measure(&self, pos: &RADec) -> Measurement {
        scattering_measure(self.halpha(pos))
    }

    pub fn tau(&self, pos: &RADec) -> Measurement {
        self.screen(pos).tau
    }

    pub fn rdiff(&self, pos: &RADec) -> Measurement {
        self.screen(pos).rdiff
    }

    pub fn rf(&self, pos: &RADec) -> Measurement {
        self.screen(pos).rf
    }

    pub fn xi(&self, pos: &RADec) -> Measurement {
        self.screen(pos).xi
    }

    pub fn theta(&self, pos: &RADec) -> Measurement {
        self.screen(pos).theta
    }

    pub fn modulation(&self, pos: &RADec, size: f64) -> Measurement {
        self.screen(pos).modulation(size)
    }

    pub fn timescale(&self, pos: &RADec, size: f64) -> Measurement {
        self.screen(pos).timescale(size, self.velocity)
    }

    pub fn rms_variability(&self, pos: &RADec, size: f64, num_years: f64) -> Measurement {
        self.screen(pos)
            .rms_variability(size, self.velocity, num_years)
    }

    pub fn transition_frequency(&self, pos: &RADec) -> f64 {
        self.screen(pos).transition_frequency()
    }

    /// Everything reported for a source of angular size `size` \[degrees\]
    /// at `pos`.
    pub fn observables(&self, pos: &RADec, size: f64) -> Observables {
        let screen = self.screen(pos);
        Observables {
            halpha: screen.halpha,
            modulation: screen.modulation(size),
            timescale: screen.timescale(size, self.velocity),
            theta: screen.theta,
            tau: screen.tau,
        }
    }

    /// Evaluate the whole model towards `pos`, for a source of angular size
    /// `size` \[degrees\] observed over `num_years`.
    pub fn line_of_sight(&self, pos: &RADec, size: f64, num_years: f64) -> LineOfSight {
        let screen = self.screen(pos);
        LineOfSight {
            ra: pos.ra_degrees(),
            dec: pos.dec_degrees(),
            halpha: screen.halpha,
            modulation: screen.modulation(size),
            timescale: screen.timescale(size, self.velocity),
            theta: screen.theta,
            tau: screen.tau,
            rms: screen.rms_variability(size, self.velocity, num_years),
            nu0: screen.transition_frequency(),
        }
    }
}
