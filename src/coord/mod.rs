// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Sky coordinates.


use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::constants::TAU;

/// Rotation from J2000 equatorial direction cosines to Galactic direction
/// cosines (Hipparcos definition of the Galactic frame).
const EQUATORIAL_TO_GALACTIC: [[f64; 3]; 3] = [
    [-0.054_875_539_390, -0.873_437_104_725, -0.483_834_991_775],
    [0.494_109_453_633, -0.444_829_594_298, 0.746_982_248_696],
    [-0.867_666_135_681, -0.198_076_389_622, 0.455_983_794_523],
];

/// The celestial frame that a set of longitude/latitude coordinates refer
/// to.
#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    /// J2000 right ascension and declination.
    #[strum(serialize = "equatorial")]
    Equatorial,

    /// Galactic longitude and latitude.
    #[strum(serialize = "galactic")]
    Galactic,
}

/// A struct containing a Right Ascension and Declination. As the sine and
/// cosine of these coordinates is often used, these are also stored in the
/// struct. All units are in radians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RADec {
    /// Right ascension \[radians\]
    pub ra: f64,
    /// sin(ra)
    pub s_ra: f64,
    /// cos(ra)
    pub c_ra: f64,
    /// Declination \[radians\]
    pub dec: f64,
    /// sin(dec)
    pub s_dec: f64,
    /// cos(dec)
    pub c_dec: f64,
}

impl RADec {
    /// As the struct saves sine and cosine values, this `new` function exists
    /// to reduce programmer effort. All arguments are in radians.
    pub fn new(ra: f64, dec: f64) -> RADec {
        let (s_ra, c_ra) = ra.sin_cos();
        let (s_dec, c_dec) = dec.sin_cos();
        RADec {
            ra,
            s_ra,
            c_ra,
            dec,
            s_dec,
            c_dec,
        }
    }

    pub fn from_degrees(ra: f64, dec: f64) -> RADec {
        Self::new(ra.to_radians(), dec.to_radians())
    }

    pub fn ra_degrees(&self) -> f64 {
        self.ra.to_degrees()
    }

    pub fn dec_degrees(&self) -> f64 {
        self.dec.to_degrees()
    }

    /// The unit vector pointing at these coordinates.
    pub fn to_unit_vector(&self) -> [f64; 3] {
        [
            self.c_dec * self.c_ra,
            self.c_dec * self.s_ra,
            self.s_dec,
        ]
    }

    /// Convert these J2000 equatorial coordinates to Galactic longitude and
    /// latitude \[radians\]. The longitude is in the range [0, 2π).
    pub fn to_galactic(&self) -> (f64, f64) {
        let v = self.to_unit_vector();
        let g: Vec<f64> = EQUATORIAL_TO_GALACTIC
            .iter()
            .map(|row| row[0] * v[0] + row[1] * v[1] + row[2] * v[2])
            .collect();
        let l = g[1].atan2(g[0]).rem_euclid(TAU);
        let b = g[2].clamp(-1.0, 1.0).asin();
        (l, b)
    }

    /// Get the longitude and latitude of these coordinates in the requested
    /// frame \[degrees\].
    pub fn lon_lat_degrees(&self, frame: Frame) -> (f64, f64) {
        match frame {
            Frame::Equatorial => (self.ra_degrees(), self.dec_degrees()),
            Frame::Galactic => {
                let (l, b) = self.to_galactic();
                (l.to_degrees(), b.to_degrees())
            }
        }
    }

    /// Calculate the angular distance to another set of coordinates
    /// \[radians\]. This uses the haversine formula, which is well behaved for
    /// small separations.
    pub fn separation(&self, other: &RADec) -> f64 {
        let d_dec = (other.dec - self.dec) / 2.0;
        let d_ra = (other.ra - self.ra) / 2.0;
        let h = d_dec.sin().powi(2) + self.c_dec * other.c_dec * d_ra.sin().powi(2);
        2.0 * h.sqrt().clamp(0.0, 1.0).asin()
    }
}
