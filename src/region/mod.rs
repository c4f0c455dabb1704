// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Survey footprints.
//!
//! A footprint is anything that can report its solid angle and test whether
//! sky positions lie inside it ([`Region`]). [`SkyRegion`] is a union of
//! spherical caps and RA/Dec boxes, read from a TOML or JSON file, e.g.
//!
//! ```toml
//! [[cap]]
//! ra = 60.0
//! dec = -30.0
//! radius = 2.5
//!
//! [[box]]
//! ra_min = 350.0
//! ra_max = 10.0
//! dec_min = -5.0
//! dec_max = 5.0
//! ```
//!
//! All angles are in degrees.

mod error;

pub use error::RegionError;

use std::{fs::File, io::Read, path::Path, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use vec1::Vec1;

use crate::{
    coord::RADec,
    constants::{FRAC_PI_2, PI, TAU},
};

/// The number of samples along each axis of a shape's bounding box when
/// numerically integrating the area of overlapping shapes.
const AREA_GRID_SIZE: usize = 1000;

/// Square degrees per steradian.
const DEG2_PER_SR: f64 = (180.0 / PI) * (180.0 / PI);

/// A sky footprint.
pub trait Region: Sync {
    /// The solid angle of the region, in square degrees if `degrees` is
    /// true, otherwise steradians.
    fn area(&self, degrees: bool) -> f64;

    /// Which of the supplied positions lie inside the region? `ra` and `dec`
    /// must have the same length, and are in degrees if `degrees` is true,
    /// otherwise radians.
    fn contains(&self, ra: &[f64], dec: &[f64], degrees: bool) -> Vec<bool>;
}

#[derive(Debug, Display, EnumString)]
enum RegionFileType {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

/// The on-disk representation of a region.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegionFile {
    #[serde(default, rename = "cap")]
    caps: Vec<CapDef>,

    #[serde(default, rename = "box")]
    boxes: Vec<BoxDef>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CapDef {
    ra: f64,
    dec: f64,
    radius: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoxDef {
    ra_min: f64,
    ra_max: f64,
    dec_min: f64,
    dec_max: f64,
}

/// A single piece of a [`SkyRegion`]. All angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionShape {
    /// All positions within `radius` of `centre`.
    Cap { centre: RADec, radius: f64 },

    /// All positions with a declination in `[dec_min, dec_max]` and a right
    /// ascension no more than `ra_width` east of `ra_min`.
    Box {
        ra_min: f64,
        ra_width: f64,
        dec_min: f64,
        dec_max: f64,
    },
}

impl RegionShape {
    /// A cap from degrees.
    pub fn cap(ra: f64, dec: f64, radius: f64) -> RegionShape {
        RegionShape::Cap {
            centre: RADec::from_degrees(ra, dec),
            radius: radius.to_radians(),
        }
    }

    /// A box from degrees. If `ra_max` is less than `ra_min`, the box wraps
    /// through RA 0. A box spanning 360 degrees or more covers all RAs.
    pub fn ra_dec_box(ra_min: f64, ra_max: f64, dec_min: f64, dec_max: f64) -> RegionShape {
        let ra_width = if ra_max - ra_min >= 360.0 {
            TAU
        } else {
            (ra_max - ra_min).rem_euclid(360.0).to_radians()
        };
        RegionShape::Box {
            ra_min: ra_min.rem_euclid(360.0).to_radians(),
            ra_width,
            dec_min: dec_min.to_radians(),
            dec_max: dec_max.to_radians(),
        }
    }

    fn validate(&self, index: usize) -> Result<(), RegionError> {
        let reason = match *self {
            RegionShape::Cap { centre, radius } => {
                if !(centre.ra.is_finite() && centre.dec.is_finite() && radius.is_finite()) {
                    Some("non-finite cap parameters".to_string())
                } else if centre.dec.abs() > FRAC_PI_2 + 1e-12 {
                    Some(format!("declination {}° is beyond a pole", centre.dec.to_degrees()))
                } else if radius <= 0.0 || radius > PI {
                    Some(format!(
                        "radius {}° is not in (0, 180]",
                        radius.to_degrees()
                    ))
                } else {
                    None
                }
            }
            RegionShape::Box {
                ra_min,
                ra_width,
                dec_min,
                dec_max,
            } => {
                if !(ra_min.is_finite()
                    && ra_width.is_finite()
                    && dec_min.is_finite()
                    && dec_max.is_finite())
                {
                    Some("non-finite box parameters".to_string())
                } else if dec_min < -FRAC_PI_2 - 1e-12 || dec_max > FRAC_PI_2 + 1e-12 {
                    Some("declinations must be within [-90, 90]".to_string())
                } else if dec_min >= dec_max {
                    Some("dec_min must be less than dec_max".to_string())
                } else if ra_width <= 0.0 {
                    Some("the box has no extent in RA".to_string())
                } else {
                    None
                }
            }
        };
        match reason {
            Some(reason) => Err(RegionError::InvalidShape { index, reason }),
            None => Ok(()),
        }
    }

    /// Is the position (radians) inside this shape?
    pub fn contains_one(&self, ra: f64, dec: f64) -> bool {
        match *self {
            RegionShape::Cap { centre, radius } => {
                centre.separation(&RADec::new(ra, dec)) <= radius
            }
            RegionShape::Box {
                ra_min,
                ra_width,
                dec_min,
                dec_max,
            } => {
                (dec_min..=dec_max).contains(&dec)
                    && (ra_width >= TAU || (ra - ra_min).rem_euclid(TAU) <= ra_width)
            }
        }
    }

    /// The exact solid angle of this shape \[steradians\].
    pub fn area(&self) -> f64 {
        match *self {
            RegionShape::Cap { radius, .. } => TAU * (1.0 - radius.cos()),
            RegionShape::Box {
                ra_width,
                dec_min,
                dec_max,
                ..
            } => ra_width * (dec_max.sin() - dec_min.sin()),
        }
    }

    /// A (RA start, RA width, sin(dec) min, sin(dec) max) box enclosing this
    /// shape \[radians\].
    fn bounds(&self) -> (f64, f64, f64, f64) {
        match *self {
            RegionShape::Cap { centre, radius } => {
                let dec_lo = (centre.dec - radius).max(-FRAC_PI_2);
                let dec_hi = (centre.dec + radius).min(FRAC_PI_2);
                // A cap touching a pole covers all RAs.
                if centre.dec.abs() + radius >= FRAC_PI_2 {
                    (0.0, TAU, dec_lo.sin(), dec_hi.sin())
                } else {
                    let half_width = (radius.sin() / centre.c_dec).clamp(-1.0, 1.0).asin();
                    (
                        centre.ra - half_width,
                        2.0 * half_width,
                        dec_lo.sin(),
                        dec_hi.sin(),
                    )
                }
            }
            RegionShape::Box {
                ra_min,
                ra_width,
                dec_min,
                dec_max,
            } => (ra_min, ra_width, dec_min.sin(), dec_max.sin()),
        }
    }
}

/// A survey footprint made from the union of caps and boxes.
#[derive(Debug, Clone)]
pub struct SkyRegion {
    shapes: Vec1<RegionShape>,

    /// \[steradians\]
    area: f64,
}

impl SkyRegion {
    /// Make a region from its shapes, validating them and calculating the
    /// total area.
    pub fn new(shapes: Vec<RegionShape>) -> Result<SkyRegion, RegionError> {
        let shapes = Vec1::try_from_vec(shapes).map_err(|_| RegionError::NoShapes)?;
        for (i, shape) in shapes.iter().enumerate() {
            shape.validate(i)?;
        }

        let area = match shapes.as_slice() {
            [single] => single.area(),
            _ => union_area(&shapes),
        };
        if area.is_nan() || area <= 0.0 {
            return Err(RegionError::NonPositiveArea(area * DEG2_PER_SR));
        }
        Ok(SkyRegion { shapes, area })
    }

    /// Read a region from a TOML or JSON file.
    pub fn read<P: AsRef<Path>>(file: P) -> Result<SkyRegion, RegionError> {
        let file = file.as_ref();
        if !file.exists() {
            return Err(RegionError::DoesntExist(file.to_path_buf()));
        }
        let file_type = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| RegionFileType::from_str(&e).ok())
            .ok_or_else(|| RegionError::UnknownFileType(file.to_path_buf()))?;

        debug!("Reading {file_type} region file {}", file.display());
        let mut contents = String::new();
        File::open(file)?.read_to_string(&mut contents)?;
        let region_file: RegionFile = match file_type {
            RegionFileType::Toml => toml::from_str(&contents).map_err(|e| RegionError::Parse {
                file: file.to_path_buf(),
                err: e.to_string(),
            })?,
            RegionFileType::Json => {
                serde_json::from_str(&contents).map_err(|e| RegionError::Parse {
                    file: file.to_path_buf(),
                    err: e.to_string(),
                })?
            }
        };

        let shapes = region_file
            .caps
            .iter()
            .map(|c| RegionShape::cap(c.ra, c.dec, c.radius))
            .chain(
                region_file
                    .boxes
                    .iter()
                    .map(|b| RegionShape::ra_dec_box(b.ra_min, b.ra_max, b.dec_min, b.dec_max)),
            )
            .collect();
        let region = SkyRegion::new(shapes)?;
        debug!(
            "Region has {} shapes and an area of {} deg²",
            region.shapes.len(),
            region.area(true)
        );
        Ok(region)
    }

    pub fn shapes(&self) -> &[RegionShape] {
        &self.shapes
    }

    /// Is the position (radians) inside any of this region's shapes?
    fn contains_one(&self, ra: f64, dec: f64) -> bool {
        self.shapes.iter().any(|s| s.contains_one(ra, dec))
    }
}

impl Region for SkyRegion {
    fn area(&self, degrees: bool) -> f64 {
        if degrees {
            self.area * DEG2_PER_SR
        } else {
            self.area
        }
    }

    fn contains(&self, ra: &[f64], dec: &[f64], degrees: bool) -> Vec<bool> {
        ra.iter()
            .zip(dec.iter())
            .map(|(&ra, &dec)| {
                if degrees {
                    self.contains_one(ra.to_radians(), dec.to_radians())
                } else {
                    self.contains_one(ra, dec)
                }
            })
            .collect()
    }
}

/// Integrate the area of a union of shapes \[steradians\]. Each shape's
/// bounding box is sampled on a grid that is uniform in RA and sin(dec) (so
/// every sample covers the same solid angle); a sample inside `k` shapes
/// contributes `1/k` of its solid angle, so overlaps are only counted once.
fn union_area(shapes: &[RegionShape]) -> f64 {
    let n = AREA_GRID_SIZE;
    shapes
        .iter()
        .map(|shape| {
            let (ra_start, ra_width, z_min, z_max) = shape.bounds();
            let d_ra = ra_width / n as f64;
            let d_z = (z_max - z_min) / n as f64;
            let mut weight = 0.0;
            for i_z in 0..n {
                let dec = (z_min + (i_z as f64 + 0.5) * d_z).asin();
                for i_ra in 0..n {
                    let ra = (ra_start + (i_ra as f64 + 0.5) * d_ra).rem_euclid(TAU);
                    if !shape.contains_one(ra, dec) {
                        continue;
                    }
                    let k = shapes.iter().filter(|s| s.contains_one(ra, dec)).count();
                    weight += 1.0 / k as f64;
                }
            }
            weight * d_ra * d_z
        })
        .sum()
}
