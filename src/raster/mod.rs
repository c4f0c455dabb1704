// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! All-sky rasters (FITS images) and lookups into them.
//!
//! Only plate carrée (CAR) and linear celestial axes are understood; this
//! covers the Hα emission and scattering-delay maps used by the
//! scintillation model. Positions that fall off the edge of a raster are
//! clamped to the nearest edge pixel.

mod error;

pub use error::RasterError;

use std::path::{Path, PathBuf};

use log::debug;
use ndarray::prelude::*;

use crate::{
    coord::{Frame, RADec},
    io::read::fits::*,
    math::Measurement,
};

/// The world-to-pixel transform of a raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// The celestial frame of the raster's axes.
    pub frame: Frame,

    /// The 1-based reference pixel (CRPIX1, CRPIX2).
    pub crpix: [f64; 2],

    /// The world coordinates of the reference pixel \[degrees\].
    pub crval: [f64; 2],

    /// The pixel scale along each axis \[degrees\].
    pub cdelt: [f64; 2],
}

impl Projection {
    /// Convert a longitude and latitude (in this projection's frame,
    /// degrees) to fractional, 0-based pixel coordinates (x, y).
    pub fn world_to_pixel(&self, lon: f64, lat: f64) -> (f64, f64) {
        // Longitude offsets are wrapped into [-180, 180) so that rasters
        // centred on any longitude are handled.
        let d_lon = (lon - self.crval[0] + 180.0).rem_euclid(360.0) - 180.0;
        let x = self.crpix[0] - 1.0 + d_lon / self.cdelt[0];
        let y = self.crpix[1] - 1.0 + (lat - self.crval[1]) / self.cdelt[1];
        (x, y)
    }
}

/// Work out the frame of a pair of `CTYPE` values, checking that the
/// projection is one we can handle.
fn parse_ctypes(file: &Path, ctype1: &str, ctype2: &str) -> Result<Frame, RasterError> {
    let split = |ctype: &str| -> (String, String) {
        let (axis, proj) = ctype.split_once('-').unwrap_or((ctype, ""));
        (
            axis.trim().to_uppercase(),
            proj.trim_start_matches('-').trim().to_uppercase(),
        )
    };
    let (axis1, proj1) = split(ctype1);
    let (axis2, proj2) = split(ctype2);

    for (ctype, proj) in [(ctype1, proj1), (ctype2, proj2)] {
        if !(proj.is_empty() || proj == "CAR") {
            return Err(RasterError::UnsupportedProjection {
                file: file.to_path_buf(),
                ctype: ctype.to_string(),
            });
        }
    }

    match (axis1.as_str(), axis2.as_str()) {
        ("RA", "DEC") => Ok(Frame::Equatorial),
        ("GLON", "GLAT") => Ok(Frame::Galactic),
        _ => Err(RasterError::UnknownFrame {
            file: file.to_path_buf(),
            ctype1: ctype1.to_string(),
            ctype2: ctype2.to_string(),
        }),
    }
}

/// An immutable 2D grid of values, and the transform from sky coordinates to
/// pixels.
#[derive(Debug, Clone)]
pub struct RasterField {
    /// The pixel values. The first dimension is latitude (NAXIS2), the
    /// second longitude (NAXIS1).
    data: Array2<f32>,

    projection: Projection,
}

impl RasterField {
    pub fn new(data: Array2<f32>, projection: Projection) -> RasterField {
        RasterField { data, projection }
    }

    /// Read a raster from the primary HDU of a FITS file.
    pub fn from_fits<P: AsRef<Path>>(file: P) -> Result<RasterField, RasterError> {
        let file = file.as_ref();
        if !file.exists() {
            return Err(RasterError::DoesntExist(file.to_path_buf()));
        }
        debug!("Reading raster {}", file.display());

        let mut fptr = fits_open(file)?;
        let hdu = fits_open_hdu(&mut fptr, 0)?;

        // Degenerate axes (e.g. a frequency axis of length 1) are allowed.
        let shape = fits_get_image_shape(&fptr, &hdu)?;
        let (ny, nx) = match shape.as_slice() {
            [rest @ .., ny, nx] if *ny > 0 && *nx > 0 && rest.iter().all(|&d| d == 1) => {
                (*ny, *nx)
            }
            _ => {
                return Err(RasterError::NotTwoDimensional {
                    file: file.to_path_buf(),
                    shape,
                })
            }
        };

        let ctype1: String = fits_get_required_key(&mut fptr, &hdu, "CTYPE1")?;
        let ctype2: String = fits_get_required_key(&mut fptr, &hdu, "CTYPE2")?;
        let frame = parse_ctypes(file, &ctype1, &ctype2)?;
        let crpix1: f64 = fits_get_required_key(&mut fptr, &hdu, "CRPIX1")?;
        let crpix2: f64 = fits_get_required_key(&mut fptr, &hdu, "CRPIX2")?;
        let crval1: f64 = fits_get_required_key(&mut fptr, &hdu, "CRVAL1")?;
        let crval2: f64 = fits_get_required_key(&mut fptr, &hdu, "CRVAL2")?;
        let cdelt1 = match fits_get_optional_key::<f64>(&mut fptr, &hdu, "CDELT1")? {
            Some(c) => c,
            None => fits_get_required_key(&mut fptr, &hdu, "CD1_1")?,
        };
        let cdelt2 = match fits_get_optional_key::<f64>(&mut fptr, &hdu, "CDELT2")? {
            Some(c) => c,
            None => fits_get_required_key(&mut fptr, &hdu, "CD2_2")?,
        };
        for (axis, cdelt) in [(1, cdelt1), (2, cdelt2)] {
            if cdelt == 0.0 || !cdelt.is_finite() {
                return Err(RasterError::BadPixelScale {
                    file: file.to_path_buf(),
                    axis,
                });
            }
        }

        let pixels: Vec<f32> = fits_get_image(&mut fptr, &hdu)?;
        let got = pixels.len();
        let data = Array2::from_shape_vec((ny, nx), pixels).map_err(|_| {
            RasterError::BadDataLength {
                got,
                expected: ny * nx,
            }
        })?;
        debug!("{}: {nx}x{ny} pixels, {frame} frame", file.display());

        Ok(RasterField {
            data,
            projection: Projection {
                frame,
                crpix: [crpix1, crpix2],
                crval: [crval1, crval2],
                cdelt: [cdelt1, cdelt2],
            },
        })
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn frame(&self) -> Frame {
        self.projection.frame
    }

    /// The shape of the raster (NAXIS2, NAXIS1).
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Get the (row, column) indices of the pixel covering the supplied
    /// longitude and latitude \[degrees, in this raster's frame\]. Indices
    /// beyond the raster are clamped to its edge.
    pub fn pixel_indices(&self, lon: f64, lat: f64) -> (usize, usize) {
        let (ny, nx) = self.data.dim();
        let (x, y) = self.projection.world_to_pixel(lon, lat);
        // NaN casts to 0.
        let clamp = |p: f64, n: usize| (p.floor() as i64).clamp(0, n as i64 - 1) as usize;
        (clamp(y, ny), clamp(x, nx))
    }

    /// The raster value at an equatorial position.
    pub fn value_at(&self, pos: &RADec) -> f64 {
        let (lon, lat) = pos.lon_lat_degrees(self.projection.frame);
        self.value_at_lon_lat(lon, lat)
    }

    /// The raster value at a longitude and latitude already in this raster's
    /// frame \[degrees\].
    pub fn value_at_lon_lat(&self, lon: f64, lat: f64) -> f64 {
        f64::from(self.data[self.pixel_indices(lon, lat)])
    }
}

/// Which pair of Hα rasters to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapVersion {
    /// The legacy Hα map and its error map.
    Legacy,

    /// The updated Hα map and its error map.
    Updated,
}

impl MapVersion {
    /// The file names of the Hα map and its error map.
    pub fn halpha_file_names(self) -> (&'static str, &'static str) {
        match self {
            MapVersion::Legacy => ("Halpha_map.fits", "Halpha_error.fits"),
            MapVersion::Updated => ("Ha_map_new.fits", "Ha_err_new.fits"),
        }
    }

    /// The numeric selector of this version.
    pub fn number(self) -> u8 {
        match self {
            MapVersion::Legacy => 0,
            MapVersion::Updated => 1,
        }
    }
}

impl TryFrom<u8> for MapVersion {
    type Error = RasterError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MapVersion::Legacy),
            1 => Ok(MapVersion::Updated),
            _ => Err(RasterError::InvalidMapVersion(value)),
        }
    }
}

/// The locations of the three rasters needed by the scintillation model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkyMapPaths {
    pub halpha: PathBuf,
    pub halpha_err: PathBuf,
    pub tau: PathBuf,
}

impl SkyMapPaths {
    /// Get the default raster paths for a map version inside a data
    /// directory.
    pub fn in_data_dir(data_dir: &Path, version: MapVersion) -> SkyMapPaths {
        let (halpha, halpha_err) = version.halpha_file_names();
        SkyMapPaths {
            halpha: data_dir.join(halpha),
            halpha_err: data_dir.join(halpha_err),
            tau: data_dir.join("tau_map.fits"),
        }
    }
}

/// The Hα emission raster, its error raster, and the scattering-delay
/// raster. These are read once and shared immutably by all lookups.
#[derive(Debug, Clone)]
pub struct SkyMaps {
    pub halpha: RasterField,
    pub halpha_err: RasterField,
    pub tau: RasterField,
}

impl SkyMaps {
    pub fn new(halpha: RasterField, halpha_err: RasterField, tau: RasterField) -> SkyMaps {
        SkyMaps {
            halpha,
            halpha_err,
            tau,
        }
    }

    pub fn from_fits(paths: &SkyMapPaths) -> Result<SkyMaps, RasterError> {
        Ok(SkyMaps {
            halpha: RasterField::from_fits(&paths.halpha)?,
            halpha_err: RasterField::from_fits(&paths.halpha_err)?,
            tau: RasterField::from_fits(&paths.tau)?,
        })
    }

    /// The Hα intensity \[Rayleigh\] and its uncertainty at a position.
    pub fn halpha_at(&self, pos: &RADec) -> Measurement {
        Measurement::new(self.halpha.value_at(pos), self.halpha_err.value_at(pos))
    }

    /// The scattering delay at the reference frequency at a position.
    pub fn tau_at(&self, pos: &RADec) -> f64 {
        self.tau.value_at(pos)
    }
}
