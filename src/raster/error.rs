// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with sky rasters.

use std::path::PathBuf;

use thiserror::Error;

use crate::io::read::fits::FitsError;

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Sky raster '{0}' doesn't exist")]
    DoesntExist(PathBuf),

    #[error("Sky raster '{file}' has image shape {shape:?}; only 2D images (plus degenerate axes) are supported")]
    NotTwoDimensional { file: PathBuf, shape: Vec<usize> },

    #[error("Sky raster '{file}' uses the projection '{ctype}'; only plate carrée (CAR) or linear axes are supported")]
    UnsupportedProjection { file: PathBuf, ctype: String },

    #[error("Sky raster '{file}' has axes '{ctype1}' and '{ctype2}', which don't describe a recognised celestial frame")]
    UnknownFrame {
        file: PathBuf,
        ctype1: String,
        ctype2: String,
    },

    #[error("Sky raster '{file}' has a zero or non-finite pixel scale on axis {axis}")]
    BadPixelScale { file: PathBuf, axis: u8 },

    #[error("Sky raster data has {got} elements, but its shape requires {expected}")]
    BadDataLength { got: usize, expected: usize },

    #[error("Map version {0} is invalid; valid versions are 0 (legacy) and 1 (updated)")]
    InvalidMapVersion(u8),

    #[error(transparent)]
    Fits(#[from] FitsError),
}
