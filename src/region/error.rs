// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with survey regions.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("Region file '{0}' doesn't exist")]
    DoesntExist(PathBuf),

    #[error("Region file '{0}' has an unrecognised extension; supported formats: toml, json")]
    UnknownFileType(PathBuf),

    #[error("Couldn't decode the region file '{file}': {err}")]
    Parse { file: PathBuf, err: String },

    #[error("The region has no shapes")]
    NoShapes,

    #[error("Region shape {index} is invalid: {reason}")]
    InvalidShape { index: usize, reason: String },

    #[error("The region's area ({0} deg²) is not positive")]
    NonPositiveArea(f64),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
