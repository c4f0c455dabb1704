// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading FITS rasters.

use std::{fmt, panic::Location, path::PathBuf};

use thiserror::Error;

/// The varsky source location that asked cfitsio for something.
#[derive(Debug, Clone, Copy)]
pub struct Caller(&'static Location<'static>);

impl Caller {
    #[track_caller]
    pub(super) fn here() -> Caller {
        Caller(Location::caller())
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.0.file(), self.0.line(), self.0.column())
    }
}

#[derive(Error, Debug)]
pub enum FitsError {
    #[error("{caller}: Couldn't open {file}: {err}")]
    Open {
        err: Box<fitsio::errors::Error>,
        file: PathBuf,
        caller: Caller,
    },

    #[error("{caller}: {file} HDU {hdu}: Couldn't find key {key}")]
    MissingKey {
        key: String,
        file: PathBuf,
        hdu: usize,
        caller: Caller,
    },

    /// The HDU holds a table rather than an image.
    #[error("{caller}: {file} HDU {hdu}: Expected an image, but found a table")]
    NotImage {
        file: PathBuf,
        hdu: usize,
        caller: Caller,
    },

    #[error("{caller}: {file} HDU {hdu}: {err}")]
    Fitsio {
        err: Box<fitsio::errors::Error>,
        file: PathBuf,
        hdu: usize,
        caller: Caller,
    },

    #[error("{caller}: Couldn't parse the value '{value}' of {key} in {file} HDU {hdu}")]
    Parse {
        key: String,
        value: String,
        file: PathBuf,
        hdu: usize,
        caller: Caller,
    },
}
