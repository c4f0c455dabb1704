// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Thin wrappers around fitsio for reading raster images and their headers.
//! Every error records which line of varsky made the failing request. HDU
//! numbers in errors are 1-based, as in other FITS tools.

mod error;

pub use error::{Caller, FitsError};

use std::{path::Path, str::FromStr};

use fitsio::{
    hdu::{FitsHdu, HduInfo},
    images::ReadImage,
    FitsFile,
};

/// cfitsio's KEY_NO_EXIST and VALUE_UNDEFINED statuses.
const ABSENT_KEY_STATUSES: [i32; 2] = [202, 204];

#[track_caller]
pub(crate) fn fits_open(file: &Path) -> Result<FitsFile, FitsError> {
    let caller = Caller::here();
    FitsFile::open(file).map_err(|err| FitsError::Open {
        err: Box::new(err),
        file: file.to_path_buf(),
        caller,
    })
}

/// Open the HDU with a 0-based index.
#[track_caller]
pub(crate) fn fits_open_hdu(fptr: &mut FitsFile, index: usize) -> Result<FitsHdu, FitsError> {
    let caller = Caller::here();
    fptr.hdu(index).map_err(|err| FitsError::Fitsio {
        err: Box::new(err),
        file: fptr.file_path().to_path_buf(),
        hdu: index + 1,
        caller,
    })
}

/// Read a header key that may be absent. Quotes and padding around string
/// values are removed before parsing.
#[track_caller]
pub(crate) fn fits_get_optional_key<T: FromStr>(
    fptr: &mut FitsFile,
    hdu: &FitsHdu,
    key: &str,
) -> Result<Option<T>, FitsError> {
    let caller = Caller::here();
    let raw: String = match hdu.read_key(fptr, key) {
        Ok(v) => v,
        Err(fitsio::errors::Error::Fits(e)) if ABSENT_KEY_STATUSES.contains(&e.status) => {
            return Ok(None)
        }
        Err(err) => {
            return Err(FitsError::Fitsio {
                err: Box::new(err),
                file: fptr.file_path().to_path_buf(),
                hdu: hdu.number + 1,
                caller,
            })
        }
    };

    let value = raw.trim().trim_matches('\'').trim();
    value.parse().map(Some).map_err(|_| FitsError::Parse {
        key: key.to_string(),
        value: value.to_string(),
        file: fptr.file_path().to_path_buf(),
        hdu: hdu.number + 1,
        caller,
    })
}

#[track_caller]
pub(crate) fn fits_get_required_key<T: FromStr>(
    fptr: &mut FitsFile,
    hdu: &FitsHdu,
    key: &str,
) -> Result<T, FitsError> {
    let caller = Caller::here();
    fits_get_optional_key(fptr, hdu, key)?.ok_or_else(|| FitsError::MissingKey {
        key: key.to_string(),
        file: fptr.file_path().to_path_buf(),
        hdu: hdu.number + 1,
        caller,
    })
}

/// The image shape in C order (the last element is NAXIS1).
#[track_caller]
pub(crate) fn fits_get_image_shape(
    fptr: &FitsFile,
    hdu: &FitsHdu,
) -> Result<Vec<usize>, FitsError> {
    let caller = Caller::here();
    match &hdu.info {
        HduInfo::ImageInfo { shape, .. } => Ok(shape.clone()),
        _ => Err(FitsError::NotImage {
            file: fptr.file_path().to_path_buf(),
            hdu: hdu.number + 1,
            caller,
        }),
    }
}

#[track_caller]
pub(crate) fn fits_get_image<T: ReadImage>(
    fptr: &mut FitsFile,
    hdu: &FitsHdu,
) -> Result<T, FitsError> {
    let caller = Caller::here();
    if !matches!(hdu.info, HduInfo::ImageInfo { .. }) {
        return Err(FitsError::NotImage {
            file: fptr.file_path().to_path_buf(),
            hdu: hdu.number + 1,
            caller,
        });
    }
    hdu.read_image(fptr).map_err(|err| FitsError::Fitsio {
        err: Box::new(err),
        file: fptr.file_path().to_path_buf(),
        hdu: hdu.number + 1,
        caller,
    })
}
