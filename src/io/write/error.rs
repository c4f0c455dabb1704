// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with writing catalogs and reports.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("Cannot write to the specified file '{file}'. Do you have write permissions set?")]
    FileNotWritable { file: String },

    #[error("Couldn't create directory '{0}' for output files. Do you have write permissions set?")]
    NewDirectory(PathBuf),

    #[error("The output path '{0}' has no file name")]
    NoFileName(PathBuf),

    #[error("The catalog directory '{0}' exists but isn't a directory")]
    NotADirectory(PathBuf),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
