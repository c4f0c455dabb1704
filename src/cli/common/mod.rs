// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Both `simulate` and
//! `scintillate` need sky rasters, so the raster arguments are shared
//! between them.

mod printers;

pub(crate) use printers::{display_warnings, InfoPrinter, Warn};

use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use super::VarskyError;
use crate::{
    constants::{DEFAULT_FREQ_MHZ, DEFAULT_SCREEN_VELOCITY},
    raster::{MapVersion, SkyMapPaths, SkyMaps},
};

/// The directory containing the sky rasters, if none is specified.
pub(super) const DEFAULT_DATA_DIR: &str = "data";

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    pub(super) static ref FREQ_HELP: String =
        format!("The observing frequency [MHz]. Default: {DEFAULT_FREQ_MHZ}");

    pub(super) static ref VELOCITY_HELP: String =
        format!("The velocity of the scattering screen relative to the observer [km/s]. Default: {}", DEFAULT_SCREEN_VELOCITY / 1e3);

    static ref DATA_DIR_HELP: String =
        format!("The directory containing the Hα and scattering-delay rasters. Default: {DEFAULT_DATA_DIR}");
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(VarskyError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(VarskyError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(VarskyError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// Where to find the sky rasters.
#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SkyMapArgs {
    #[clap(long, help = DATA_DIR_HELP.as_str(), help_heading = "SKY MAPS")]
    pub(super) data_dir: Option<PathBuf>,

    /// Which Hα maps to use. 0: Halpha_map.fits and Halpha_error.fits. 1:
    /// Ha_map_new.fits and Ha_err_new.fits. Default: 0
    #[clap(short, long, help_heading = "SKY MAPS")]
    pub(super) map_version: Option<u8>,

    /// Use this Hα raster rather than the one in the data directory.
    #[clap(long, help_heading = "SKY MAPS")]
    pub(super) halpha_map: Option<PathBuf>,

    /// Use this Hα error raster rather than the one in the data directory.
    #[clap(long, help_heading = "SKY MAPS")]
    pub(super) halpha_err_map: Option<PathBuf>,

    /// Use this scattering-delay raster rather than tau_map.fits in the data
    /// directory.
    #[clap(long, help_heading = "SKY MAPS")]
    pub(super) tau_map: Option<PathBuf>,
}

impl SkyMapArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            data_dir: self.data_dir.or(other.data_dir),
            map_version: self.map_version.or(other.map_version),
            halpha_map: self.halpha_map.or(other.halpha_map),
            halpha_err_map: self.halpha_err_map.or(other.halpha_err_map),
            tau_map: self.tau_map.or(other.tau_map),
        }
    }

    /// Work out where each raster is, without reading anything.
    pub(super) fn paths(&self) -> Result<(MapVersion, SkyMapPaths), VarskyError> {
        let version = MapVersion::try_from(self.map_version.unwrap_or(0))?;
        let data_dir = self
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let mut paths = SkyMapPaths::in_data_dir(&data_dir, version);
        if let Some(p) = &self.halpha_map {
            paths.halpha = p.clone();
        }
        if let Some(p) = &self.halpha_err_map {
            paths.halpha_err = p.clone();
        }
        if let Some(p) = &self.tau_map {
            paths.tau = p.clone();
        }
        Ok((version, paths))
    }

    /// Read the rasters.
    pub(super) fn parse(self) -> Result<(MapVersion, SkyMaps), VarskyError> {
        let (version, paths) = self.paths()?;
        debug!("Reading sky rasters: {paths:?}");
        let maps = SkyMaps::from_fits(&paths)?;

        let mut printer = InfoPrinter::new("Sky maps".into());
        printer.push_line(format!("Map version {}", version.number()).into());
        let (ny, nx) = maps.halpha.dim();
        printer.push_block(vec![
            format!("Hα:       {} ({nx}x{ny})", paths.halpha.display()).into(),
            format!("Hα error: {}", paths.halpha_err.display()).into(),
        ]);
        let (ny, nx) = maps.tau.dim();
        printer.push_line(format!("τ:        {} ({nx}x{ny})", paths.tau.display()).into());
        printer.display();

        Ok((version, maps))
    }
}
