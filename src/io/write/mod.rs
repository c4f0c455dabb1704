// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to write out source catalogs, survey reports and line-of-sight
//! tables. Everything is written as delimited text; the delimiter is chosen
//! from the file extension.

mod error;

pub(crate) use error::WriteError;

use std::{
    fs::File,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
use log::{debug, trace};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    cli::Warn,
    scintillation::LineOfSight,
    survey::{IterationSummary, SourceRecord, SurveySummary},
};

lazy_static::lazy_static! {
    pub(crate) static ref REPORT_FORMATS_COMMA_SEPARATED: String = ReportFormat::iter().join(", ");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub(crate) enum ReportFormat {
    #[strum(serialize = "csv")]
    Csv,

    #[strum(serialize = "tsv")]
    Tsv,
}

impl ReportFormat {
    /// Deduce the format from a file's extension. Anything unrecognised is
    /// written as CSV.
    pub(crate) fn from_path(file: &Path) -> ReportFormat {
        file.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| ReportFormat::from_str(&e.to_lowercase()).ok())
            .unwrap_or(ReportFormat::Csv)
    }

    pub(crate) fn delimiter(self) -> u8 {
        match self {
            ReportFormat::Csv => b',',
            ReportFormat::Tsv => b'\t',
        }
    }
}

/// Open a delimited-text writer for `file`.
fn table_writer(file: &Path) -> Result<csv::Writer<File>, WriteError> {
    trace!("Creating {}", file.display());
    let wtr = csv::WriterBuilder::new()
        .delimiter(ReportFormat::from_path(file).delimiter())
        .from_path(file)?;
    Ok(wtr)
}

/// Given a requested output file (e.g. `results.csv`), get the per-iteration
/// data file (`results_data.csv`) and averaged results file
/// (`results_results.csv`).
pub(crate) fn report_file_names(out: &Path) -> Result<(PathBuf, PathBuf), WriteError> {
    let stem = out
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| WriteError::NoFileName(out.to_path_buf()))?;
    let ext = match out.extension().and_then(|e| e.to_str()) {
        Some(e) => format!(".{e}"),
        None => String::new(),
    };
    Ok((
        out.with_file_name(format!("{stem}_data{ext}")),
        out.with_file_name(format!("{stem}_results{ext}")),
    ))
}

/// The name of the catalog file written for one iteration. Iterations are
/// counted from 1.
pub(crate) fn catalog_file_name(region_stem: &str, map_version: u8, iteration: usize) -> String {
    format!("{region_stem}_tau_m{map_version}_iter{iteration:04}_data.csv")
}

/// Check that a file can be written, creating any missing parent directories.
/// Overwriting an existing file is allowed, but a warning is issued.
pub(crate) fn can_write_to_file(file: &Path) -> Result<(), WriteError> {
    trace!("Testing whether we can write to {}", file.display());

    let file_exists = file.exists();
    match std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(file)
        .map_err(|e| e.kind())
    {
        Ok(_) => {
            // Don't leave an empty file behind.
            if !file_exists {
                std::fs::remove_file(file)?;
            }
        }

        Err(std::io::ErrorKind::NotFound) => {
            if let Some(p) = file.parent() {
                match std::fs::DirBuilder::new()
                    .recursive(true)
                    .create(p)
                    .map_err(|e| e.kind())
                {
                    Ok(()) => (),
                    Err(std::io::ErrorKind::PermissionDenied) => {
                        return Err(WriteError::NewDirectory(p.to_path_buf()))
                    }
                    Err(e) => return Err(WriteError::IO(e.into())),
                }
            }
        }

        Err(std::io::ErrorKind::PermissionDenied) => {
            return Err(WriteError::FileNotWritable {
                file: file.display().to_string(),
            })
        }

        Err(e) => return Err(WriteError::IO(e.into())),
    }

    if file_exists {
        format!("Will overwrite the existing file '{}'", file.display()).warn();
    }
    Ok(())
}

/// Make sure that a directory for catalogs exists.
pub(crate) fn create_catalog_dir(dir: &Path) -> Result<(), WriteError> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(WriteError::NotADirectory(dir.to_path_buf()));
        }
        if std::fs::metadata(dir)?.permissions().readonly() {
            return Err(WriteError::FileNotWritable {
                file: dir.display().to_string(),
            });
        }
        return Ok(());
    }

    std::fs::DirBuilder::new()
        .recursive(true)
        .create(dir)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => WriteError::NewDirectory(dir.to_path_buf()),
            _ => WriteError::IO(e),
        })
}

/// Write one row per source.
pub(crate) fn write_catalog(file: &Path, records: &[SourceRecord]) -> Result<(), WriteError> {
    debug!("Writing {} sources to {}", records.len(), file.display());
    let mut w = table_writer(file)?;
    w.write_record([
        "RA",
        "DEC",
        "Flux",
        "Class",
        "H_Alpha",
        "H_Alpha err",
        "Modulation",
        "Modulation err",
        "Timescale",
        "Timescale err",
        "Theta",
        "Theta err",
        "Tau",
        "Tau err",
    ])?;
    for r in records {
        w.write_record([
            r.ra.to_string(),
            r.dec.to_string(),
            r.flux.to_string(),
            r.class.to_string(),
            r.halpha.value.to_string(),
            r.halpha.error.to_string(),
            r.modulation.value.to_string(),
            r.modulation.error.to_string(),
            r.timescale.value.to_string(),
            r.timescale.error.to_string(),
            r.theta.value.to_string(),
            r.theta.error.to_string(),
            r.tau.value.to_string(),
            r.tau.error.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Write one row per Monte Carlo iteration.
pub(crate) fn write_iteration_data(
    file: &Path,
    summaries: &[IterationSummary],
) -> Result<(), WriteError> {
    debug!("Writing per-iteration data to {}", file.display());
    let mut w = table_writer(file)?;
    w.write_record([
        "Iteration",
        "H_Alpha Mean",
        "H_Alpha STD",
        "Modulation Mean",
        "Modulation STD",
        "Timescale Mean",
        "Timescale STD",
        "Theta Mean",
        "Theta STD",
        "Areal Sky Density",
        "Detectable Areal Sky Density",
        "Number of Sources",
    ])?;
    for (i, s) in summaries.iter().enumerate() {
        w.write_record([
            (i + 1).to_string(),
            s.halpha.mean.to_string(),
            s.halpha.std.to_string(),
            s.modulation.mean.to_string(),
            s.modulation.std.to_string(),
            s.timescale.mean.to_string(),
            s.timescale.std.to_string(),
            s.theta.mean.to_string(),
            s.theta.std.to_string(),
            s.areal_density.to_string(),
            s.detectable_density.to_string(),
            s.num_sources.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Write the averaged results of a survey. The statistics and parameters are
/// written side-by-side; `parameters` are appended to the parameters derived
/// from the summary.
pub(crate) fn write_results(
    file: &Path,
    summary: &SurveySummary,
    parameters: &[(&str, String)],
) -> Result<(), WriteError> {
    debug!("Writing survey results to {}", file.display());
    let stats = [
        ("H_Alpha Mean", summary.halpha.mean),
        ("H_Alpha STD", summary.halpha.std),
        ("Modulation Mean", summary.modulation.mean),
        ("Modulation STD", summary.modulation.std),
        ("Timescale Mean (yrs)", summary.timescale.mean),
        ("Timescale STD (yrs)", summary.timescale.std),
        ("Theta Mean (deg)", summary.theta.mean),
        ("Theta STD (deg)", summary.theta.std),
        ("Areal Sky Density Mean", summary.areal_density.mean),
        ("Areal Sky Density STD", summary.areal_density.std),
        (
            "Detectable Areal Sky Density Mean",
            summary.detectable_density.mean,
        ),
        (
            "Detectable Areal Sky Density STD",
            summary.detectable_density.std,
        ),
    ];
    let mut params: Vec<(&str, String)> = vec![
        ("Iterations", summary.num_iterations.to_string()),
        ("Avg # Sources", summary.avg_num_sources.to_string()),
        ("Avg Variables", summary.avg_variables.to_string()),
        (
            "Avg Detectable Variables",
            summary.avg_detectable_variables.to_string(),
        ),
        ("Area (deg^2)", summary.area.to_string()),
        ("Avg Normalisation", summary.avg_normalisation.to_string()),
    ];
    params.extend(parameters.iter().cloned());

    let mut w = table_writer(file)?;
    w.write_record(["Statistics", "Results", "Parameters", "Values"])?;
    for i in 0..stats.len().max(params.len()) {
        let (stat, result) = match stats.get(i) {
            Some((s, r)) => (s.to_string(), r.to_string()),
            None => (String::new(), String::new()),
        };
        let (param, value) = match params.get(i) {
            Some((p, v)) => (p.to_string(), v.clone()),
            None => (String::new(), String::new()),
        };
        w.write_record([stat, result, param, value])?;
    }
    w.flush()?;
    Ok(())
}

/// Write one row per line of sight.
pub(crate) fn write_lines_of_sight(file: &Path, lines: &[LineOfSight]) -> Result<(), WriteError> {
    debug!("Writing {} lines of sight to {}", lines.len(), file.display());
    let mut w = table_writer(file)?;
    w.write_record([
        "RA",
        "DEC",
        "H_Alpha",
        "H_Alpha err",
        "Modulation",
        "Modulation err",
        "Timescale",
        "Timescale err",
        "Theta",
        "Theta err",
        "Tau",
        "Tau err",
        "RMS",
        "RMS err",
        "Nu0",
    ])?;
    for l in lines {
        w.write_record([
            l.ra.to_string(),
            l.dec.to_string(),
            l.halpha.value.to_string(),
            l.halpha.error.to_string(),
            l.modulation.value.to_string(),
            l.modulation.error.to_string(),
            l.timescale.value.to_string(),
            l.timescale.error.to_string(),
            l.theta.value.to_string(),
            l.theta.error.to_string(),
            l.tau.value.to_string(),
            l.tau.error.to_string(),
            l.rms.value.to_string(),
            l.rms.error.to_string(),
            l.nu0.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
