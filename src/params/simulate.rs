// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parameters for simulating surveys, and the Monte Carlo driver.


use std::path::PathBuf;

use indicatif::{ParallelProgressIterator, ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use log::{debug, info};
use rayon::prelude::*;
use thiserror::Error;

use crate::{
    cli::InfoPrinter,
    constants::SECONDS_PER_DAY,
    io::write::{
        catalog_file_name, create_catalog_dir, write_catalog, write_iteration_data,
        write_results, WriteError,
    },
    raster::{MapVersion, SkyMaps},
    region::{Region, SkyRegion},
    scintillation::ScintillationModel,
    survey::{
        run_indexed_iteration, IterationSummary, SurveyConfiguration, SurveyError, SurveySummary,
    },
    PROGRESS_BARS,
};

/// Where the survey reports go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReportFiles {
    /// One row per iteration.
    pub(crate) data: PathBuf,

    /// The averaged results.
    pub(crate) results: PathBuf,
}

/// Parameters needed to simulate a survey.
pub(crate) struct SimulateParams {
    pub(crate) config: SurveyConfiguration,
    pub(crate) maps: SkyMaps,
    pub(crate) map_version: MapVersion,

    /// \[m/s\]
    pub(crate) velocity: f64,

    pub(crate) region: SkyRegion,

    /// Used to name catalog files.
    pub(crate) region_name: String,

    /// Iteration `i` uses the seed `base_seed + i`.
    pub(crate) base_seed: u64,

    /// If not set, rayon's global thread pool is used.
    pub(crate) num_threads: Option<usize>,

    pub(crate) outputs: Option<ReportFiles>,
    pub(crate) catalog_dir: Option<PathBuf>,
    pub(crate) fig: Option<PathBuf>,
}

/// The per-iteration summaries of a survey and their average.
#[derive(Debug, Clone)]
pub(crate) struct SimulateResults {
    pub(crate) iterations: Vec<IterationSummary>,
    pub(crate) summary: SurveySummary,
}

impl SimulateParams {
    pub(crate) fn run(&self) -> Result<SimulateResults, SimulateError> {
        let SimulateParams {
            config,
            maps,
            map_version,
            velocity,
            region,
            region_name,
            base_seed,
            num_threads,
            outputs,
            catalog_dir,
            fig,
        } = self;

        let model = ScintillationModel::new(maps, config.freq, *velocity);
        if let Some(dir) = catalog_dir {
            create_catalog_dir(dir)?;
        }

        let progress = ProgressBar::with_draw_target(
            Some(config.num_iterations as _),
            if PROGRESS_BARS.load() {
                ProgressDrawTarget::stdout()
            } else {
                ProgressDrawTarget::hidden()
            },
        )
        .with_style(
            ProgressStyle::default_bar()
                .template("{msg:17}: [{wide_bar:.blue}] {pos:3}/{len:3} iterations ({elapsed_precise}<{eta_precise})")
                .unwrap()
                .progress_chars("=> "),
        )
        .with_position(0)
        .with_message("Simulating");

        // Each iteration is independent, so they can be run in any order.
        // Catalogs are written as soon as an iteration finishes, so that only
        // the summaries need to be kept.
        let run_all = || -> Result<Vec<IterationSummary>, SimulateError> {
            (0..config.num_iterations)
                .into_par_iter()
                .progress_with(progress.clone())
                .map(|i| -> Result<IterationSummary, SimulateError> {
                    let result = run_indexed_iteration(config, &model, region, *base_seed, i)?;
                    if let Some(dir) = catalog_dir {
                        let file = dir.join(catalog_file_name(
                            region_name,
                            map_version.number(),
                            i + 1,
                        ));
                        write_catalog(&file, &result.records)?;
                    }
                    Ok(result.summary())
                })
                .collect()
        };
        let iterations = match num_threads {
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(*n)
                .build()
                .map_err(|e| SimulateError::ThreadPool(e.to_string()))?
                .install(run_all)?,
            None => run_all()?,
        };
        progress.abandon_with_message("Finished");

        let summary = SurveySummary::new(&iterations, region.area(true));
        debug!("{summary:#?}");

        match outputs {
            Some(ReportFiles { data, results }) => {
                write_iteration_data(data, &iterations)?;
                let params = [
                    (
                        "Lower Flux Limit (Jy)",
                        config.flux_distribution.low.to_string(),
                    ),
                    (
                        "Upper Flux Limit (Jy)",
                        config.flux_distribution.upp.to_string(),
                    ),
                    (
                        "Observation time (days)",
                        (config.obs_time / SECONDS_PER_DAY).to_string(),
                    ),
                    ("Frequency (MHz)", (config.freq / 1e6).to_string()),
                    ("Modulation Cutoff", config.mod_cutoff.to_string()),
                    ("Velocity (km/s)", (velocity / 1e3).to_string()),
                    ("Map Version", map_version.number().to_string()),
                    ("Region", region_name.clone()),
                    ("Seed", base_seed.to_string()),
                ];
                write_results(results, &summary, &params)?;
                info!("Wrote {} and {}", data.display(), results.display());
            }
            None => log_summary(&iterations, &summary),
        }

        if let Some(fig) = fig {
            #[cfg(feature = "plotting")]
            {
                crate::survey::plot::plot_areal_densities(fig, &iterations)?;
                info!("Wrote {}", fig.display());
            }
            // Without plotting, the CLI refuses to get this far.
            #[cfg(not(feature = "plotting"))]
            debug!("Not plotting {}", fig.display());
        }

        Ok(SimulateResults {
            iterations,
            summary,
        })
    }
}

fn log_summary(iterations: &[IterationSummary], summary: &SurveySummary) {
    let mut printer = InfoPrinter::new("Results".into());
    printer.push_line(
        format!(
            "Areal sky densities: [{}]",
            iterations.iter().map(|s| s.areal_density).join(", ")
        )
        .into(),
    );
    printer.push_block(vec![
        format!(
            "Avg areal sky density:            {} ± {} deg⁻²",
            summary.areal_density.mean, summary.areal_density.std
        )
        .into(),
        format!(
            "Avg detectable areal sky density: {} ± {} deg⁻²",
            summary.detectable_density.mean, summary.detectable_density.std
        )
        .into(),
    ]);
    printer.push_block(vec![
        format!("Iterations:    {}", summary.num_iterations).into(),
        format!("Num sources:   {}", summary.avg_num_sources).into(),
        format!("Area:          {} deg²", summary.area).into(),
        format!("Num variable:  {}", summary.avg_variables).into(),
        format!("Normalisation: {}", summary.avg_normalisation).into(),
    ]);
    printer.display();
}

#[derive(Error, Debug)]
pub(crate) enum SimulateError {
    #[error(transparent)]
    Survey(#[from] SurveyError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[cfg(feature = "plotting")]
    #[error(transparent)]
    Draw(#[from] crate::survey::plot::DrawError),

    #[error("Couldn't create a thread pool: {0}")]
    ThreadPool(String),
}
