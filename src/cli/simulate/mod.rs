// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Simulate the areal sky density of scintillating sources in a survey.


use std::{path::PathBuf, time::Duration};

use clap::Parser;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::common::{
    display_warnings, InfoPrinter, SkyMapArgs, ARG_FILE_HELP, FREQ_HELP, VELOCITY_HELP,
};
use crate::{
    constants::*,
    io::write::{can_write_to_file, report_file_names, REPORT_FORMATS_COMMA_SEPARATED},
    params::{ReportFiles, SimulateParams},
    population::{FluxDistribution, SamplingLimits},
    region::{Region, SkyRegion},
    survey::{SurveyConfiguration, SurveyError, WindowRescale},
    VarskyError,
};

lazy_static::lazy_static! {
    static ref UPP_FLUX_HELP: String =
        format!("The upper flux-density limit of the survey [Jy]. Default: {DEFAULT_UPPER_FLUX_LIMIT}");

    static ref LOW_FLUX_HELP: String =
        format!("The lower flux-density limit of the survey [Jy]. Sources with modulated flux densities above a fifth of this are detectably variable. Default: {DEFAULT_LOWER_FLUX_LIMIT}");

    static ref MOD_CUTOFF_HELP: String =
        format!("Sources with a modulation index at least this large are variable. Default: {DEFAULT_MOD_CUTOFF}");

    static ref OBS_TIME_HELP: String =
        format!("The length of the observing campaign [days]. Modulation indices of sources that vary more slowly than this are reduced. Default: {DEFAULT_OBS_TIME_DAYS}");

    static ref NORMALISATION_HELP: String =
        format!("The normalisation of the differential source counts, dN/dS = a S^-{DEFAULT_COUNTS_INDEX}. Default: {DEFAULT_COUNTS_NORMALISATION}");

    static ref NUM_ITERATIONS_HELP: String =
        format!("The number of Monte Carlo iterations. Default: {DEFAULT_NUM_ITERATIONS}");

    static ref MAX_CALIBRATION_STEPS_HELP: String =
        format!("The maximum number of adjustments to the source-count normalisation when matching --num-sources. Default: {DEFAULT_MAX_CALIBRATION_STEPS}");

    static ref MAX_REGION_ROUNDS_HELP: String =
        format!("The maximum number of rounds of drawing positions within the region. Default: {DEFAULT_MAX_REGION_ROUNDS}");

    static ref OUT_HELP: String =
        format!("Write per-iteration data to <stem>_data.<ext> and averaged results to <stem>_results.<ext>. Supported formats: {}. If not given, the results are only logged", *REPORT_FORMATS_COMMA_SEPARATED);
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SimulateCliArgs {
    /// The survey region file (toml or json), containing spherical caps and
    /// RA/Dec boxes.
    #[clap(short, long, help_heading = "SURVEY")]
    pub(super) region: Option<PathBuf>,

    #[clap(long, help = UPP_FLUX_HELP.as_str(), help_heading = "SURVEY")]
    pub(super) upp_flux: Option<f64>,

    #[clap(long, help = LOW_FLUX_HELP.as_str(), help_heading = "SURVEY")]
    pub(super) low_flux: Option<f64>,

    #[clap(long, help = MOD_CUTOFF_HELP.as_str(), help_heading = "SURVEY")]
    pub(super) mod_cutoff: Option<f64>,

    #[clap(short = 't', long, help = OBS_TIME_HELP.as_str(), help_heading = "SURVEY")]
    pub(super) obs_time: Option<f64>,

    #[clap(short = 'f', long, help = FREQ_HELP.as_str(), help_heading = "SURVEY")]
    pub(super) freq: Option<f64>,

    #[clap(short = 'a', long, help = NORMALISATION_HELP.as_str(), help_heading = "SOURCE POPULATION")]
    pub(super) normalisation: Option<f64>,

    /// Calibrate the source-count normalisation so that each iteration has
    /// this many sources (to within 1%).
    #[clap(short = 'n', long, help_heading = "SOURCE POPULATION")]
    pub(super) num_sources: Option<usize>,

    #[clap(long, help = VELOCITY_HELP.as_str(), help_heading = "SCINTILLATION")]
    pub(super) velocity: Option<f64>,

    /// Limit the modulation of every source by the observation time. By
    /// default, the final source of each iteration is not limited.
    #[clap(long, help_heading = "SCINTILLATION")]
    #[serde(default)]
    pub(super) rescale_all_sources: bool,

    #[clap(short = 'i', long, help = NUM_ITERATIONS_HELP.as_str(), help_heading = "MONTE CARLO")]
    pub(super) iterations: Option<usize>,

    /// The random seed of the first iteration; iteration i uses seed + i. If
    /// not given, a seed is chosen at random (and reported).
    #[clap(long, help_heading = "MONTE CARLO")]
    pub(super) seed: Option<u64>,

    /// The number of threads used to run iterations. Default: the number of
    /// CPU cores.
    #[clap(long, help_heading = "MONTE CARLO")]
    pub(super) num_threads: Option<usize>,

    #[clap(long, help = MAX_CALIBRATION_STEPS_HELP.as_str(), help_heading = "MONTE CARLO")]
    pub(super) max_calibration_steps: Option<usize>,

    #[clap(long, help = MAX_REGION_ROUNDS_HELP.as_str(), help_heading = "MONTE CARLO")]
    pub(super) max_region_rounds: Option<usize>,

    /// Give up on any iteration that takes longer than this [seconds].
    #[clap(long, help_heading = "MONTE CARLO")]
    pub(super) iteration_timeout: Option<f64>,

    #[clap(short = 'o', long, help = OUT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) out: Option<PathBuf>,

    /// Write a catalog of every source of every iteration into this
    /// directory.
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) catalog_dir: Option<PathBuf>,

    /// Plot the areal sky density of each iteration to this PNG file. Only
    /// available if compiled with the "plotting" feature.
    #[clap(long, help_heading = "OUTPUT FILES")]
    pub(super) fig: Option<PathBuf>,
}

impl SimulateCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            region: self.region.or(other.region),
            upp_flux: self.upp_flux.or(other.upp_flux),
            low_flux: self.low_flux.or(other.low_flux),
            mod_cutoff: self.mod_cutoff.or(other.mod_cutoff),
            obs_time: self.obs_time.or(other.obs_time),
            freq: self.freq.or(other.freq),
            normalisation: self.normalisation.or(other.normalisation),
            num_sources: self.num_sources.or(other.num_sources),
            velocity: self.velocity.or(other.velocity),
            rescale_all_sources: self.rescale_all_sources || other.rescale_all_sources,
            iterations: self.iterations.or(other.iterations),
            seed: self.seed.or(other.seed),
            num_threads: self.num_threads.or(other.num_threads),
            max_calibration_steps: self.max_calibration_steps.or(other.max_calibration_steps),
            max_region_rounds: self.max_region_rounds.or(other.max_region_rounds),
            iteration_timeout: self.iteration_timeout.or(other.iteration_timeout),
            out: self.out.or(other.out),
            catalog_dir: self.catalog_dir.or(other.catalog_dir),
            fig: self.fig.or(other.fig),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SimulateArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "maps")]
    #[serde(default)]
    pub(super) map_args: SkyMapArgs,

    #[clap(flatten)]
    #[serde(rename = "simulate")]
    #[serde(default)]
    pub(super) simulate_args: SimulateCliArgs,
}

impl SimulateArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<SimulateArgs, VarskyError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let SimulateArgs {
                args_file: _,
                map_args,
                simulate_args,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(SimulateArgs {
                args_file: None,
                map_args: cli_args.map_args.merge(map_args),
                simulate_args: cli_args.simulate_args.merge(simulate_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn parse(self) -> Result<SimulateParams, VarskyError> {
        debug!("{:#?}", self);

        // Expose all the struct fields to ensure they're all used.
        let SimulateArgs {
            args_file: _,
            map_args,
            simulate_args:
                SimulateCliArgs {
                    region,
                    upp_flux,
                    low_flux,
                    mod_cutoff,
                    obs_time,
                    freq,
                    normalisation,
                    num_sources,
                    velocity,
                    rescale_all_sources,
                    iterations,
                    seed,
                    num_threads,
                    max_calibration_steps,
                    max_region_rounds,
                    iteration_timeout,
                    out,
                    catalog_dir,
                    fig,
                },
        } = self;

        // The region.
        let region_file = region.ok_or(SimulateArgsError::NoRegion)?;
        let region = SkyRegion::read(&region_file)?;
        let region_name = region_file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("region")
            .to_string();
        let area = region.area(true);
        let mut region_printer = InfoPrinter::new("Survey region".into());
        region_printer.push_line(format!("{}", region_file.display()).into());
        region_printer.push_block(vec![
            format!("{} shapes", region.shapes().len()).into(),
            format!("Area: {area:.4} deg²").into(),
        ]);
        region_printer.display();

        // The flux distribution and survey.
        let flux_distribution = FluxDistribution::new(
            normalisation.unwrap_or(DEFAULT_COUNTS_NORMALISATION),
            low_flux.unwrap_or(DEFAULT_LOWER_FLUX_LIMIT),
            upp_flux.unwrap_or(DEFAULT_UPPER_FLUX_LIMIT),
        )?;
        let freq_mhz = freq.unwrap_or(DEFAULT_FREQ_MHZ);
        let obs_time_days = obs_time.unwrap_or(DEFAULT_OBS_TIME_DAYS);
        let velocity = velocity.map(|v| v * 1e3).unwrap_or(DEFAULT_SCREEN_VELOCITY);
        if !(velocity.is_finite() && velocity > 0.0) {
            return Err(SurveyError::InvalidVelocity(velocity).into());
        }
        let iteration_timeout = match iteration_timeout {
            Some(t) if t.is_finite() && t > 0.0 => Some(
                Duration::try_from_secs_f64(t)
                    .map_err(|_| SimulateArgsError::TimeoutTooLarge(t))?,
            ),
            Some(t) => {
                return Err(SimulateArgsError::NonPositive {
                    arg: "--iteration-timeout",
                    value: t,
                }
                .into())
            }
            None => None,
        };
        let config = SurveyConfiguration {
            freq: freq_mhz * 1e6,
            mod_cutoff: mod_cutoff.unwrap_or(DEFAULT_MOD_CUTOFF),
            flux_distribution,
            target_count: num_sources,
            obs_time: obs_time_days * SECONDS_PER_DAY,
            num_iterations: iterations.unwrap_or(DEFAULT_NUM_ITERATIONS),
            window_rescale: if rescale_all_sources {
                WindowRescale::All
            } else {
                WindowRescale::AllButLast
            },
            limits: SamplingLimits {
                max_calibration_steps: max_calibration_steps
                    .unwrap_or(DEFAULT_MAX_CALIBRATION_STEPS),
                max_region_rounds: max_region_rounds.unwrap_or(DEFAULT_MAX_REGION_ROUNDS),
            },
            iteration_timeout,
        };
        config.validate()?;

        let mut survey_printer = InfoPrinter::new("Survey".into());
        survey_printer.push_block(vec![
            format!("Frequency:         {freq_mhz} MHz").into(),
            format!("Observation time:  {obs_time_days} days").into(),
            format!("Modulation cutoff: {}", config.mod_cutoff).into(),
            format!("Screen velocity:   {} km/s", velocity / 1e3).into(),
        ]);
        survey_printer.push_block(vec![
            format!(
                "Flux limits: {} to {} Jy",
                flux_distribution.low, flux_distribution.upp
            )
            .into(),
            format!(
                "Source counts: dN/dS = {} S^-{}",
                flux_distribution.a, flux_distribution.b
            )
            .into(),
        ]);
        match config.target_count {
            Some(n) => survey_printer
                .push_line(format!("Calibrating to {n} sources per iteration").into()),
            None => survey_printer.push_line(
                format!(
                    "Expecting {} sources per iteration",
                    flux_distribution.expected_count(region.area(false))
                )
                .into(),
            ),
        }
        if rescale_all_sources {
            survey_printer.push_line("Limiting the modulation of all sources".into());
        }
        survey_printer.display();

        // Monte Carlo.
        if num_threads == Some(0) {
            return Err(SimulateArgsError::ZeroThreads.into());
        }
        let base_seed = seed.unwrap_or_else(rand::random);
        let mut mc_printer = InfoPrinter::new("Monte Carlo".into());
        mc_printer.push_line(format!("{} iterations", config.num_iterations).into());
        mc_printer.push_line(
            format!(
                "Base seed: {base_seed}{}",
                if seed.is_none() { " (random)" } else { "" }
            )
            .into(),
        );
        if let Some(n) = num_threads {
            mc_printer.push_line(format!("Using {n} threads").into());
        }
        if let Some(t) = iteration_timeout {
            mc_printer.push_line(format!("Iteration timeout: {:.3} s", t.as_secs_f64()).into());
        }
        mc_printer.display();

        // Outputs.
        let outputs = match out {
            Some(out) => {
                let (data, results) = report_file_names(&out)?;
                can_write_to_file(&data)?;
                can_write_to_file(&results)?;
                Some(ReportFiles { data, results })
            }
            None => None,
        };
        if let Some(fig) = fig.as_ref() {
            if cfg!(not(feature = "plotting")) {
                return Err(SimulateArgsError::NoPlottingFeature.into());
            }
            can_write_to_file(fig)?;
        }
        let mut output_printer = InfoPrinter::new("Outputs".into());
        match outputs.as_ref() {
            Some(ReportFiles { data, results }) => output_printer.push_block(vec![
                format!("Per-iteration data: {}", data.display()).into(),
                format!("Averaged results:   {}", results.display()).into(),
            ]),
            None => output_printer.push_line("Results are only logged".into()),
        }
        if let Some(dir) = catalog_dir.as_ref() {
            output_printer.push_line(format!("Catalogs into {}", dir.display()).into());
        }
        if let Some(fig) = fig.as_ref() {
            output_printer.push_line(format!("Figure: {}", fig.display()).into());
        }
        output_printer.display();

        // Reading the rasters is the most expensive part of parsing; do it
        // last so that argument problems are reported quickly.
        let (map_version, maps) = map_args.parse()?;

        display_warnings();

        Ok(SimulateParams {
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
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), VarskyError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub(super) enum SimulateArgsError {
    #[error("No survey region was supplied (--region)")]
    NoRegion,

    #[error("{arg} must be positive; got {value}")]
    NonPositive { arg: &'static str, value: f64 },

    #[error("--iteration-timeout is too large; got {0} s")]
    TimeoutTooLarge(f64),

    #[error("The number of threads cannot be 0")]
    ZeroThreads,

    #[error("A figure was requested, but varsky was not compiled with the \"plotting\" feature")]
    NoPlottingFeature,
}
