use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{LevelFilter, debug};
use nest2d::NestControl;
use thousands::Separable;

/// Nests the items of a JSON instance into its bins and writes the solution as JSON
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Instance to nest: bin, spacing and items
    #[arg(short, long, value_name = "FILE")]
    pub input_file: PathBuf,
    /// Folder receiving `sol_{instance}.json`, created if missing
    #[arg(short, long, value_name = "FOLDER")]
    pub solution_folder: PathBuf,
    /// `NestConfig` as JSON, defaults are used for missing fields
    #[arg(short, long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
    /// Overrides the spacing between items given by the instance
    #[arg(long, value_name = "DISTANCE")]
    pub spacing: Option<f64>,
    /// Stops the run after this many seconds and writes the partial result
    #[arg(short, long, value_name = "SECONDS")]
    pub time_limit: Option<u64>,
    #[arg(
        short,
        long,
        value_name = "[off, error, warn, info, debug, trace]",
        default_value = "info"
    )]
    pub log_level: LevelFilter,
}

impl Cli {
    /// Spacing of the run: the override if given, otherwise the one of the instance
    pub fn spacing(&self, instance_spacing: f64) -> f64 {
        self.spacing.unwrap_or(instance_spacing)
    }

    /// Control reporting progress at debug level, stopping at the time limit if one is set
    pub fn nest_control(&self) -> NestControl {
        let control = NestControl::new().with_progress(|remaining| {
            debug!("[MAIN] {} items remaining", remaining.separate_with_commas());
        });
        match self.time_limit {
            None => control,
            Some(secs) => {
                let deadline = Instant::now() + Duration::from_secs(secs);
                control.with_stop_condition(move || Instant::now() >= deadline)
            }
        }
    }
}
