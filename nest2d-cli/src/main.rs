use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::{info, warn};
use nest2d::io::{export, import};
use nest2d::NestConfig;
use nest2d_cli::io;
use nest2d_cli::io::cli::Cli;
use nest2d_cli::io::output::NestOutput;
use thousands::Separable;

fn main() -> Result<()> {
    let args = Cli::parse();
    io::init_logger(args.log_level)?;

    let config = match &args.config_file {
        None => {
            warn!("[MAIN] No config file provided, use --config-file to provide a custom config");
            NestConfig::default()
        }
        Some(config_file) => {
            let file = File::open(config_file)?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).context("incorrect config file format")?
        }
    };

    info!("Successfully parsed NestConfig: {config:?}");

    let input_stem = args
        .input_file
        .file_stem()
        .and_then(|s| s.to_str())
        .context("input file has no valid name")?;

    if !args.solution_folder.exists() {
        fs::create_dir_all(&args.solution_folder).with_context(|| {
            format!(
                "could not create solution folder: {}",
                args.solution_folder.display()
            )
        })?;
    }

    let ext_instance = io::read_instance(args.input_file.as_path())?;
    let (bin, spacing, mut items) = import::import_instance(&ext_instance)?;
    info!(
        "[MAIN] instance {} imported: {} items",
        ext_instance.name,
        items.len().separate_with_commas()
    );

    let spacing = args.spacing(spacing);
    if args.spacing.is_some() {
        info!("[MAIN] spacing overridden to {spacing}");
    }
    let pack_group = nest2d::nest(&mut items, &bin, spacing, &config, &args.nest_control())?;
    let solution = export::export_solution(&items, &bin, &pack_group);
    info!(
        "[MAIN] {} bins used, density {:.3}%, {} unresolved",
        solution.n_bins,
        solution.density * 100.0,
        solution.unresolved.len().separate_with_commas()
    );

    let output = NestOutput {
        instance: ext_instance,
        solution,
        config,
    };
    let solution_path = args.solution_folder.join(format!("sol_{input_stem}.json"));
    io::write_json(&output, Path::new(&solution_path))?;

    Ok(())
}
