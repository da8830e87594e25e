mod app;
mod cli;
mod config;
mod effects;
mod render;

use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use surefact_logging::{sf_error, LogDestination};

use crate::cli::Args;
use crate::config::AppConfig;

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    let destination = match &args.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    surefact_logging::initialize(destination, level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            sf_error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let outcome = app::run(
        &args.topic(),
        config.stream_settings(args),
        config.output_dir(args),
    )?;

    match (outcome.report, outcome.artifact_received) {
        (Some(path), _) => println!("Report written to {}", path.display()),
        (None, true) => anyhow::bail!("report could not be written"),
        (None, false) => println!("Job finished without a report."),
    }
    Ok(())
}
