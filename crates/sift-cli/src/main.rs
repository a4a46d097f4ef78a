mod commands;
mod logging;
mod progress;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use commands::{
    Cli, Commands, CreateFileListArgs, FlattenDirectoryArgs, MoveDuplicatesArgs,
};
use dotenv::dotenv;
use progress::CliReporter;
use sift_core::{AppConfig, ScanEngine};
use std::process::ExitCode;
use tracing::{error, info};

fn main() -> ExitCode {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match sift_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::CreateFileList(args)) => run_create_file_list(config, args),
        Some(Commands::MoveDuplicates(args)) => run_move_duplicates(args),
        Some(Commands::FlattenDirectory(args)) => run_flatten_directory(&config, args),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_create_file_list(config: AppConfig, args: CreateFileListArgs) -> anyhow::Result<()> {
    let config = match args.workers {
        Some(workers) => config.with_workers(workers as usize),
        None => config,
    };
    info!("Using {} workers", config.workers);

    let engine = ScanEngine::new(config);
    let reporter = CliReporter::new();
    engine
        .create_file_list(&args.directory, &args.output_manifest, &reporter)
        .with_context(|| {
            format!(
                "creating file list for '{}'",
                args.directory.display()
            )
        })?;
    Ok(())
}

fn run_move_duplicates(args: MoveDuplicatesArgs) -> anyhow::Result<()> {
    let reporter = CliReporter::new();
    sift_core::move_duplicates(&args.input_manifest, &args.duplicates_dir, &reporter)
        .with_context(|| {
            format!(
                "moving duplicates listed in '{}'",
                args.input_manifest.display()
            )
        })?;
    Ok(())
}

fn run_flatten_directory(config: &AppConfig, args: FlattenDirectoryArgs) -> anyhow::Result<()> {
    let reporter = CliReporter::new();
    sift_core::flatten_directory(&args.target_dir, config.follow_symlinks, &reporter)
        .with_context(|| format!("flattening '{}'", args.target_dir.display()))?;
    Ok(())
}
