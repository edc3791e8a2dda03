//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - runs the pipeline
//! - prints the run summary

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, RunArgs};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `path2shock` binary.
pub fn run() -> Result<(), AppError> {
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    init_logging(cli.verbose);

    match cli.command {
        Command::Run(args) => handle_run(&args),
        Command::Check(args) => handle_check(&args),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "path2shock=debug" } else { "path2shock=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_run(args: &RunArgs) -> Result<(), AppError> {
    let output = pipeline::run_path2shock(&args.to_options())?;

    println!("{}", crate::report::format_run_summary(&output));
    if args.print {
        println!("{}", crate::report::format_shock_table(&output.table));
    }
    Ok(())
}

fn handle_check(args: &RunArgs) -> Result<(), AppError> {
    let prepared = pipeline::check_inputs(&args.to_options())?;
    println!("{}", crate::report::format_check_summary(&prepared));
    Ok(())
}

/// Rewrite argv so `path2shock` defaults to `path2shock run`.
///
/// Rules:
/// - `path2shock`                     -> `path2shock run`
/// - `path2shock --t0 2025Q4 ...`     -> `path2shock run --t0 2025Q4 ...`
/// - `path2shock --help/--version/-h` -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "check");
    if is_subcommand {
        return argv;
    }

    // A leading global flag may precede the subcommand.
    if matches!(arg1.as_str(), "-v" | "--verbose") {
        if let Some(arg2) = argv.get(2) {
            if matches!(arg2.as_str(), "run" | "check") {
                return argv;
            }
        }
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }
    argv
}
