//! Command-line parsing for the path → shock calculator.
//!
//! Parsing and dispatch live here and in `app`; the calculation code never
//! sees clap types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::app::pipeline::RunOptions;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "path2shock", version, about = "Scenario path to shock calculator")]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute shocks and write one result file per scenario (default).
    Run(RunArgs),
    /// Load and validate all inputs without computing or writing anything.
    Check(RunArgs),
}

/// Options shared by `run` and `check`.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Directory holding config.json, groups.json, format rules and workbooks.
    #[arg(long, default_value = "input")]
    pub input_dir: PathBuf,

    /// Directory receiving path2shock_<scenario>.xlsx files.
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Config file (default: <input-dir>/config.json).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Group membership file (default: <input-dir>/groups.json).
    #[arg(long)]
    pub groups: Option<PathBuf>,

    /// Mapping workbook name, overriding `mapping_excel`.
    #[arg(long)]
    pub mapping: Option<String>,

    /// Path workbook name, overriding `data_excel`.
    #[arg(long)]
    pub data: Option<String>,

    /// Baseline period, overriding `T0`.
    #[arg(long)]
    pub t0: Option<String>,

    /// First scenario period, overriding `scen_start`.
    #[arg(long)]
    pub scen_start: Option<String>,

    /// Last scenario period, overriding `scen_end`.
    #[arg(long)]
    pub scen_end: Option<String>,

    /// Print the computed shock table after the summary.
    #[arg(long)]
    pub print: bool,
}

impl RunArgs {
    pub fn to_options(&self) -> RunOptions {
        RunOptions {
            input_dir: self.input_dir.clone(),
            output_dir: self.output_dir.clone(),
            config_file: self.config.clone(),
            groups_file: self.groups.clone(),
            mapping_source: self.mapping.clone(),
            data_source: self.data.clone(),
            t0: self.t0.clone(),
            scen_start: self.scen_start.clone(),
            scen_end: self.scen_end.clone(),
        }
    }
}
