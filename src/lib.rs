//! `path2shock` library crate.
//!
//! Turns scenario paths of economic indicators into shocks and extreme
//! levels, one result table per scenario. The binary (`path2shock`) is a thin
//! wrapper around this library so that:
//!
//! - the calculation and formatting engines are testable without files
//! - the pipeline can be called with overrides from other code
//!
//! Entry point: [`app::pipeline::run_path2shock`].

pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod format;
pub mod io;
pub mod report;
pub mod shock;
pub mod validate;

pub use app::pipeline::{RunOptions, RunOutput, check_inputs, run_path2shock};
pub use error::AppError;
