//! Input/output helpers.
//!
//! - workbook sheet reading (`sheet`)
//! - join + period normalization (`assemble`)
//! - per-scenario result files (`export`)

pub mod assemble;
pub mod export;
pub mod sheet;

pub use assemble::*;
pub use export::*;
pub use sheet::*;
