//! Reporting: run summaries and the computed shock table.

pub mod format;

pub use format::*;
