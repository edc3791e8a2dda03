//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the indicator classification (`Group`, `Direction`)
//! - joined observation rows and the computed table (`ObservationRow`, `ShockTable`)
//! - the tagged computed cell (`FieldValue`)

pub mod types;

pub use types::*;
