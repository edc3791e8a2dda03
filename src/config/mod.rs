//! JSON configuration loaders.
//!
//! - run settings (`settings`)
//! - group membership (`groups`)
//! - optional format rules (`rules`)

pub mod groups;
pub mod rules;
pub mod settings;

pub use groups::*;
pub use rules::*;
pub use settings::*;
