//! Run configuration (`config.json`).
//!
//! The file is checked for every required key before it is deserialized, so
//! a config missing several keys reports all of them at once.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, join_sorted};

pub const REQUIRED_CONFIG_KEYS: [&str; 8] = [
    "mapping_excel",
    "data_excel",
    "mapping_sheet_name",
    "data_sheet_name",
    "group_rates_up_scenarios",
    "T0",
    "scen_start",
    "scen_end",
];

pub const DEFAULT_FORMAT_RULES_FILE: &str = "format_rules.json";

/// Parsed `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShockConfig {
    /// Workbook holding the indicator → display label mapping.
    pub mapping_excel: String,
    /// Workbook holding the scenario paths.
    pub data_excel: String,
    pub mapping_sheet_name: String,
    pub data_sheet_name: String,
    /// Scenarios for which the `rates` group takes the max-based formula.
    pub group_rates_up_scenarios: BTreeSet<String>,
    /// Baseline period label.
    #[serde(rename = "T0")]
    pub t0: String,
    pub scen_start: String,
    pub scen_end: String,
    /// File name of the format rules table inside the input directory.
    #[serde(default = "default_format_rules")]
    pub format_rules: String,
    /// Fail on indicators that belong to no group.
    #[serde(default)]
    pub strict_group_coverage: bool,
}

fn default_format_rules() -> String {
    DEFAULT_FORMAT_RULES_FILE.to_string()
}

/// Read and parse a config file.
pub fn load_config(path: &Path) -> Result<ShockConfig, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::config(format!("Failed to read config '{}': {e}", path.display())))?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> Result<ShockConfig, AppError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| AppError::config(format!("Invalid config JSON: {e}")))?;

    let Some(object) = value.as_object() else {
        return Err(AppError::config("Config must be a JSON object."));
    };

    let missing: Vec<&str> = REQUIRED_CONFIG_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::config(format!(
            "Missing required config keys: {}",
            join_sorted(missing)
        )));
    }

    serde_json::from_value(value).map_err(|e| AppError::config(format!("Invalid config: {e}")))
}
