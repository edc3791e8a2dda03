//! Format rules (`format_rules.json`).
//!
//! ```json
//! {
//!   "rules": {
//!     "default": { "shock_format": "percent" },
//!     "M21": { "extreme_format_up": "bps_signed", "extreme_wrap_up": "parens" }
//!   }
//! }
//! ```
//!
//! The file is optional. When it does not exist the rule set is empty and
//! formatting leaves every value numeric.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;

/// Rule key used when an indicator has no rule of its own.
pub const DEFAULT_RULE_KEY: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShockFormat {
    /// `round(v * 100, 1)` followed by ` %`.
    Percent,
    /// `round(v * 100, 1)` followed by `%`.
    PercentCompact,
    /// `round(v, 1)` followed by `%`.
    PercentCompactRaw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremeFormat {
    Ppts,
    PptsSigned,
    Percent,
    Bps,
    BpsSigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremeWrap {
    Parens,
}

/// One entry of the rules table.
///
/// Plain fields apply to every scenario; `_up` / `_other` fields apply to
/// up-directed and other scenarios respectively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatRule {
    pub shock_format: Option<ShockFormat>,
    pub shock_suffix: Option<String>,
    pub extreme_format: Option<ExtremeFormat>,
    pub extreme_wrap: Option<ExtremeWrap>,

    pub shock_format_up: Option<ShockFormat>,
    pub shock_format_other: Option<ShockFormat>,
    pub shock_suffix_up: Option<String>,
    pub shock_suffix_other: Option<String>,
    pub extreme_format_up: Option<ExtremeFormat>,
    pub extreme_format_other: Option<ExtremeFormat>,
    pub extreme_wrap_up: Option<ExtremeWrap>,
    pub extreme_wrap_other: Option<ExtremeWrap>,
}

impl FormatRule {
    /// True if any of the eight directional fields is set.
    pub fn is_directional(&self) -> bool {
        self.shock_format_up.is_some()
            || self.shock_format_other.is_some()
            || self.shock_suffix_up.is_some()
            || self.shock_suffix_other.is_some()
            || self.extreme_format_up.is_some()
            || self.extreme_format_other.is_some()
            || self.extreme_wrap_up.is_some()
            || self.extreme_wrap_other.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    rules: HashMap<String, FormatRule>,
}

/// Rules keyed by indicator, plus the optional `default` rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    default: Option<FormatRule>,
    by_indicator: HashMap<String, FormatRule>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_rules(mut rules: HashMap<String, FormatRule>) -> Self {
        let default = rules.remove(DEFAULT_RULE_KEY);
        Self {
            default,
            by_indicator: rules,
        }
    }

    /// Indicator-specific rule, else the default rule.
    pub fn rule_for(&self, indicator: &str) -> Option<&FormatRule> {
        self.by_indicator.get(indicator).or(self.default.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_indicator.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_indicator.len() + usize::from(self.default.is_some())
    }
}

/// Load the rules table, treating a missing file as an empty rule set.
pub fn load_rules(path: &Path) -> Result<RuleSet, AppError> {
    if !path.exists() {
        return Ok(RuleSet::empty());
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::config(format!("Failed to read format rules '{}': {e}", path.display())))?;
    parse_rules(&text)
}

pub fn parse_rules(text: &str) -> Result<RuleSet, AppError> {
    let file: RulesFile = serde_json::from_str(text)
        .map_err(|e| AppError::config(format!("Invalid format rules: {e}")))?;
    Ok(RuleSet::from_rules(file.rules))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_rule_wins_over_default() {
        let rules = parse_rules(
            r#"{"rules": {
                "default": {"shock_format": "percent"},
                "M21": {"extreme_format_up": "bps_signed", "extreme_wrap_up": "parens"}
            }}"#,
        )
        .unwrap();
        assert_eq!(rules.len(), 2);
        let m21 = rules.rule_for("M21").unwrap();
        assert!(m21.is_directional());
        assert_eq!(m21.extreme_format_up, Some(ExtremeFormat::BpsSigned));
        let m1 = rules.rule_for("M1").unwrap();
        assert!(!m1.is_directional());
        assert_eq!(m1.shock_format, Some(ShockFormat::Percent));
    }

    #[test]
    fn no_default_means_no_rule() {
        let rules = parse_rules(r#"{"rules": {"M1": {"shock_suffix": " pp"}}}"#).unwrap();
        assert!(rules.rule_for("M2").is_none());
    }

    #[test]
    fn unknown_kinds_and_fields_are_rejected() {
        assert!(parse_rules(r#"{"rules": {"M1": {"shock_format": "permille"}}}"#).is_err());
        assert!(parse_rules(r#"{"rules": {"M1": {"shock_fmt": "percent"}}}"#).is_err());
    }

    #[test]
    fn missing_file_is_empty() {
        let rules = load_rules(Path::new("does/not/exist/format_rules.json")).unwrap();
        assert!(rules.is_empty());
    }
}
