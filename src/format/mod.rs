//! Format rule engine: numeric `shock` / `extreme_level` → display text.
//!
//! Order per field: shock format then suffix, extreme format then wrap.
//! Unset values stay unset through every step. Text values are never
//! re-formatted; only a suffix or wrap is added to them.

use std::collections::BTreeSet;

use crate::config::{ExtremeFormat, ExtremeWrap, FormatRule, RuleSet, ShockFormat};
use crate::domain::{Direction, FieldValue, ShockTable, plain_number};

/// The sub-rule that applies to one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Formatting<'a> {
    pub shock_format: Option<ShockFormat>,
    pub shock_suffix: Option<&'a str>,
    pub extreme_format: Option<ExtremeFormat>,
    pub extreme_wrap: Option<ExtremeWrap>,
}

impl<'a> Formatting<'a> {
    /// Pick the directional combination when the rule has one; an unset
    /// directional field falls back to the plain field.
    pub fn resolve(rule: &'a FormatRule, direction: Direction) -> Self {
        let plain = Formatting {
            shock_format: rule.shock_format,
            shock_suffix: rule.shock_suffix.as_deref(),
            extreme_format: rule.extreme_format,
            extreme_wrap: rule.extreme_wrap,
        };
        if !rule.is_directional() {
            return plain;
        }

        let (shock_format, shock_suffix, extreme_format, extreme_wrap) = match direction {
            Direction::Up => (
                rule.shock_format_up,
                rule.shock_suffix_up.as_deref(),
                rule.extreme_format_up,
                rule.extreme_wrap_up,
            ),
            Direction::Other => (
                rule.shock_format_other,
                rule.shock_suffix_other.as_deref(),
                rule.extreme_format_other,
                rule.extreme_wrap_other,
            ),
        };
        Formatting {
            shock_format: shock_format.or(plain.shock_format),
            shock_suffix: shock_suffix.or(plain.shock_suffix),
            extreme_format: extreme_format.or(plain.extreme_format),
            extreme_wrap: extreme_wrap.or(plain.extreme_wrap),
        }
    }

    pub fn is_noop(&self) -> bool {
        *self == Formatting::default()
    }

    pub fn format_shock(&self, value: Option<FieldValue>) -> Option<FieldValue> {
        let mut value = value?;
        if let (Some(kind), Some(v)) = (self.shock_format, value.as_number()) {
            value = FieldValue::Text(render_shock(v, kind));
        }
        if let Some(suffix) = self.shock_suffix {
            value = FieldValue::Text(format!("{}{suffix}", value.render()));
        }
        Some(value)
    }

    pub fn format_extreme(&self, value: Option<FieldValue>) -> Option<FieldValue> {
        let mut value = value?;
        if let (Some(kind), Some(v)) = (self.extreme_format, value.as_number()) {
            value = FieldValue::Text(render_extreme(v, kind));
        }
        if let Some(ExtremeWrap::Parens) = self.extreme_wrap {
            value = FieldValue::Text(format!("({})", value.render()));
        }
        Some(value)
    }
}

pub fn render_shock(v: f64, kind: ShockFormat) -> String {
    match kind {
        ShockFormat::Percent => format!("{:.1} %", v * 100.0),
        ShockFormat::PercentCompact => format!("{:.1}%", v * 100.0),
        ShockFormat::PercentCompactRaw => format!("{v:.1}%"),
    }
}

/// Basis points in one unit of a fractional level (`0.0056` is 56 bps).
const BPS_PER_UNIT: f64 = 10_000.0;

pub fn render_extreme(v: f64, kind: ExtremeFormat) -> String {
    let sign = if v > 0.0 { "+" } else { "" };
    match kind {
        ExtremeFormat::Ppts => format!("{} ppts", plain_number(v)),
        ExtremeFormat::PptsSigned => format!("{sign}{} ppts", plain_number(v)),
        ExtremeFormat::Percent => format!("{:.1} %", v * 100.0),
        ExtremeFormat::Bps => format!("{:.0} bps", v * BPS_PER_UNIT),
        ExtremeFormat::BpsSigned => format!("{sign}{:.0} bps", v * BPS_PER_UNIT),
    }
}

/// Rewrite every row that has a matching rule. Returns the number of rows
/// a non-empty rule was applied to.
pub fn apply_format_rules(table: &mut ShockTable, rules: &RuleSet, up_scenarios: &BTreeSet<String>) -> usize {
    if rules.is_empty() {
        return 0;
    }

    let mut formatted = 0;
    for row in &mut table.rows {
        let Some(rule) = rules.rule_for(&row.indicator) else {
            continue;
        };
        let formatting = Formatting::resolve(rule, row.direction(up_scenarios));
        if formatting.is_noop() {
            continue;
        }
        row.shock = formatting.format_shock(row.shock.take());
        row.extreme_level = formatting.format_extreme(row.extreme_level.take());
        formatted += 1;
    }

    tracing::debug!(rows = formatted, rules = rules.len(), "applied format rules");
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_rules;
    use crate::domain::{ObservationRow, PeriodLayout};

    fn text(v: &Option<FieldValue>) -> Option<&str> {
        match v {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    #[test]
    fn shock_formats() {
        assert_eq!(render_shock(0.1234, ShockFormat::Percent), "12.3 %");
        assert_eq!(render_shock(-0.1, ShockFormat::PercentCompact), "-10.0%");
        assert_eq!(render_shock(2.345, ShockFormat::PercentCompactRaw), "2.3%");
    }

    #[test]
    fn extreme_formats() {
        assert_eq!(render_extreme(-0.0056, ExtremeFormat::BpsSigned), "-56 bps");
        assert_eq!(render_extreme(0.023, ExtremeFormat::Bps), "230 bps");
        assert_eq!(render_extreme(0.3, ExtremeFormat::PptsSigned), "+0.3 ppts");
        assert_eq!(render_extreme(0.0, ExtremeFormat::PptsSigned), "0.0 ppts");
        assert_eq!(render_extreme(-1.5, ExtremeFormat::Ppts), "-1.5 ppts");
        assert_eq!(render_extreme(0.021, ExtremeFormat::Percent), "2.1 %");
    }

    #[test]
    fn fractional_levels_render_in_basis_points() {
        assert_eq!(render_extreme(0.0056, ExtremeFormat::BpsSigned), "+56 bps");
        assert_eq!(render_extreme(0.0056, ExtremeFormat::Bps), "56 bps");
        assert_eq!(render_extreme(0.0, ExtremeFormat::BpsSigned), "0 bps");
    }

    #[test]
    fn suffix_follows_format_and_wrap_follows_extreme_format() {
        let rule: FormatRule = serde_json::from_str(
            r#"{"shock_format": "percent_compact", "shock_suffix": " y/y",
                "extreme_format": "ppts", "extreme_wrap": "parens"}"#,
        )
        .unwrap();
        let f = Formatting::resolve(&rule, Direction::Other);
        assert_eq!(
            f.format_shock(Some(FieldValue::Number(0.05))),
            Some(FieldValue::Text("5.0% y/y".to_string()))
        );
        assert_eq!(
            f.format_extreme(Some(FieldValue::Number(2.3))),
            Some(FieldValue::Text("(2.3 ppts)".to_string()))
        );
    }

    #[test]
    fn unset_values_stay_unset() {
        let rule: FormatRule = serde_json::from_str(
            r#"{"shock_format": "percent", "shock_suffix": "!", "extreme_format": "bps", "extreme_wrap": "parens"}"#,
        )
        .unwrap();
        let f = Formatting::resolve(&rule, Direction::Up);
        assert_eq!(f.format_shock(None), None);
        assert_eq!(f.format_extreme(None), None);
    }

    #[test]
    fn suffix_on_numeric_shock_uses_plain_form() {
        let rule: FormatRule = serde_json::from_str(r#"{"shock_suffix": " pts"}"#).unwrap();
        let f = Formatting::resolve(&rule, Direction::Up);
        assert_eq!(
            f.format_shock(Some(FieldValue::Number(10.0))),
            Some(FieldValue::Text("10.0 pts".to_string()))
        );
    }

    #[test]
    fn directional_rules_split_by_scenario() {
        let rules = parse_rules(
            r#"{"rules": {
                "default": {"shock_format": "percent"},
                "M21": {
                    "extreme_format_up": "bps_signed", "extreme_wrap_up": "parens",
                    "extreme_format_other": "ppts",
                    "shock_format": "percent_compact_raw"
                }
            }}"#,
        )
        .unwrap();
        let up: BTreeSet<String> = ["S1".to_string()].into_iter().collect();

        let make = |indicator: &str, scenario: &str, shock: f64, extreme: Option<f64>| {
            let mut row = ObservationRow::new(indicator, Some(scenario));
            row.shock = Some(FieldValue::Number(shock));
            row.extreme_level = extreme.map(FieldValue::Number);
            row
        };
        let mut table = ShockTable {
            periods: PeriodLayout {
                t0: "2025.4".to_string(),
                window: vec![],
                path: vec![],
            },
            rows: vec![
                make("M21", "S1", 0.3, Some(0.023)),
                make("M21", "S2", -0.5, Some(1.5)),
                make("M1", "S1", 0.1234, None),
            ],
        };

        let n = apply_format_rules(&mut table, &rules, &up);
        assert_eq!(n, 3);
        assert_eq!(text(&table.rows[0].extreme_level), Some("(+230 bps)"));
        assert_eq!(text(&table.rows[0].shock), Some("0.3%"));
        assert_eq!(text(&table.rows[1].extreme_level), Some("1.5 ppts"));
        assert_eq!(text(&table.rows[1].shock), Some("-0.5%"));
        assert_eq!(text(&table.rows[2].shock), Some("12.3 %"));
        assert_eq!(table.rows[2].extreme_level, None);
    }

    #[test]
    fn empty_rule_set_is_noop() {
        let mut table = ShockTable {
            periods: PeriodLayout {
                t0: "T0".to_string(),
                window: vec![],
                path: vec![],
            },
            rows: vec![ObservationRow::new("M1", Some("S1"))],
        };
        let before = table.clone();
        assert_eq!(apply_format_rules(&mut table, &RuleSet::empty(), &BTreeSet::new()), 0);
        assert_eq!(table, before);
    }
}
