//! Terminal output for `run` and `check`.
//!
//! Formatting lives here so the engines stay free of presentation concerns.

use crate::app::pipeline::{PreparedRun, RunOutput};
use crate::config::ShockConfig;
use crate::domain::{FieldValue, Group, ShockTable};
use crate::validate::Coverage;

/// Summary of a completed run: periods, per-group counts and files written.
pub fn format_run_summary(output: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== path2shock ===\n");
    out.push_str(&format_periods(&output.config, &output.table));
    out.push_str(&format!("Rows: {}\n", output.table.rows.len()));

    out.push_str("\nShocks computed:\n");
    for group in Group::ALL {
        let n = output.stats.computed.get(&group).copied().unwrap_or(0);
        out.push_str(&format!("  {:<12} {n:>6}\n", group.display_name()));
    }
    if output.stats.unassigned > 0 {
        out.push_str(&format!("  (unassigned rows: {})\n", output.stats.unassigned));
    }
    if output.stats.undefined > 0 {
        out.push_str(&format!("  (undefined shocks: {})\n", output.stats.undefined));
    }
    if output.formatted_rows > 0 {
        out.push_str(&format!("Formatted rows: {}\n", output.formatted_rows));
    }
    out.push_str(&format_coverage(&output.coverage));

    out.push_str("\nScenario outputs:\n");
    for file in &output.written {
        out.push_str(&format!(
            "  {:<16} {:>6} rows  {}\n",
            truncate(&file.scenario, 16),
            file.rows,
            file.path.display()
        ));
    }

    out
}

/// Summary of `check`: what was loaded and whether coverage is complete.
pub fn format_check_summary(prepared: &PreparedRun) -> String {
    let mut out = String::new();

    out.push_str("=== path2shock check ===\n");
    out.push_str(&format_periods(&prepared.config, &prepared.table));
    out.push_str(&format!(
        "Rows: {} | scenarios: {} | grouped indicators: {} | format rules: {}\n",
        prepared.table.rows.len(),
        prepared.table.scenarios().len(),
        prepared.groups.len(),
        prepared.rules.len(),
    ));
    out.push_str(&format_coverage(&prepared.coverage));
    out.push_str("Inputs OK.\n");

    out
}

/// Full computed table, one line per row.
pub fn format_shock_table(table: &ShockTable) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<12} {:<24} {:<12} {:>14} {:>14}",
            "M names", "Slides name", "Scenario", "shock", "extreme_level"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<24} {:-<12} {:-<14} {:-<14}", "", "", "", "", "").trim_end());
    out.push('\n');

    for row in &table.rows {
        out.push_str(
            format!(
                "{:<12} {:<24} {:<12} {:>14} {:>14}",
                truncate(&row.indicator, 12),
                truncate(row.label.as_deref().unwrap_or(""), 24),
                truncate(row.scenario.as_deref().unwrap_or(""), 12),
                fmt_cell(&row.shock),
                fmt_cell(&row.extreme_level),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn format_periods(config: &ShockConfig, table: &ShockTable) -> String {
    format!(
        "T0: {} | window: {} .. {} ({} periods)\n",
        table.periods.t0,
        config.scen_start,
        config.scen_end,
        table.periods.window.len()
    )
}

fn format_coverage(coverage: &Coverage) -> String {
    let mut out = String::new();
    if !coverage.unassigned.is_empty() {
        out.push_str(&format!("Without group: {}\n", join(&coverage.unassigned)));
    }
    if !coverage.unused.is_empty() {
        out.push_str(&format!("Not in data: {}\n", join(&coverage.unused)));
    }
    out
}

fn join<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    names.into_iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

fn fmt_cell(value: &Option<FieldValue>) -> String {
    match value {
        Some(FieldValue::Number(v)) => format!("{v:.6}"),
        Some(FieldValue::Text(s)) => truncate(s, 14),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ObservationRow, PeriodLayout};

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long label", 6), "a lon.");
    }

    #[test]
    fn shock_table_lists_every_row() {
        let mut formatted = ObservationRow::new("M1", Some("S1"));
        formatted.label = Some("GDP".to_string());
        formatted.shock = Some(FieldValue::Text("12.3 %".to_string()));
        let mut numeric = ObservationRow::new("M11", Some("S2"));
        numeric.shock = Some(FieldValue::Number(10.0));
        numeric.extreme_level = Some(FieldValue::Number(110.0));

        let table = ShockTable {
            periods: PeriodLayout {
                t0: "2025.4".to_string(),
                window: vec![],
                path: vec![],
            },
            rows: vec![formatted, numeric, ObservationRow::new("M99", None)],
        };

        let text = format_shock_table(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].contains("12.3 %"));
        assert!(lines[3].contains("10.000000") && lines[3].contains("110.000000"));
        assert!(lines[4].starts_with("M99") && lines[4].ends_with('-'));
    }
}
