//! Per-scenario result workbooks.
//!
//! One `.xlsx` per scenario, holding only rows with a defined shock. Numbers
//! stay numeric cells, formatted values are text, unset values are blank.
//! Files are written one after another with no cross-file transaction.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

use crate::domain::{FieldValue, INDICATOR_COLUMN, LABEL_COLUMN, ObservationRow, ShockTable};
use crate::error::AppError;

pub const OUTPUT_COLUMNS: [&str; 4] = [INDICATOR_COLUMN, LABEL_COLUMN, "shock", "extreme_level"];

/// A scenario file that was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub scenario: String,
    pub path: PathBuf,
    pub rows: usize,
}

pub fn scenario_file_name(scenario: &str) -> String {
    let safe: String = scenario
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("path2shock_{safe}.xlsx")
}

/// Rows with a defined shock, grouped by scenario in order of first
/// appearance. Every scenario of the table gets an entry, possibly empty.
pub fn partition_by_scenario(table: &ShockTable) -> Vec<(&str, Vec<&ObservationRow>)> {
    table
        .scenarios()
        .into_iter()
        .map(|scenario| {
            let rows: Vec<&ObservationRow> = table
                .rows
                .iter()
                .filter(|row| row.scenario.as_deref() == Some(scenario) && row.shock.is_some())
                .collect();
            (scenario, rows)
        })
        .collect()
}

/// Fails when two scenarios would be written to the same file.
pub fn check_file_names<'a>(scenarios: impl IntoIterator<Item = &'a str>) -> Result<(), AppError> {
    let mut claimed: HashMap<String, &str> = HashMap::new();
    for scenario in scenarios {
        let name = scenario_file_name(scenario);
        if let Some(previous) = claimed.get(name.as_str()) {
            return Err(AppError::output(format!(
                "Scenarios '{previous}' and '{scenario}' both map to output file '{name}'."
            )));
        }
        claimed.insert(name, scenario);
    }
    Ok(())
}

/// Write one file per scenario into `output_dir` (created if needed).
///
/// File name clashes are reported before anything is written.
pub fn write_scenario_outputs(table: &ShockTable, output_dir: &Path) -> Result<Vec<WrittenFile>, AppError> {
    let parts = partition_by_scenario(table);
    check_file_names(parts.iter().map(|(scenario, _)| *scenario))?;

    std::fs::create_dir_all(output_dir).map_err(|e| {
        AppError::output(format!("Failed to create output dir '{}': {e}", output_dir.display()))
    })?;

    let orphans = table.rows.iter().filter(|row| row.scenario.is_none()).count();
    if orphans > 0 {
        tracing::warn!(rows = orphans, "rows without a scenario are not written");
    }

    let mut written = Vec::new();
    for (scenario, rows) in parts {
        let path = output_dir.join(scenario_file_name(scenario));
        write_scenario_file(&path, &rows)?;
        tracing::info!(scenario, rows = rows.len(), path = %path.display(), "wrote scenario output");
        written.push(WrittenFile {
            scenario: scenario.to_string(),
            path,
            rows: rows.len(),
        });
    }

    Ok(written)
}

fn write_scenario_file(path: &Path, rows: &[&ObservationRow]) -> Result<(), AppError> {
    let mut workbook = Workbook::new();
    write_rows(workbook.add_worksheet(), rows)
        .map_err(|e| AppError::output(format!("Failed to write rows of '{}': {e}", path.display())))?;
    workbook
        .save(path)
        .map_err(|e| AppError::output(format!("Failed to save '{}': {e}", path.display())))
}

fn write_rows(sheet: &mut Worksheet, rows: &[&ObservationRow]) -> Result<(), XlsxError> {
    for (col, name) in (0u16..).zip(OUTPUT_COLUMNS) {
        sheet.write_string(0, col, name)?;
    }
    for (r, row) in (1u32..).zip(rows) {
        sheet.write_string(r, 0, row.indicator.as_str())?;
        if let Some(label) = &row.label {
            sheet.write_string(r, 1, label.as_str())?;
        }
        write_value(sheet, r, 2, &row.shock)?;
        write_value(sheet, r, 3, &row.extreme_level)?;
    }
    Ok(())
}

fn write_value(sheet: &mut Worksheet, row: u32, col: u16, value: &Option<FieldValue>) -> Result<(), XlsxError> {
    match value {
        Some(FieldValue::Number(v)) => {
            sheet.write_number(row, col, *v)?;
        }
        Some(FieldValue::Text(text)) => {
            sheet.write_string(row, col, text.as_str())?;
        }
        None => {}
    }
    Ok(())
}
