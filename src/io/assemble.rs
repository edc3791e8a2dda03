//! Dataset assembly: join the mapping and path sheets, normalize period
//! labels and cut each joined row into baseline / window / path values.

use std::collections::HashMap;

use crate::domain::{
    INDICATOR_COLUMN, LABEL_COLUMN, ObservationRow, PeriodBounds, PeriodLayout, SCENARIO_COLUMN, ShockTable,
};
use crate::error::AppError;
use crate::io::sheet::Sheet;

/// Separator used by quarter labels in the source sheets (`2026Q1`).
pub const SOURCE_PERIOD_SEPARATOR: char = 'Q';
/// Separator used by period keys in the configuration (`2026.1`).
pub const PERIOD_SEPARATOR: &str = ".";

/// Left-join `mapping` with `data` on the indicator column.
///
/// Every mapping row yields one output row per matching data row (in data
/// order), or a single row with empty data cells when nothing matches.
/// Non-key columns present in both sheets get `_x` / `_y` suffixes. Column
/// labels are normalized with `normalize_period_label` afterwards.
pub fn merge_on_indicator(mapping: &Sheet, data: &Sheet) -> Result<Sheet, AppError> {
    let map_key = mapping.column_index(INDICATOR_COLUMN).ok_or_else(|| {
        AppError::validation(format!("Missing join column `{INDICATOR_COLUMN}` in mapping sheet."))
    })?;
    let data_key = data.column_index(INDICATOR_COLUMN).ok_or_else(|| {
        AppError::validation(format!("Missing join column `{INDICATOR_COLUMN}` in data sheet."))
    })?;

    let data_cols: Vec<usize> = (0..data.headers.len()).filter(|&i| i != data_key).collect();

    let mut headers: Vec<String> = Vec::with_capacity(mapping.headers.len() + data_cols.len());
    for (i, name) in mapping.headers.iter().enumerate() {
        let clashes = i != map_key && data_cols.iter().any(|&j| data.headers[j] == *name);
        headers.push(if clashes { format!("{name}_x") } else { name.clone() });
    }
    for &j in &data_cols {
        let name = &data.headers[j];
        let clashes = mapping
            .headers
            .iter()
            .enumerate()
            .any(|(i, h)| i != map_key && h == name);
        headers.push(if clashes { format!("{name}_y") } else { name.clone() });
    }
    let headers = headers.iter().map(|h| normalize_period_label(h)).collect();

    let mut by_key: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, row) in data.rows.iter().enumerate() {
        if let Some(key) = row[data_key].as_deref() {
            by_key.entry(key).or_default().push(idx);
        }
    }

    let mut rows = Vec::new();
    for map_row in &mapping.rows {
        let matches = map_row[map_key]
            .as_deref()
            .and_then(|key| by_key.get(key))
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        if matches.is_empty() {
            let mut row = map_row.clone();
            row.resize(map_row.len() + data_cols.len(), None);
            rows.push(row);
            continue;
        }
        for &m in matches {
            let mut row = map_row.clone();
            row.extend(data_cols.iter().map(|&j| data.rows[m][j].clone()));
            rows.push(row);
        }
    }

    Ok(Sheet { headers, rows })
}

/// `2026Q1` → `2026.1`.
pub fn normalize_period_label(label: &str) -> String {
    label.replace(SOURCE_PERIOD_SEPARATOR, PERIOD_SEPARATOR)
}

/// Inclusive column span `[from, to]` by position.
///
/// Empty when either label is absent or `from` comes after `to`.
pub fn column_span(headers: &[String], from: &str, to: &str) -> Vec<usize> {
    let start = headers.iter().position(|h| h == from);
    let end = headers.iter().position(|h| h == to);
    match (start, end) {
        (Some(s), Some(e)) if s <= e => (s..=e).collect(),
        _ => Vec::new(),
    }
}

/// Resolve period columns and build one `ObservationRow` per joined row.
///
/// Callers run `validate::validate_structure` first; a missing required
/// column here is still reported rather than panicking.
pub fn assemble_rows(table: &Sheet, bounds: &PeriodBounds) -> Result<ShockTable, AppError> {
    let column = |name: &str| {
        table
            .column_index(name)
            .ok_or_else(|| AppError::validation(format!("Missing required columns: {name}")))
    };
    let indicator_col = column(INDICATOR_COLUMN)?;
    let scenario_col = column(SCENARIO_COLUMN)?;
    let label_col = column(LABEL_COLUMN)?;
    let t0_col = column(bounds.t0.as_str())?;

    let window_cols = column_span(&table.headers, &bounds.scen_start, &bounds.scen_end);
    let path_cols = column_span(&table.headers, &bounds.t0, &bounds.scen_end);

    let mut rows = Vec::with_capacity(table.rows.len());
    for (r, cells) in table.rows.iter().enumerate() {
        let number = |c: usize| cells[c].as_deref().and_then(parse_number);

        let mut row = ObservationRow::new(
            table.cell(r, indicator_col).unwrap_or_default(),
            table.cell(r, scenario_col),
        );
        row.label = table.cell(r, label_col).map(str::to_string);
        row.baseline = number(t0_col);
        row.window = window_cols.iter().map(|&c| number(c)).collect();
        row.path = path_cols.iter().map(|&c| number(c)).collect();
        rows.push(row);
    }

    let name_of = |cols: &[usize]| -> Vec<String> { cols.iter().map(|&c| table.headers[c].clone()).collect() };
    Ok(ShockTable {
        periods: PeriodLayout {
            t0: bounds.t0.clone(),
            window: name_of(&window_cols),
            path: name_of(&path_cols),
        },
        rows,
    })
}

/// Numeric cell value; anything unparsable or non-finite is missing.
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
