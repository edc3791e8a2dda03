//! Workbook sheet reader.
//!
//! A workbook `W` is read from `W.xlsx` (or `.xlsm`, `.xls`, `.ods`) inside
//! the input directory. CSV exports are accepted as a fallback: `W/S.csv`
//! for sheet `S`, or a single-sheet `W.csv`.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use calamine::{Data, Range, Reader, open_workbook_auto};

use crate::error::AppError;

/// Spreadsheet extensions tried, in order, before any CSV fallback.
pub const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// A raw table: headers plus string cells, `None` for empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Sheet {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col)?.as_deref()
    }
}

/// Where a sheet's cells come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSource {
    Workbook(PathBuf),
    Csv(PathBuf),
}

impl SheetSource {
    pub fn path(&self) -> &Path {
        match self {
            SheetSource::Workbook(path) | SheetSource::Csv(path) => path,
        }
    }
}

/// Locate the file backing `workbook`/`sheet`.
pub fn resolve_sheet_source(input_dir: &Path, workbook: &str, sheet: &str) -> Result<SheetSource, AppError> {
    for ext in WORKBOOK_EXTENSIONS {
        let path = input_dir.join(format!("{workbook}.{ext}"));
        if path.is_file() {
            return Ok(SheetSource::Workbook(path));
        }
    }
    let per_sheet = input_dir.join(workbook).join(format!("{sheet}.csv"));
    if per_sheet.is_file() {
        return Ok(SheetSource::Csv(per_sheet));
    }
    let single = input_dir.join(format!("{workbook}.csv"));
    if single.is_file() {
        return Ok(SheetSource::Csv(single));
    }
    Err(AppError::config(format!(
        "Sheet '{sheet}' of workbook '{workbook}' not found (looked for '{}', '{}' and '{}').",
        input_dir.join(format!("{workbook}.xlsx")).display(),
        per_sheet.display(),
        single.display()
    )))
}

pub fn read_sheet(input_dir: &Path, workbook: &str, sheet: &str) -> Result<Sheet, AppError> {
    let source = resolve_sheet_source(input_dir, workbook, sheet)?;
    let parsed = match &source {
        SheetSource::Workbook(path) => read_workbook_sheet(path, sheet)?,
        SheetSource::Csv(path) => {
            let file = File::open(path)
                .map_err(|e| AppError::config(format!("Failed to open sheet '{}': {e}", path.display())))?;
            parse_sheet(file, &path.display().to_string())?
        }
    };
    tracing::debug!(
        path = %source.path().display(),
        sheet,
        columns = parsed.headers.len(),
        rows = parsed.rows.len(),
        "read sheet"
    );
    Ok(parsed)
}

/// Read one named worksheet of a spreadsheet file.
pub fn read_workbook_sheet(path: &Path, sheet: &str) -> Result<Sheet, AppError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| AppError::config(format!("Failed to open workbook '{}': {e}", path.display())))?;
    let range = workbook.worksheet_range(sheet).map_err(|e| {
        AppError::config(format!("Failed to read sheet '{sheet}' of '{}': {e}", path.display()))
    })?;
    Ok(sheet_from_range(&range))
}

/// First row is the header; fully empty rows are skipped.
pub fn sheet_from_range(range: &Range<Data>) -> Sheet {
    let mut cells = range.rows();
    let headers: Vec<String> = cells
        .next()
        .map(|header| {
            header
                .iter()
                .map(|cell| cell_text(cell).map(|text| normalize_header_name(&text)).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    let rows = cells
        .map(|cells| {
            let mut row: Vec<Option<String>> = cells.iter().take(headers.len()).map(cell_text).collect();
            row.resize(headers.len(), None);
            row
        })
        .filter(|row| row.iter().any(Option::is_some))
        .collect();

    Sheet { headers, rows }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        // `2025.4` headers and numeric levels keep their shortest form.
        Data::Float(v) => Some(v.to_string()),
        Data::Int(v) => Some(v.to_string()),
        other => Some(other.to_string()),
    }
}

/// Parse CSV text into a `Sheet`. `source` names the input in error messages.
pub fn parse_sheet<R: Read>(reader: R, source: &str) -> Result<Sheet, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::config(format!("Failed to read headers of '{source}': {e}")))?
        .iter()
        .map(normalize_header_name)
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and lines are 1-based.
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::config(format!("CSV parse error in '{source}' line {line}: {e}")))?;

        let mut row: Vec<Option<String>> = record
            .iter()
            .take(headers.len())
            .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
            .collect();
        row.resize(headers.len(), None);
        rows.push(row);
    }

    Ok(Sheet { headers, rows })
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet CSV exports often carry a BOM on the first header.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn parses_cells_and_pads_short_rows() {
        let text = "\u{feff}M names, Scenario ,2025Q4\nM1,S1,100\nM2,,\nM3\n";
        let sheet = parse_sheet(text.as_bytes(), "test").unwrap();
        assert_eq!(sheet.headers, vec!["M names", "Scenario", "2025Q4"]);
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.cell(0, 2), Some("100"));
        assert_eq!(sheet.cell(1, 1), None);
        assert_eq!(sheet.rows[2], vec![Some("M3".to_string()), None, None]);
    }

    #[test]
    fn missing_workbook_is_a_config_error() {
        let err = resolve_sheet_source(Path::new("no/such/dir"), "mapping", "Sheet1").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
        assert!(err.message().contains("mapping.xlsx"));
    }

    #[test]
    fn reads_named_sheet_from_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let mut workbook = Workbook::new();
        workbook.add_worksheet().set_name("Other").unwrap();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Paths").unwrap();
        sheet.write_string(0, 0, "M names").unwrap();
        sheet.write_string(0, 1, " Scenario ").unwrap();
        sheet.write_number(0, 2, 2025.4).unwrap();
        sheet.write_string(1, 0, "M1").unwrap();
        sheet.write_string(1, 1, "S1").unwrap();
        sheet.write_number(1, 2, 100.5).unwrap();
        sheet.write_string(3, 0, "M2").unwrap();
        workbook.save(dir.path().join("path.xlsx")).unwrap();

        let parsed = read_sheet(dir.path(), "path", "Paths").unwrap();
        assert_eq!(parsed.headers, vec!["M names", "Scenario", "2025.4"]);
        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.cell(0, 2), Some("100.5"));
        assert_eq!(parsed.rows[1], vec![Some("M2".to_string()), None, None]);

        let err = read_sheet(dir.path(), "path", "Sheet9").unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_CONFIG);
    }

    #[test]
    fn workbook_takes_precedence_over_csv_exports() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mapping.csv"), "M names\nM1\n").unwrap();
        let csv = resolve_sheet_source(dir.path(), "mapping", "Sheet1").unwrap();
        assert_eq!(csv, SheetSource::Csv(dir.path().join("mapping.csv")));

        let mut workbook = Workbook::new();
        workbook.add_worksheet().write_string(0, 0, "M names").unwrap();
        workbook.save(dir.path().join("mapping.xlsx")).unwrap();
        let xlsx = resolve_sheet_source(dir.path(), "mapping", "Sheet1").unwrap();
        assert_eq!(xlsx, SheetSource::Workbook(dir.path().join("mapping.xlsx")));
    }
}
