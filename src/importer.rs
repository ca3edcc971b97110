use std::path::Path;

use tracing::{debug, info};

use crate::error::{KontierungError, Result};
use crate::models::{Cell, RawTable};
#[cfg(feature = "xlsx")]
use crate::normalizer::{cell_to_string, excel_serial_to_date, parse_date};

pub const DEFAULT_SHEET: &str = "Sheet1";

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFormat {
    Csv,
    #[cfg(feature = "xlsx")]
    Workbook,
}

impl InputFormat {
    pub fn detect(file_path: &Path) -> Result<InputFormat> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            #[cfg(feature = "xlsx")]
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            _ => Err(KontierungError::UnsupportedFormat(file_path.display().to_string())),
        }
    }
}

/// Read the first table of `file_path` into memory, header row first.
#[cfg_attr(not(feature = "xlsx"), allow(unused_variables))]
pub fn read_table(file_path: &Path, sheet_name: &str) -> Result<RawTable> {
    let table = match InputFormat::detect(file_path)? {
        InputFormat::Csv => read_csv(file_path)?,
        #[cfg(feature = "xlsx")]
        InputFormat::Workbook => read_workbook(file_path, sheet_name)?,
    };
    info!(
        file = %file_path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "read input table"
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// `;` when the header holds more semicolons than commas (German Excel exports).
pub fn sniff_delimiter(header_line: &str) -> u8 {
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

pub fn read_csv(file_path: &Path) -> Result<RawTable> {
    let content = std::fs::read_to_string(file_path)?;
    parse_csv(&content)
}

pub fn parse_csv(content: &str) -> Result<RawTable> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let delimiter = sniff_delimiter(content.lines().next().unwrap_or(""));
    debug!(delimiter = %(delimiter as char), "csv delimiter");
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let headers = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(
            record
                .iter()
                .map(|f| {
                    if f.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(f.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// Spreadsheets (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn read_workbook(file_path: &Path, sheet_name: &str) -> Result<RawTable> {
    use calamine::Reader;

    let mut workbook = calamine::open_workbook_auto(file_path)
        .map_err(|e| KontierungError::Spreadsheet(format!("Failed to open workbook: {e}")))?;

    let names = workbook.sheet_names().to_vec();
    let sheet = if names.iter().any(|n| n == sheet_name) {
        sheet_name.to_string()
    } else {
        let first = names
            .first()
            .cloned()
            .ok_or_else(|| KontierungError::Spreadsheet("Workbook has no sheets".to_string()))?;
        tracing::warn!(wanted = sheet_name, using = %first, "sheet not found, using first sheet");
        first
    };

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| KontierungError::Spreadsheet(format!("Failed to read sheet {sheet}: {e}")))?;

    let mut rows_iter = range.rows();
    let headers = rows_iter
        .next()
        .map(|row| {
            row.iter()
                .map(|d| cell_to_string(&convert_cell(d)).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();
    let rows = rows_iter
        .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| *c != Cell::Empty))
        .collect();
    Ok(RawTable { headers, rows })
}

#[cfg(feature = "xlsx")]
fn convert_cell(data: &calamine::Data) -> Cell {
    use calamine::Data;

    #[allow(unreachable_patterns)]
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()).map_or(Cell::Empty, Cell::Date),
        Data::DateTimeIso(s) => {
            let day: String = s.chars().take(10).collect();
            parse_date(&day, "%Y-%m-%d").map_or_else(|| Cell::Text(s.clone()), Cell::Date)
        }
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) => Cell::Empty,
        _ => Cell::Empty,
    }
}
