//! Sheet loader - raw file bytes → named sheets of cell grids
//!
//! Spreadsheet containers (xlsx, xlsm, xlsb, xls, ods) are read with calamine.
//! Plain UTF-8 text that is not a container is read as a single CSV sheet.

use crate::error::{ImportError, ImportResult};
use crate::types::{CellValue, Grid};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use tracing::{debug, warn};

/// Local file header of a zip archive (xlsx, xlsm, xlsb, ods)
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Compound File Binary header (legacy xls)
const CFB_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Name given to the only sheet of a CSV upload
pub const CSV_SHEET_NAME: &str = "Sheet1";

/// A sheet needs a header row plus at least one data row
pub const MIN_SHEET_ROWS: usize = 2;

/// One named grid. Row 0 is the header row.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Grid,
}

/// Parsed workbook: sheets in file order. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Parse raw file bytes into a workbook
pub fn parse_workbook(bytes: &[u8]) -> ImportResult<Workbook> {
    if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(CFB_MAGIC) {
        return parse_container(bytes);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) if !text.trim().is_empty() => parse_csv(text),
        Ok(_) => Err(ImportError::UnreadableFile("file is empty".to_string())),
        Err(_) => Err(ImportError::UnreadableFile(
            "not a spreadsheet or delimited text file".to_string(),
        )),
    }
}

/// Grid of a named sheet. Fails when the sheet has no data rows below the header.
pub fn extract_grid<'a>(workbook: &'a Workbook, sheet_name: &str) -> ImportResult<&'a Grid> {
    let sheet = workbook
        .sheet(sheet_name)
        .ok_or_else(|| ImportError::SheetNotFound(sheet_name.to_string()))?;

    if sheet.rows.len() < MIN_SHEET_ROWS {
        return Err(ImportError::EmptySheet {
            sheet: sheet_name.to_string(),
        });
    }

    debug!(sheet = sheet_name, rows = sheet.rows.len(), "extracted grid");
    Ok(&sheet.rows)
}

fn parse_container(bytes: &[u8]) -> ImportResult<Workbook> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let rows = match workbook.worksheet_range(&name) {
            Ok(range) => range_to_grid(&range),
            Err(e) => {
                // Chart sheets and the like have no cell data
                warn!(sheet = %name, error = %e, "sheet has no readable cells");
                Grid::new()
            }
        };
        debug!(sheet = %name, rows = rows.len(), "parsed sheet");
        sheets.push(Sheet { name, rows });
    }

    Ok(Workbook::new(sheets))
}

fn range_to_grid(range: &Range<Data>) -> Grid {
    range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect()
}

/// Convert a calamine cell. Date cells keep their serial so the date
/// normalizer treats them like any other serial number.
fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
            CellValue::Text(s.clone())
        }
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}

fn parse_csv(text: &str) -> ImportResult<Workbook> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Grid::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(detect_type).collect());
    }

    debug!(rows = rows.len(), "parsed delimited text");
    Ok(Workbook::new(vec![Sheet {
        name: CSV_SHEET_NAME.to_string(),
        rows,
    }]))
}

/// Type a CSV field the way a spreadsheet would on open
fn detect_type(field: &str) -> CellValue {
    let trimmed = field.trim();

    if trimmed.is_empty() {
        return CellValue::Empty;
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }

    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(field.to_string()),
    }
}
