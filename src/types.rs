use crate::error::{ImportError, ImportResult};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

//==============================================================================
// Cells
//==============================================================================

/// A single spreadsheet cell as the importer sees it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl CellValue {
    pub fn text(s: impl Into<String>) -> Self {
        CellValue::Text(s.into())
    }

    /// Absent or empty-string cells do not satisfy a required field.
    /// Whitespace-only text does.
    pub fn is_missing(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric coercion used by the amount check.
    ///
    /// Text is trimmed and parsed as a decimal literal, `Infinity` (optionally
    /// signed) or an unsigned `0x`/`0o`/`0b` integer. Blank text counts as
    /// zero, booleans are 1/0 and an empty cell is NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            CellValue::Number(n) => *n,
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::Text(s) => text_to_number(s.trim()),
            CellValue::Empty => f64::NAN,
        }
    }
}

fn text_to_number(s: &str) -> f64 {
    match s {
        "" => return 0.0,
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        return digits
            .chars()
            .filter_map(|c| c.to_digit(radix))
            .fold(0.0, |acc, d| acc * radix as f64 + d as f64);
    }

    // f64's parser also takes "inf" and "nan", which are not numbers here
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Empty => Ok(()),
        }
    }
}

/// Rows of cells aligned by column index. Row 0 is the header row.
pub type Grid = Vec<Vec<CellValue>>;

//==============================================================================
// Schema
//==============================================================================

/// Column names every importable sheet must carry, case-sensitive.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Name", "Amount", "Date", "Verified"];

/// Required fields plus the two fields with extra rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub required: Vec<String>,
    pub amount_field: String,
    pub date_field: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            required: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            amount_field: "Amount".to_string(),
            date_field: "Date".to_string(),
        }
    }
}

impl Schema {
    pub fn new(
        required: Vec<String>,
        amount_field: impl Into<String>,
        date_field: impl Into<String>,
    ) -> Self {
        Self {
            required,
            amount_field: amount_field.into(),
            date_field: date_field.into(),
        }
    }

    /// Required fields absent from `columns`, in schema order.
    /// Header order is irrelevant; only membership counts.
    pub fn missing_columns(&self, columns: &[String]) -> Vec<String> {
        self.required
            .iter()
            .filter(|field| !columns.contains(field))
            .cloned()
            .collect()
    }
}

//==============================================================================
// Records
//==============================================================================

/// One data row keyed by header name, in header order.
///
/// Duplicate header names resolve to the last column with that name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    /// Zip a header row with a data row. Columns past the end of the row are empty.
    pub fn from_row(columns: &[String], row: &[CellValue]) -> Self {
        let fields = columns
            .iter()
            .enumerate()
            .map(|(i, col)| (col.clone(), row.get(i).cloned().unwrap_or(CellValue::Empty)))
            .collect();
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .rev()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Value for display; missing keys render as empty
    pub fn value(&self, column: &str) -> &CellValue {
        self.get(column).unwrap_or(&CellValue::Empty)
    }

    /// Replace the value of every field named `column`
    pub fn set(&mut self, column: &str, value: CellValue) {
        for (name, slot) in self.fields.iter_mut() {
            if name == column {
                *slot = value.clone();
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.fields.len());
        for (name, _) in &self.fields {
            if !seen.contains(&name.as_str()) {
                seen.push(name.as_str());
            }
        }
        let mut map = serializer.serialize_map(Some(seen.len()))?;
        for name in seen {
            map.serialize_entry(name, self.value(name))?;
        }
        map.end()
    }
}

//==============================================================================
// Validation results
//==============================================================================

/// Why a data row was excluded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RejectionReason {
    MissingRequiredFields,
    InvalidAmount,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionReason::MissingRequiredFields => f.write_str("Missing required fields"),
            RejectionReason::InvalidAmount => {
                f.write_str("Amount must be a number greater than zero")
            }
        }
    }
}

/// Report for one excluded row. `row` is the 1-based spreadsheet row (header is row 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    pub sheet: String,
    pub row: usize,
    pub reasons: Vec<RejectionReason>,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<String> = self.reasons.iter().map(|r| r.to_string()).collect();
        write!(
            f,
            "Sheet: {}, Row: {}, Errors: {}",
            self.sheet,
            self.row,
            reasons.join(", ")
        )
    }
}

/// Verdict on a single data row
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    /// Row passed; its date field is already normalized
    Accepted(Record),
    Rejected {
        row: usize,
        reasons: Vec<RejectionReason>,
    },
}

/// Result of validating one sheet
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    pub sheet: String,
    pub columns: Vec<String>,
    pub accepted: Vec<Record>,
    pub rejected: Vec<RowRejection>,
}

impl ValidationReport {
    /// All row rejections batched into one notification, if there were any
    pub fn notice(&self) -> Option<String> {
        rejection_notice(&self.rejected)
    }
}

pub fn rejection_notice(rejected: &[RowRejection]) -> Option<String> {
    if rejected.is_empty() {
        return None;
    }
    let lines: Vec<String> = rejected.iter().map(|r| r.to_string()).collect();
    Some(format!(
        "The following errors were found:\n{}",
        lines.join("\n")
    ))
}

//==============================================================================
// Displayed dataset
//==============================================================================

/// Rows currently shown to the user, with the sheet's header row as columns
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ImportedDataset {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl ImportedDataset {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    /// Remove the record at a 0-based display position; the rest keep their order
    pub fn delete(&mut self, position: usize) -> ImportResult<Record> {
        if position >= self.records.len() {
            return Err(ImportError::RowOutOfRange {
                position,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(position))
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
