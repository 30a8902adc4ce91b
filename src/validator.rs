//! Row validation against the import schema
//!
//! Pure over its inputs: the caller decides how to surface the report.

use crate::dates::normalize_date;
use crate::error::{ImportError, ImportResult};
use crate::loader::MIN_SHEET_ROWS;
use crate::types::{
    CellValue, Record, RejectionReason, RowRejection, Schema, ValidationOutcome, ValidationReport,
};

/// Header cells become column names verbatim; blank headers become ""
pub fn header_columns(header: &[CellValue]) -> Vec<String> {
    header.iter().map(|cell| cell.to_string()).collect()
}

/// Validate every data row of a sheet.
///
/// The header row is kept in file order as the output columns. A header that
/// lacks any required field fails the whole sheet; otherwise each row is
/// either accepted (date normalized) or reported with its reasons.
pub fn validate_sheet(
    sheet_name: &str,
    grid: &[Vec<CellValue>],
    schema: &Schema,
) -> ImportResult<ValidationReport> {
    let (header, rows) = match grid.split_first() {
        Some(split) if grid.len() >= MIN_SHEET_ROWS => split,
        _ => {
            return Err(ImportError::EmptySheet {
                sheet: sheet_name.to_string(),
            })
        }
    };

    let columns = header_columns(header);
    let missing = schema.missing_columns(&columns);
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns {
            sheet: sheet_name.to_string(),
            missing,
        });
    }

    let mut accepted = Vec::new();
    let mut rejected = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        // Header is spreadsheet row 1
        let row_number = index + 2;
        match validate_row(&columns, row, row_number, schema) {
            ValidationOutcome::Accepted(record) => accepted.push(record),
            ValidationOutcome::Rejected { row, reasons } => rejected.push(RowRejection {
                sheet: sheet_name.to_string(),
                row,
                reasons,
            }),
        }
    }

    Ok(ValidationReport {
        sheet: sheet_name.to_string(),
        columns,
        accepted,
        rejected,
    })
}

/// Check one data row. `row_number` is only carried into the rejection.
pub fn validate_row(
    columns: &[String],
    row: &[CellValue],
    row_number: usize,
    schema: &Schema,
) -> ValidationOutcome {
    let mut record = Record::from_row(columns, row);

    let has_all_required = schema
        .required
        .iter()
        .all(|field| record.get(field).is_some_and(|value| !value.is_missing()));

    let amount_valid = record
        .get(&schema.amount_field)
        .is_some_and(is_positive_amount);

    if has_all_required && amount_valid {
        if let Some(date) = record.get(&schema.date_field) {
            let normalized = normalize_date(date);
            record.set(&schema.date_field, CellValue::Text(normalized));
        }
        return ValidationOutcome::Accepted(record);
    }

    let mut reasons = Vec::new();
    if !has_all_required {
        reasons.push(RejectionReason::MissingRequiredFields);
    }
    if !amount_valid {
        reasons.push(RejectionReason::InvalidAmount);
    }
    ValidationOutcome::Rejected {
        row: row_number,
        reasons,
    }
}

/// Amount must coerce to a number (not NaN) strictly greater than zero
pub fn is_positive_amount(value: &CellValue) -> bool {
    let n = value.to_number();
    !n.is_nan() && n > 0.0
}
