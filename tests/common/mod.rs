//! Shared fixtures: real xlsx workbooks built in memory

#![allow(dead_code)]

use rust_xlsxwriter::{Format, Workbook};
use sheet_import::CellValue;

pub fn text(s: &str) -> CellValue {
    CellValue::text(s)
}

pub fn num(n: f64) -> CellValue {
    CellValue::Number(n)
}

pub fn header() -> Vec<CellValue> {
    vec![text("Name"), text("Amount"), text("Date"), text("Verified")]
}

/// Build an xlsx file with one worksheet per `(name, rows)` entry
pub fn xlsx_bytes(sheets: &[(&str, Vec<Vec<CellValue>>)]) -> Vec<u8> {
    let mut workbook = Workbook::new();

    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();

        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    // Excel has no empty-string cells; leave a gap
                    CellValue::Text(s) if s.is_empty() => {}
                    CellValue::Text(s) => {
                        worksheet.write_string(r, c, s).unwrap();
                    }
                    CellValue::Number(n) => {
                        worksheet.write_number(r, c, *n).unwrap();
                    }
                    CellValue::Bool(b) => {
                        worksheet.write_boolean(r, c, *b).unwrap();
                    }
                    CellValue::Empty => {}
                }
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}

/// One-sheet workbook whose Date column (index 2) carries a date number format
pub fn xlsx_with_date_cells(name: &str, rows: &[(&str, f64, f64, &str)]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name).unwrap();

    for (c, h) in ["Name", "Amount", "Date", "Verified"].iter().enumerate() {
        worksheet.write_string(0, c as u16, *h).unwrap();
    }
    for (i, (who, amount, serial, verified)) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        worksheet.write_string(r, 0, *who).unwrap();
        worksheet.write_number(r, 1, *amount).unwrap();
        worksheet
            .write_number_with_format(r, 2, *serial, &date_format)
            .unwrap();
        worksheet.write_string(r, 3, *verified).unwrap();
    }

    workbook.save_to_buffer().unwrap()
}
