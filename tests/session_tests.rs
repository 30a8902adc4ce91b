//! End-to-end import session tests: file bytes → validated, editable dataset

mod common;

use common::{header, num, text, xlsx_bytes, xlsx_with_date_cells};
use pretty_assertions::assert_eq;
use sheet_import::session::{SheetLoad, MAX_FILE_BYTES};
use sheet_import::types::RejectionReason;
use sheet_import::{CellValue, ImportError, ImportSession, SessionState};

fn payments_workbook() -> Vec<u8> {
    xlsx_bytes(&[
        (
            "January",
            vec![
                header(),
                vec![text("Alice"), num(100.0), num(44197.0), text("Yes")],
                vec![text("Bob"), num(-5.0), text("2021-01-01"), text("No")],
                vec![text("Cara"), num(35.5), text("2021-01-15"), text("Yes")],
            ],
        ),
        (
            "February",
            vec![
                vec![text("Date"), text("Verified"), text("Comment"), text("Name"), text("Amount")],
                vec![num(44228.0), text("No"), text("late"), text("Dan"), text("12")],
                vec![num(44229.0), text(""), text(""), text("Eve"), num(3.0)],
            ],
        ),
        (
            "Summary",
            vec![vec![text("Name"), text("Amount"), text("Date")], vec![text("Total"), num(135.5)]],
        ),
        ("Notes", vec![vec![text("Nothing here yet")]]),
    ])
}

fn imported() -> (ImportSession, SheetLoad) {
    let mut session = ImportSession::default();
    session
        .select_file_bytes("payments.xlsx", payments_workbook())
        .unwrap();
    let load = session.import().unwrap();
    (session, load)
}

#[test]
fn test_import_selects_first_sheet() {
    let (session, load) = imported();

    assert_eq!(session.state(), SessionState::Imported);
    assert_eq!(
        session.sheet_names(),
        ["January", "February", "Summary", "Notes"]
    );
    assert_eq!(session.selected_sheet(), Some("January"));
    assert_eq!(load.sheet, "January");
    assert_eq!(load.accepted, 2);
}

#[test]
fn test_accepted_record_matches_scenario() {
    let (session, _) = imported();
    let alice = &session.records()[0];

    assert_eq!(alice.value("Name"), &text("Alice"));
    assert_eq!(alice.value("Amount"), &num(100.0));
    assert_eq!(alice.value("Date"), &text("01/01/2021"));
    assert_eq!(alice.value("Verified"), &text("Yes"));
    assert_eq!(
        session.records()[1].value("Date"),
        &text("15/01/2021")
    );
}

#[test]
fn test_rejected_row_is_reported_once() {
    let (session, load) = imported();

    assert_eq!(load.rejected.len(), 1);
    assert_eq!(load.rejected[0].row, 3);
    assert_eq!(load.rejected[0].reasons, vec![RejectionReason::InvalidAmount]);
    assert_eq!(
        session.messages(),
        ["The following errors were found:\nSheet: January, Row: 3, Errors: Amount must be a number greater than zero"]
    );
}

#[test]
fn test_sheet_switch_uses_file_header_order() {
    let (mut session, _) = imported();
    let load = session.select_sheet("February").unwrap();

    assert_eq!(session.state(), SessionState::SheetSelected);
    assert_eq!(session.selected_sheet(), Some("February"));
    assert_eq!(
        session.columns(),
        ["Date", "Verified", "Comment", "Name", "Amount"]
    );
    assert_eq!(load.accepted, 1);
    let dan = &session.records()[0];
    assert_eq!(dan.value("Date"), &text("01/02/2021"));
    assert_eq!(dan.value("Comment"), &text("late"));
    assert_eq!(dan.value("Amount"), &text("12"));

    assert_eq!(load.rejected[0].row, 3);
    assert_eq!(
        load.rejected[0].reasons,
        vec![RejectionReason::MissingRequiredFields]
    );
}

#[test]
fn test_missing_columns_sheet_clears_display() {
    let (mut session, _) = imported();
    let err = session.select_sheet("Summary").unwrap_err();

    match err {
        ImportError::MissingColumns { sheet, missing } => {
            assert_eq!(sheet, "Summary");
            assert_eq!(missing, vec!["Verified".to_string()]);
        }
        other => panic!("Expected MissingColumns, got {other:?}"),
    }
    assert!(session.columns().is_empty());
    assert!(session.records().is_empty());
    assert_eq!(session.selected_sheet(), Some("Summary"));
}

#[test]
fn test_empty_sheet_clears_display() {
    let (mut session, _) = imported();
    let err = session.select_sheet("Notes").unwrap_err();

    assert!(matches!(err, ImportError::EmptySheet { ref sheet } if sheet == "Notes"));
    assert_eq!(session.messages(), ["No data found in sheet: Notes"]);
    assert!(session.records().is_empty());

    // Switching back recovers
    session.select_sheet("January").unwrap();
    assert_eq!(session.records().len(), 2);
}

#[test]
fn test_delete_then_switch_sheet_reloads() {
    let (mut session, _) = imported();
    session.delete_row(1).unwrap();
    assert_eq!(session.records().len(), 1);
    assert_eq!(session.records()[0].value("Name"), &text("Alice"));

    session.select_sheet("February").unwrap();
    session.select_sheet("January").unwrap();
    assert_eq!(session.records().len(), 2);
}

#[test]
fn test_file_too_large_no_parse() {
    let mut session = ImportSession::default();
    let err = session
        .select_file("huge.xlsx", 3 * 1024 * 1024)
        .unwrap_err();

    assert!(matches!(
        err,
        ImportError::FileTooLarge { size, limit } if size == 3 * 1024 * 1024 && limit == MAX_FILE_BYTES
    ));
    assert!(matches!(session.import(), Err(ImportError::NoFileSelected)));
}

#[test]
fn test_too_large_selection_keeps_previous_import() {
    let (mut session, _) = imported();
    assert!(session.select_file("huge.xlsx", MAX_FILE_BYTES + 1).is_err());

    assert_eq!(session.file_name(), Some("payments.xlsx"));
    assert_eq!(session.records().len(), 2);
}

#[test]
fn test_date_formatted_cells() {
    let bytes = xlsx_with_date_cells(
        "Dated",
        &[("Alice", 100.0, 44197.0, "Yes"), ("Zed", 0.0, 44198.0, "No")],
    );
    let mut session = ImportSession::default();
    session.select_file_bytes("dated.xlsx", bytes).unwrap();
    let load = session.import().unwrap();

    assert_eq!(load.accepted, 1);
    assert_eq!(session.records()[0].value("Date"), &text("01/01/2021"));
    assert_eq!(load.rejected[0].row, 3);
}

#[test]
fn test_csv_upload() {
    let csv = "Name,Amount,Date,Verified\nAlice,100,2021-01-01,Yes\n";
    let mut session = ImportSession::default();
    session
        .select_file_bytes("payments.csv", csv.as_bytes().to_vec())
        .unwrap();
    session.import().unwrap();

    assert_eq!(session.sheet_names(), ["Sheet1"]);
    assert_eq!(session.records()[0].value("Amount"), &CellValue::Number(100.0));
}

#[test]
fn test_dataset_serializes_in_column_order() {
    let (session, _) = imported();
    let json = serde_json::to_value(session.dataset()).unwrap();

    assert_eq!(json["columns"][0], "Name");
    assert_eq!(json["records"][0]["Date"], "01/01/2021");
    assert_eq!(json["records"][0]["Amount"], 100.0);
}
