//! Sheet Import - schema-validated spreadsheet row import
//!
//! Turns an uploaded spreadsheet (unknown column order, mixed cell types,
//! several sheets) into a dataset of rows that carry every required field
//! and a positive amount, plus a report of the rows that were left out.
//!
//! # Features
//!
//! - xlsx, xlsm, xlsb, xls and ods workbooks (CSV text as a single sheet)
//! - Required-column check per sheet, independent of header order
//! - Per-row rejection reasons batched into one notice
//! - Serial and text dates normalized to `DD/MM/YYYY`
//! - Session controller with sheet switching and row deletion
//!
//! # Example
//!
//! ```no_run
//! use sheet_import::session::ImportSession;
//!
//! let bytes = std::fs::read("payments.xlsx")?;
//! let mut session = ImportSession::default();
//! session.select_file_bytes("payments.xlsx", bytes)?;
//! session.import()?;
//!
//! println!("Columns: {:?}", session.columns());
//! println!("Rows: {}", session.records().len());
//! for message in session.messages() {
//!     println!("{}", message);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod dates;
pub mod error;
pub mod loader;
pub mod logging;
pub mod session;
pub mod types;
pub mod validator;

// Re-export commonly used types
pub use error::{ImportError, ImportResult};
pub use loader::{extract_grid, parse_workbook, Sheet, Workbook};
pub use session::{ImportSession, SessionConfig, SessionState};
pub use types::{CellValue, ImportedDataset, Record, RowRejection, Schema};
pub use validator::validate_sheet;
