use thiserror::Error;

pub type ImportResult<T> = Result<T, ImportError>;

/// Everything that can stop an import action.
///
/// The `Display` text of each variant is the notification shown to the user.
/// Per-row validation failures are not errors; see [`crate::types::RowRejection`].
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("File size exceeds {}MB. Please upload a smaller file.", .limit / (1024 * 1024))]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Please select a file first.")]
    NoFileSelected,

    #[error("Unable to read spreadsheet: {0}")]
    UnreadableFile(String),

    #[error("No data found in sheet: {sheet}")]
    EmptySheet { sheet: String },

    #[error("Missing required columns in sheet {sheet}: {}", .missing.join(", "))]
    MissingColumns { sheet: String, missing: Vec<String> },

    #[error("Sheet not found in workbook: {0}")]
    SheetNotFound(String),

    #[error("Import a file before choosing a sheet.")]
    NoWorkbook,

    #[error("Row {position} does not exist ({len} rows displayed)")]
    RowOutOfRange { position: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<calamine::Error> for ImportError {
    fn from(e: calamine::Error) -> Self {
        ImportError::UnreadableFile(e.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(e: csv::Error) -> Self {
        ImportError::UnreadableFile(e.to_string())
    }
}
