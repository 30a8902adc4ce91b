//! Import session controller
//!
//! Owns the only mutable state: the selected file, the parsed workbook and the
//! dataset currently on display. Every action replaces `messages` with the
//! notifications it produced, so the presentation layer can show them as-is.

use crate::error::{ImportError, ImportResult};
use crate::loader::{extract_grid, parse_workbook, Workbook};
use crate::types::{ImportedDataset, Record, RowRejection, Schema};
use crate::validator::validate_sheet;
use tracing::{debug, info, warn};

/// Upload cap: 2 MiB
pub const MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;

/// Shown before a row is deleted
pub const DELETE_CONFIRMATION_PROMPT: &str = "Are you sure you want to delete this row?";

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_file_bytes: u64,
    pub schema: Schema,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: MAX_FILE_BYTES,
            schema: Schema::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoFile,
    FileSelected,
    /// Workbook parsed, first sheet selected
    Imported,
    /// User picked another sheet of the parsed workbook
    SheetSelected,
}

/// Identifies one file selection. Contents delivered with an outdated ticket
/// belong to a superseded selection and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTicket {
    generation: u64,
}

/// Summary of a successful sheet load
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLoad {
    pub sheet: String,
    pub accepted: usize,
    pub rejected: Vec<RowRejection>,
}

#[derive(Debug)]
struct SelectedFile {
    name: String,
    size: u64,
    contents: Option<Vec<u8>>,
}

#[derive(Debug)]
pub struct ImportSession {
    config: SessionConfig,
    state: SessionState,
    generation: u64,
    file: Option<SelectedFile>,
    workbook: Option<Workbook>,
    sheets: Vec<String>,
    selected_sheet: Option<String>,
    dataset: ImportedDataset,
    messages: Vec<String>,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl ImportSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::NoFile,
            generation: 0,
            file: None,
            workbook: None,
            sheets: Vec::new(),
            selected_sheet: None,
            dataset: ImportedDataset::default(),
            messages: Vec::new(),
        }
    }

    //==========================================================================
    // Actions
    //==========================================================================

    /// Select a file by name and byte size, before its contents are read.
    ///
    /// Oversized files are rejected and the previous selection stays in place.
    /// Otherwise any imported sheets and rows are cleared until the next import.
    pub fn select_file(&mut self, name: impl Into<String>, size: u64) -> ImportResult<FileTicket> {
        self.messages.clear();
        let name = name.into();

        if size > self.config.max_file_bytes {
            warn!(file = %name, size, limit = self.config.max_file_bytes, "file too large");
            return Err(self.report(ImportError::FileTooLarge {
                size,
                limit: self.config.max_file_bytes,
            }));
        }

        self.generation += 1;
        self.file = Some(SelectedFile {
            name,
            size,
            contents: None,
        });
        self.reset_import();
        self.state = SessionState::FileSelected;

        info!(generation = self.generation, size, "file selected");
        Ok(FileTicket {
            generation: self.generation,
        })
    }

    /// Deliver the bytes of a selected file.
    ///
    /// Returns `Ok(false)` when the ticket is stale; nothing changes then.
    pub fn attach_contents(&mut self, ticket: FileTicket, bytes: Vec<u8>) -> ImportResult<bool> {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale file read"
            );
            return Ok(false);
        }
        let Some(file) = self.file.as_mut() else {
            debug!("discarding file read with no selection");
            return Ok(false);
        };

        let size = bytes.len() as u64;
        if size > self.config.max_file_bytes {
            warn!(file = %file.name, size, "file grew past the limit after selection");
            self.file = None;
            self.state = SessionState::NoFile;
            return Err(self.report(ImportError::FileTooLarge {
                size,
                limit: self.config.max_file_bytes,
            }));
        }

        file.size = size;
        file.contents = Some(bytes);
        Ok(true)
    }

    /// Select a file whose bytes are already in memory
    pub fn select_file_bytes(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> ImportResult<()> {
        let ticket = self.select_file(name, bytes.len() as u64)?;
        self.attach_contents(ticket, bytes)?;
        Ok(())
    }

    /// Parse the selected file and load its first sheet
    pub fn import(&mut self) -> ImportResult<SheetLoad> {
        self.messages.clear();

        let parsed = self
            .file
            .as_ref()
            .and_then(|f| f.contents.as_deref())
            .map(parse_workbook);

        let workbook = match parsed {
            None => {
                warn!("import requested without a selected file");
                return Err(self.report(ImportError::NoFileSelected));
            }
            Some(Ok(workbook)) if workbook.is_empty() => {
                return Err(self.report(ImportError::UnreadableFile(
                    "workbook contains no sheets".to_string(),
                )));
            }
            Some(Ok(workbook)) => workbook,
            Some(Err(e)) => {
                warn!(error = %e, "failed to parse file");
                return Err(self.report(e));
            }
        };

        self.sheets = workbook.sheet_names();
        let first = self.sheets[0].clone();
        info!(
            file = self.file.as_ref().map(|f| f.name.as_str()).unwrap_or_default(),
            sheets = self.sheets.len(),
            "workbook imported"
        );

        self.workbook = Some(workbook);
        self.selected_sheet = Some(first.clone());
        self.state = SessionState::Imported;
        self.load_sheet(&first)
    }

    /// Switch to another sheet of the already-parsed workbook
    pub fn select_sheet(&mut self, name: &str) -> ImportResult<SheetLoad> {
        self.messages.clear();

        if self.workbook.is_none() {
            return Err(self.report(ImportError::NoWorkbook));
        }
        if !self.sheets.iter().any(|s| s == name) {
            return Err(self.report(ImportError::SheetNotFound(name.to_string())));
        }

        info!(sheet = name, "sheet selected");
        self.selected_sheet = Some(name.to_string());
        self.state = SessionState::SheetSelected;
        self.load_sheet(name)
    }

    /// Remove a displayed record by its 0-based position.
    /// Confirmation happens in the presentation layer before this is called.
    pub fn delete_row(&mut self, position: usize) -> ImportResult<Record> {
        self.messages.clear();
        match self.dataset.delete(position) {
            Ok(record) => {
                info!(position, remaining = self.dataset.len(), "row deleted");
                Ok(record)
            }
            Err(e) => Err(self.report(e)),
        }
    }

    //==========================================================================
    // Presentation outputs
    //==========================================================================

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.name.as_str())
    }

    pub fn file_size(&self) -> Option<u64> {
        self.file.as_ref().map(|f| f.size)
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheets
    }

    pub fn selected_sheet(&self) -> Option<&str> {
        self.selected_sheet.as_deref()
    }

    pub fn columns(&self) -> &[String] {
        &self.dataset.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.dataset.records
    }

    pub fn dataset(&self) -> &ImportedDataset {
        &self.dataset
    }

    /// Notifications raised by the latest action
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    //==========================================================================
    // Internals
    //==========================================================================

    fn load_sheet(&mut self, name: &str) -> ImportResult<SheetLoad> {
        let result = match self.workbook.as_ref() {
            Some(workbook) => extract_grid(workbook, name)
                .and_then(|grid| validate_sheet(name, grid, &self.config.schema)),
            None => Err(ImportError::NoWorkbook),
        };

        match result {
            Ok(report) => {
                if let Some(notice) = report.notice() {
                    warn!(sheet = name, rejected = report.rejected.len(), "rows rejected");
                    self.messages.push(notice);
                }
                let load = SheetLoad {
                    sheet: report.sheet,
                    accepted: report.accepted.len(),
                    rejected: report.rejected,
                };
                self.dataset = ImportedDataset::new(report.columns, report.accepted);
                debug!(sheet = name, accepted = load.accepted, "sheet loaded");
                Ok(load)
            }
            Err(e) => {
                warn!(sheet = name, error = %e, "sheet not importable");
                self.dataset.clear();
                Err(self.report(e))
            }
        }
    }

    fn reset_import(&mut self) {
        self.workbook = None;
        self.sheets.clear();
        self.selected_sheet = None;
        self.dataset.clear();
    }

    fn report(&mut self, e: ImportError) -> ImportError {
        self.messages.push(e.to_string());
        e
    }
}
