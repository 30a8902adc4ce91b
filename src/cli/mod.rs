//! CLI command handlers

pub mod commands;

pub use commands::{browse, import, sheets, OutputFormat};
