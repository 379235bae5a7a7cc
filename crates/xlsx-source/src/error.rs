//! Error types for the spreadsheet source.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening a spreadsheet column source.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum XlsxSourceError {
    /// The workbook cannot be opened or read.
    #[error("Cannot open workbook {}: {reason}", .path.display())]
    ResourceNotFound { path: PathBuf, reason: String },

    /// The workbook has no sheet with this name.
    #[error("Sheet '{sheet}' does not exist in {}", .path.display())]
    SheetNotFound { path: PathBuf, sheet: String },

    /// The column lies outside the sheet.
    #[error("Column {column} (#{index}) lies outside the table (expected #1~#{column_count})")]
    ColumnOutOfBounds {
        column: String,
        index: u32,
        column_count: u32,
    },

    /// The first row to read lies outside the sheet.
    #[error("Begin row #{row} lies outside the table (expected #1~#{row_count})")]
    RowOutOfBounds { row: u32, row_count: u32 },
}
