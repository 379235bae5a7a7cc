//! Sequential reader over one spreadsheet column.

use crate::error::XlsxSourceError;
use crate::sheet::{column_index, column_name, CalamineSheet, Worksheet};
use std::path::PathBuf;
use template_core::{
    EndOfDataCause, GeneratedValue, Range, ReadError, ValueKind, ValueSource, XlsxConfig,
};
use tracing::{debug, error, info};

/// Consecutive empty cells after which the column is taken to be exhausted.
pub const INFER_THRESHOLD: u32 = 10;

/// Reads one column of one sheet row by row, within a declared row range.
///
/// The cursor starts at the first row of the range and only moves forward.
/// Empty cells are skipped; a run of [`INFER_THRESHOLD`] of them within one
/// read ends the data early.
pub struct XlsxColumnSource<S: Worksheet = CalamineSheet> {
    path: PathBuf,
    sheet: S,
    column: u32,
    rows: Range<u32>,
    vtype: ValueKind,
    cursor: u64,
}

impl XlsxColumnSource<CalamineSheet> {
    /// Open the workbook named in `config` and position the cursor on its first row.
    pub fn open(config: &XlsxConfig) -> Result<Self, XlsxSourceError> {
        let sheet = CalamineSheet::open(&config.path, &config.sheet).inspect_err(|e| {
            error!("{e}");
        })?;
        Self::from_sheet(sheet, config)
    }
}

impl<S: Worksheet> XlsxColumnSource<S> {
    /// Build a source over an already loaded worksheet.
    pub fn from_sheet(sheet: S, config: &XlsxConfig) -> Result<Self, XlsxSourceError> {
        let column_count = sheet.column_count();
        let column = column_index(&config.column).unwrap_or(0);
        if column < 1 || column > column_count {
            let err = XlsxSourceError::ColumnOutOfBounds {
                column: config.column.clone(),
                index: column,
                column_count,
            };
            error!(
                "{err} (last column {}) ({})",
                column_name(column_count),
                config.path.display()
            );
            return Err(err);
        }

        let row_count = sheet.row_count();
        let first = config.rows.lower();
        if first < 1 || first > row_count {
            let err = XlsxSourceError::RowOutOfBounds {
                row: first,
                row_count,
            };
            error!("{err} ({})", config.path.display());
            return Err(err);
        }

        Ok(Self {
            path: config.path.clone(),
            sheet,
            column,
            rows: config.rows,
            vtype: config.vtype,
            cursor: u64::from(first),
        })
    }

    /// Row the next read starts from.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }
}

impl<S: Worksheet> ValueSource for XlsxColumnSource<S> {
    fn produce_one(&mut self) -> Result<GeneratedValue, ReadError> {
        let mut empty_run = 0;
        loop {
            if self.cursor > u64::from(self.rows.upper()) {
                info!(
                    "All rows (#{}~#{}) have been read ({})",
                    self.rows.lower(),
                    self.rows.upper(),
                    self.path.display()
                );
                return Err(ReadError::EndOfData {
                    cause: EndOfDataCause::Boundary {
                        last_row: self.rows.upper(),
                    },
                });
            }

            // Bounded by rows.upper(), so the cursor fits in u32 here.
            let row = self.cursor as u32;
            let cell = self.sheet.cell(row, self.column);
            self.cursor += 1;

            if cell.is_empty() {
                debug!(
                    "Row {} skipped upon an empty cell ({})",
                    row,
                    self.path.display()
                );
                empty_run += 1;
                if empty_run >= INFER_THRESHOLD {
                    info!(
                        "Due to {} consecutive empty cells, it was inferred that all rows have been read ({})",
                        INFER_THRESHOLD,
                        self.path.display()
                    );
                    return Err(ReadError::EndOfData {
                        cause: EndOfDataCause::Inferred { empty_run },
                    });
                }
                continue;
            }

            return cell.coerce(self.vtype).ok_or_else(|| {
                error!(
                    "Expected type {}, but got type {} at row {} ({})",
                    self.vtype,
                    cell.type_name(),
                    row,
                    self.path.display()
                );
                ReadError::TypeMismatch {
                    row,
                    expected: self.vtype,
                    found: cell.type_name().to_string(),
                }
            });
        }
    }
}
