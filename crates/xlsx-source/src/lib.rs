//! Spreadsheet column source for http-stream.
//!
//! This crate provides [`XlsxColumnSource`], a stateful [`ValueSource`]
//! reading one column of one worksheet row by row.
//!
//! # Example
//!
//! ```ignore
//! use http_stream_xlsx_source::XlsxColumnSource;
//! use template_core::{Range, ValueKind, ValueSource, XlsxConfig};
//!
//! let config = XlsxConfig {
//!     path: "people.xlsx".into(),
//!     sheet: "Sheet1".to_string(),
//!     column: "B".to_string(),
//!     rows: Range::new(2, 101),
//!     vtype: ValueKind::String,
//! };
//! let mut names = XlsxColumnSource::open(&config)?;
//! while let Ok(name) = names.produce_one() {
//!     println!("{name:?}");
//! }
//! ```
//!
//! [`ValueSource`]: template_core::ValueSource

mod error;
pub mod sheet;
mod source;

pub use error::XlsxSourceError;
pub use sheet::{column_index, column_name, CalamineSheet, CellValue, Worksheet};
pub use source::{XlsxColumnSource, INFER_THRESHOLD};
