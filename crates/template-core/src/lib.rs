//! Core types for the http-stream document generator.
//!
//! This crate provides the foundational pieces shared by the generator
//! and the source crates:
//!
//! - [`Range`] - Normalised closed interval
//! - [`dates`] - Date string <-> epoch seconds conversion
//! - [`GeneratedValue`] - Output value tree produced by sources
//! - [`ValueSource`] - The "produce next value" capability and its [`ReadError`]
//! - [`TemplateNode`] - Typed template tree
//! - [`SchemaValidator`] - Recursive-descent template checker
//!
//! # Architecture
//!
//! ```text
//! template-core (this crate)
//!    │
//!    ├─── http-stream-xlsx-source  (implements ValueSource over a worksheet column)
//!    │
//!    └─── document-generator       (random sources + DocumentBuilder)
//! ```
//!
//! # Example
//!
//! ```rust
//! use template_core::{SchemaValidator, TemplateNode};
//!
//! let template = serde_json::json!({
//!     "age": {
//!         "+type": "int",
//!         "+source": { "type": "rand-int", "begin": 18, "end": 65 }
//!     }
//! });
//!
//! let validated = SchemaValidator::new().validate_document(&template).unwrap();
//! assert!(matches!(validated.root, TemplateNode::Map { .. }));
//! ```

pub mod dates;
pub mod range;
pub mod schema;
pub mod source;
pub mod validator;
pub mod values;

// Re-exports for convenience
pub use dates::{date_from_seconds, format_date, seconds_from_date, DateError};
pub use range::Range;
pub use schema::{
    child_path, load_template, select_pointer, EntryType, SchemaError, SourceConfig,
    TemplateField, TemplateNode, ValueKind, XlsxConfig, ROOT_PATH,
};
pub use source::{EndOfDataCause, ReadError, ValueSource};
pub use validator::{check_document, SchemaValidator, SchemaWarning, ValidatedTemplate};
pub use values::GeneratedValue;
