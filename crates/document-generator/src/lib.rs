//! Document generation for http-stream.
//!
//! [`DocumentBuilder`] turns a validated template tree into JSON-like
//! documents, one [`Source`] per template leaf.
//!
//! # Example
//!
//! ```rust
//! use document_generator::{BuildOptions, DocumentBuilder};
//! use template_core::SchemaValidator;
//!
//! let template = serde_json::json!({
//!     "age": {
//!         "+type": "int",
//!         "+source": { "type": "rand-int", "begin": 18, "end": 65 }
//!     }
//! });
//! let validated = SchemaValidator::new().validate_document(&template).unwrap();
//!
//! let options = BuildOptions { seed: Some(42), ..Default::default() };
//! let mut builder = DocumentBuilder::new(&validated.root, options).unwrap();
//! let doc = builder.build_document().unwrap();
//! assert!(doc.value.get("age").is_some());
//! ```

pub mod builder;
pub mod sources;

pub use builder::{BuildError, BuildOptions, Document, DocumentBuilder, Documents, FailurePolicy};
pub use sources::{DefaultSource, RandomDate, RandomDouble, RandomInt, Source, SourceError};
