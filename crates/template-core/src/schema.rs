//! Template grammar for the http-stream document generator.
//!
//! A template is a JSON (or YAML) object whose fields are either nested
//! templates, control descriptors or literal values:
//!
//! ```json
//! {
//!   "user": {
//!     "+type": "map",
//!     "age": { "+type": "int", "+source": { "type": "rand-int", "begin": 18, "end": 65 } },
//!     "scores": {
//!       "+type": "array-double",
//!       "+size": 3,
//!       "+source": { "type": "rand-double", "begin": 0.0, "end": 1.0 }
//!     }
//!   },
//!   "version": 2
//! }
//! ```
//!
//! The raw JSON is checked by [`SchemaValidator`](crate::SchemaValidator),
//! which produces the typed [`TemplateNode`] tree defined here.

use crate::dates::DateError;
use crate::range::Range;
use serde_json::Value as JsonValue;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Reserved key holding the entry type of a node.
pub const TYPE_KEY: &str = "+type";
/// Reserved key holding the array size of a node.
pub const SIZE_KEY: &str = "+size";
/// Reserved key holding the source descriptor of a node.
pub const SOURCE_KEY: &str = "+source";
/// All reserved control keys.
pub const RESERVED_KEYS: [&str; 3] = [TYPE_KEY, SIZE_KEY, SOURCE_KEY];

/// Path of the document root in diagnostics.
pub const ROOT_PATH: &str = "/";

/// Slash-separated path of field `key` under `parent`.
///
/// `~` and `/` inside keys are escaped as in JSON pointers.
pub fn child_path(parent: &str, key: &str) -> String {
    let key = key.replace('~', "~0").replace('/', "~1");
    if parent == ROOT_PATH {
        format!("/{key}")
    } else {
        format!("{parent}/{key}")
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Error type for template loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Error reading the template file
    #[error("Failed to read template file: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing JSON
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON pointer selects nothing
    #[error("JSON pointer '{0}' does not select anything in the template")]
    PointerNotFound(String),

    /// A template node is not an object
    #[error("{path}: expected a template object, found {found}")]
    NotAnObject { path: String, found: String },

    /// A required field is absent
    #[error("{path}: missing '{field}' field")]
    MissingField { path: String, field: String },

    /// A field holds a value of the wrong JSON type
    #[error("{path}: wrong type for '{field}' field, expected {expected}, found {found}")]
    WrongFieldType {
        path: String,
        field: String,
        expected: &'static str,
        found: String,
    },

    /// `+source.type` is not a known source
    #[error("{path}: unsupported source type '{found}' (expected one of {expected})")]
    UnsupportedSourceType {
        path: String,
        found: String,
        expected: String,
    },

    /// `+type` is not a known entry type
    #[error("{path}: unsupported entry type '{found}' (expected one of {expected})")]
    UnsupportedEntryType {
        path: String,
        found: String,
        expected: String,
    },

    /// `vtype` of an xlsx source is not a scalar kind
    #[error("{path}: unsupported source vtype '{found}' (expected one of {expected})")]
    UnsupportedValueType {
        path: String,
        found: String,
        expected: String,
    },

    /// `rand-date` begin is after end
    #[error("{path}: invalid date range, '{begin}' is after '{end}'")]
    InvalidDateRange {
        path: String,
        begin: String,
        end: String,
    },

    /// `rand-date` bound does not match its format
    #[error("{path}: {source}")]
    InvalidDate { path: String, source: DateError },
}

// ============================================================================
// Entry Types
// ============================================================================

/// Scalar kind of a leaf value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Bool,
    Double,
    String,
}

impl ValueKind {
    /// All scalar kinds, in template order.
    pub const ALL: [ValueKind; 4] = [Self::Int, Self::Bool, Self::Double, Self::String];

    /// Name used in templates.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Bool => "bool",
            Self::Double => "double",
            Self::String => "string",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Value of a node's `+type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// Single scalar (`int`, `bool`, `double`, `string`)
    Scalar(ValueKind),
    /// Pure nesting (`map`)
    Map,
    /// Fixed-size array of scalars (`array-int`, ...)
    Array(ValueKind),
    /// Fixed-size array of nested objects (`array-map`)
    MapArray,
}

impl EntryType {
    /// Parse a `+type` value.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "map" => Some(Self::Map),
            "array-map" => Some(Self::MapArray),
            _ => match name.strip_prefix("array-") {
                Some(kind) => kind.parse().ok().map(Self::Array),
                None => name.parse().ok().map(Self::Scalar),
            },
        }
    }

    /// Name used in templates.
    pub fn name(&self) -> String {
        match self {
            Self::Scalar(kind) => kind.name().to_string(),
            Self::Map => "map".to_string(),
            Self::Array(kind) => format!("array-{kind}"),
            Self::MapArray => "array-map".to_string(),
        }
    }

    /// Whether values of this entry are produced by a source.
    pub fn needs_source(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Array(_))
    }

    /// Whether this entry produces an array.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_) | Self::MapArray)
    }

    /// Every accepted `+type` value, for diagnostics.
    pub fn all_names() -> Vec<String> {
        let mut names: Vec<String> = ValueKind::ALL.iter().map(|k| k.to_string()).collect();
        names.push("map".to_string());
        names.extend(ValueKind::ALL.iter().map(|k| format!("array-{k}")));
        names.push("array-map".to_string());
        names
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

// ============================================================================
// Source Descriptors
// ============================================================================

/// Spreadsheet column reference of an `xlsx` source.
#[derive(Debug, Clone, PartialEq)]
pub struct XlsxConfig {
    /// Workbook file
    pub path: PathBuf,
    /// Worksheet name
    pub sheet: String,
    /// Column letters, e.g. `"B"` or `"AA"`
    pub column: String,
    /// 1-based row bounds, both inclusive
    pub rows: Range<u32>,
    /// Declared type of the column's cells
    pub vtype: ValueKind,
}

/// Validated `+source` descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    /// Sequential reads from a spreadsheet column
    Xlsx(XlsxConfig),

    /// Uniform random integers
    RandInt { range: Range<i64> },

    /// Uniform random doubles
    RandDouble { range: Range<f64> },

    /// Uniform random days between two dates
    RandDate {
        /// Earliest date, in `format`
        begin: String,
        /// Latest date, in `format`
        end: String,
        /// strftime-style format used for parsing and output
        format: String,
    },
}

impl SourceConfig {
    /// All accepted `+source.type` values.
    pub const TYPE_NAMES: [&'static str; 4] = ["xlsx", "rand-int", "rand-double", "rand-date"];

    /// Name used in templates.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Xlsx(_) => "xlsx",
            Self::RandInt { .. } => "rand-int",
            Self::RandDouble { .. } => "rand-double",
            Self::RandDate { .. } => "rand-date",
        }
    }
}

// ============================================================================
// Template Tree
// ============================================================================

/// Named child of a map node.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateField {
    pub name: String,
    pub node: TemplateNode,
}

/// Typed template tree produced by validation.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    /// Nested object (`map`, or the implicit document root)
    Map { fields: Vec<TemplateField> },

    /// `array-map`: `size` objects built from the same fields
    MapArray {
        size: usize,
        fields: Vec<TemplateField>,
    },

    /// Scalar or array-of-scalar entry fed by a source
    Leaf {
        entry: EntryType,
        /// Number of values to produce (always 1 for scalars)
        size: usize,
        source: SourceConfig,
    },

    /// Literal value copied into every document
    Constant(JsonValue),
}

impl TemplateNode {
    /// Fields of a map or map-array node.
    pub fn fields(&self) -> &[TemplateField] {
        match self {
            Self::Map { fields } | Self::MapArray { fields, .. } => fields,
            Self::Leaf { .. } | Self::Constant(_) => &[],
        }
    }

    /// Look up a direct child by name.
    pub fn field(&self, name: &str) -> Option<&TemplateNode> {
        self.fields()
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.node)
    }

    /// Number of source-backed leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf { .. } => 1,
            Self::Constant(_) => 0,
            Self::Map { fields } | Self::MapArray { fields, .. } => {
                fields.iter().map(|f| f.node.leaf_count()).sum()
            }
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a raw template from a JSON or YAML (`.yaml` / `.yml`) file.
pub fn load_template<P: AsRef<Path>>(path: P) -> Result<JsonValue, SchemaError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        _ => Ok(serde_json::from_str(&content)?),
    }
}

/// Narrow a raw template to the subtree selected by a JSON pointer.
///
/// `None` and the empty pointer select the whole document.
pub fn select_pointer(value: JsonValue, pointer: Option<&str>) -> Result<JsonValue, SchemaError> {
    match pointer {
        None | Some("") => Ok(value),
        Some(pointer) => value
            .pointer(pointer)
            .cloned()
            .ok_or_else(|| SchemaError::PointerNotFound(pointer.to_string())),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_entry_type_parse() {
        assert_eq!(EntryType::parse("int"), Some(EntryType::Scalar(ValueKind::Int)));
        assert_eq!(
            EntryType::parse("array-string"),
            Some(EntryType::Array(ValueKind::String))
        );
        assert_eq!(EntryType::parse("map"), Some(EntryType::Map));
        assert_eq!(EntryType::parse("array-map"), Some(EntryType::MapArray));
        assert_eq!(EntryType::parse("array-array-int"), None);
        assert_eq!(EntryType::parse("float"), None);
    }

    #[test]
    fn test_entry_type_names_round_trip() {
        for name in EntryType::all_names() {
            let entry = EntryType::parse(&name).expect("listed name should parse");
            assert_eq!(entry.name(), name);
        }
    }

    #[test]
    fn test_value_kind_from_str() {
        assert_eq!("double".parse::<ValueKind>(), Ok(ValueKind::Double));
        assert_eq!("decimal".parse::<ValueKind>(), Err("decimal".to_string()));
    }

    #[test]
    fn test_leaf_count() {
        let leaf = TemplateNode::Leaf {
            entry: EntryType::Scalar(ValueKind::Int),
            size: 1,
            source: SourceConfig::RandInt {
                range: Range::new(0, 1),
            },
        };
        let tree = TemplateNode::Map {
            fields: vec![
                TemplateField {
                    name: "a".to_string(),
                    node: leaf.clone(),
                },
                TemplateField {
                    name: "b".to_string(),
                    node: TemplateNode::MapArray {
                        size: 2,
                        fields: vec![TemplateField {
                            name: "c".to_string(),
                            node: leaf,
                        }],
                    },
                },
                TemplateField {
                    name: "d".to_string(),
                    node: TemplateNode::Constant(json!(1)),
                },
            ],
        };
        assert_eq!(tree.leaf_count(), 2);
        assert!(tree.field("b").is_some());
        assert!(tree.field("z").is_none());
    }

    #[test]
    fn test_load_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("template.json");
        let mut file = fs::File::create(&json_path).unwrap();
        writeln!(file, r#"{{"request": {{"body": {{"+type": "map"}}}}}}"#).unwrap();

        let yaml_path = dir.path().join("template.yaml");
        fs::write(&yaml_path, "request:\n  body:\n    +type: map\n").unwrap();

        let from_json = load_template(&json_path).unwrap();
        let from_yaml = load_template(&yaml_path).unwrap();
        assert_eq!(from_json, from_yaml);

        let body = select_pointer(from_json, Some("/request/body")).unwrap();
        assert_eq!(body, json!({"+type": "map"}));
    }

    #[test]
    fn test_select_pointer_missing() {
        let result = select_pointer(json!({"a": 1}), Some("/b"));
        assert!(matches!(result, Err(SchemaError::PointerNotFound(p)) if p == "/b"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_template("/nonexistent/template.json");
        assert!(matches!(result, Err(SchemaError::Io(_))));
    }
}
