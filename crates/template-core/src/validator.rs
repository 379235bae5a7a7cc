//! Recursive-descent template validation.
//!
//! The validator walks a raw JSON template, enforces the closed grammar of
//! control descriptors and produces a typed [`TemplateNode`] tree. It fails
//! fast on the first invalid node; ignorable mismatches (a superfluous
//! `+size`, a `+source` on a map, ...) are collected as warnings.

use crate::dates::seconds_from_date;
use crate::range::Range;
use crate::schema::{
    child_path, EntryType, SchemaError, SourceConfig, TemplateField, TemplateNode, ValueKind,
    XlsxConfig, RESERVED_KEYS, ROOT_PATH, SIZE_KEY, SOURCE_KEY, TYPE_KEY,
};
use serde_json::{Map, Value as JsonValue};
use std::path::PathBuf;
use tracing::{debug, error, warn};

/// Ignorable template mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaWarning {
    /// Slash-separated path of the node
    pub path: String,
    pub message: String,
}

/// Result of a successful validation.
#[derive(Debug, Clone)]
pub struct ValidatedTemplate {
    /// Typed template tree, ready for building
    pub root: TemplateNode,
    /// Warnings collected along the way
    pub warnings: Vec<SchemaWarning>,
}

/// Recursive-descent template checker.
#[derive(Debug, Default)]
pub struct SchemaValidator {
    warnings: Vec<SchemaWarning>,
}

impl SchemaValidator {
    /// Create a validator with no collected warnings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a whole template document.
    ///
    /// A root object carrying `+type` is validated as a node. A root object
    /// without `+type` is an implicit `map` whose children are validated,
    /// unless it holds `+size` or `+source`: such a root is a broken node
    /// descriptor and fails with a missing `+type`.
    pub fn validate_document(
        &mut self,
        document: &JsonValue,
    ) -> Result<ValidatedTemplate, SchemaError> {
        let result = match document {
            JsonValue::Object(obj) if !obj.contains_key(TYPE_KEY) => {
                if obj.contains_key(SIZE_KEY) || obj.contains_key(SOURCE_KEY) {
                    Err(SchemaError::MissingField {
                        path: ROOT_PATH.to_string(),
                        field: TYPE_KEY.to_string(),
                    })
                } else {
                    self.validate_children(obj, ROOT_PATH, &EntryType::Map)
                        .map(|fields| TemplateNode::Map { fields })
                }
            }
            _ => self.validate_node(document, ROOT_PATH),
        };

        match result {
            Ok(root) => Ok(ValidatedTemplate {
                root,
                warnings: std::mem::take(&mut self.warnings),
            }),
            Err(e) => {
                error!("Template validation failed: {e}");
                self.warnings.clear();
                Err(e)
            }
        }
    }

    /// Validate a single template node (an object carrying `+type`).
    pub fn validate_node(
        &mut self,
        node: &JsonValue,
        path: &str,
    ) -> Result<TemplateNode, SchemaError> {
        debug!("Validating template node at {path}");

        let obj = as_object(node, path)?;
        let fields = Fields { obj, path };

        let type_name = fields.string(TYPE_KEY)?;
        let entry =
            EntryType::parse(type_name).ok_or_else(|| SchemaError::UnsupportedEntryType {
                path: path.to_string(),
                found: type_name.to_string(),
                expected: EntryType::all_names().join(", "),
            })?;

        let node = match entry {
            EntryType::Map | EntryType::MapArray => {
                if obj.contains_key(SOURCE_KEY) {
                    self.warn(path, format!("Ignoring {SOURCE_KEY} field in case of {entry}"));
                }
                let size = if entry.is_array() {
                    self.array_size(&fields)?
                } else {
                    self.scalar_size(&fields, &entry);
                    1
                };
                let children = self.validate_children(obj, path, &entry)?;
                if entry.is_array() {
                    TemplateNode::MapArray {
                        size,
                        fields: children,
                    }
                } else {
                    TemplateNode::Map { fields: children }
                }
            }
            EntryType::Scalar(_) | EntryType::Array(_) => {
                let source_path = child_path(path, SOURCE_KEY);
                let source = self.validate_source(fields.value(SOURCE_KEY)?, &source_path)?;
                let size = if entry.is_array() {
                    self.array_size(&fields)?
                } else {
                    self.scalar_size(&fields, &entry);
                    1
                };
                // Children of a leaf must still be well-formed, but they
                // have no place in a scalar or array output.
                let children = self.validate_children(obj, path, &entry)?;
                for child in &children {
                    self.warn(
                        &child_path(path, &child.name),
                        format!("Ignoring field '{}' nested under {entry} entry", child.name),
                    );
                }
                TemplateNode::Leaf {
                    entry,
                    size,
                    source,
                }
            }
        };

        Ok(node)
    }

    /// Validate a `+source` descriptor.
    pub fn validate_source(
        &mut self,
        source: &JsonValue,
        path: &str,
    ) -> Result<SourceConfig, SchemaError> {
        debug!("Validating source descriptor at {path}");

        let obj = source.as_object().ok_or_else(|| SchemaError::WrongFieldType {
            path: parent_path(path),
            field: SOURCE_KEY.to_string(),
            expected: "object",
            found: json_type_name(source).to_string(),
        })?;
        let fields = Fields { obj, path };

        let type_name = fields.string("type")?;
        let config = match type_name {
            "xlsx" => {
                let file = fields.string("path")?;
                let sheet = fields.string("sheet")?;
                let column = fields.string("column")?;
                let begin = fields.row("begin")?;
                let end = fields.row("end")?;
                let vtype_name = fields.string("vtype")?;
                let vtype = vtype_name.parse::<ValueKind>().map_err(|found| {
                    SchemaError::UnsupportedValueType {
                        path: path.to_string(),
                        found,
                        expected: join(ValueKind::ALL.iter().map(|k| k.name())),
                    }
                })?;
                SourceConfig::Xlsx(XlsxConfig {
                    path: PathBuf::from(file),
                    sheet: sheet.to_string(),
                    column: column.to_string(),
                    rows: Range::new(begin, end),
                    vtype,
                })
            }
            "rand-int" => SourceConfig::RandInt {
                range: Range::new(fields.integer("begin")?, fields.integer("end")?),
            },
            "rand-double" => SourceConfig::RandDouble {
                range: Range::new(fields.number("begin")?, fields.number("end")?),
            },
            "rand-date" => {
                let begin = fields.string("begin")?;
                let end = fields.string("end")?;
                let format = fields.string("dateFormat")?;

                let invalid_date = |source| SchemaError::InvalidDate {
                    path: path.to_string(),
                    source,
                };
                let begin_secs = seconds_from_date(begin, format).map_err(invalid_date)?;
                let end_secs = seconds_from_date(end, format).map_err(invalid_date)?;
                if begin_secs > end_secs {
                    return Err(SchemaError::InvalidDateRange {
                        path: path.to_string(),
                        begin: begin.to_string(),
                        end: end.to_string(),
                    });
                }

                SourceConfig::RandDate {
                    begin: begin.to_string(),
                    end: end.to_string(),
                    format: format.to_string(),
                }
            }
            other => {
                return Err(SchemaError::UnsupportedSourceType {
                    path: path.to_string(),
                    found: other.to_string(),
                    expected: join(SourceConfig::TYPE_NAMES),
                })
            }
        };

        Ok(config)
    }

    /// Warnings collected since the last completed document validation.
    pub fn warnings(&self) -> &[SchemaWarning] {
        &self.warnings
    }

    fn validate_children(
        &mut self,
        obj: &Map<String, JsonValue>,
        path: &str,
        entry: &EntryType,
    ) -> Result<Vec<TemplateField>, SchemaError> {
        let mut children = Vec::new();
        for (name, value) in obj {
            if RESERVED_KEYS.contains(&name.as_str()) {
                continue;
            }
            if name.starts_with('+') {
                self.warn(
                    &child_path(path, name),
                    format!("Ignoring unknown control key '{name}'"),
                );
                continue;
            }
            let node = match value {
                JsonValue::Object(_) => self.validate_node(value, &child_path(path, name))?,
                literal if entry.needs_source() => {
                    self.warn(
                        &child_path(path, name),
                        format!(
                            "Ignoring literal field '{name}' ({}) nested under {entry} entry",
                            json_type_name(literal)
                        ),
                    );
                    continue;
                }
                literal => TemplateNode::Constant(literal.clone()),
            };
            children.push(TemplateField {
                name: name.clone(),
                node,
            });
        }
        Ok(children)
    }

    /// `+size` of an array entry: optional, defaults to 1, non-negative integer.
    fn array_size(&mut self, fields: &Fields<'_>) -> Result<usize, SchemaError> {
        if !fields.obj.contains_key(SIZE_KEY) {
            self.warn(
                fields.path,
                format!("No {SIZE_KEY} field for array type (default to 1)"),
            );
            return Ok(1);
        }
        let size = fields.unsigned(SIZE_KEY)?;
        usize::try_from(size).map_err(|_| fields.wrong_type(SIZE_KEY, "array size"))
    }

    /// Scalar entries always hold one value; any other `+size` is ignored.
    fn scalar_size(&mut self, fields: &Fields<'_>, entry: &EntryType) {
        if let Some(size) = fields.obj.get(SIZE_KEY) {
            if size.as_u64() != Some(1) {
                self.warn(
                    fields.path,
                    format!("Ignoring {SIZE_KEY} field in case of type {entry} (default to 1)"),
                );
            }
        }
    }

    fn warn(&mut self, path: &str, message: String) {
        warn!("{path}: {message}");
        self.warnings.push(SchemaWarning {
            path: path.to_string(),
            message,
        });
    }
}

/// Validate `document`, logging diagnostics, and report whether it is valid.
pub fn check_document(document: &JsonValue) -> bool {
    SchemaValidator::new().validate_document(document).is_ok()
}

/// Typed field access on one template object, producing path-aware errors.
struct Fields<'a> {
    obj: &'a Map<String, JsonValue>,
    path: &'a str,
}

impl<'a> Fields<'a> {
    fn value(&self, key: &str) -> Result<&'a JsonValue, SchemaError> {
        self.obj.get(key).ok_or_else(|| SchemaError::MissingField {
            path: self.path.to_string(),
            field: key.to_string(),
        })
    }

    fn string(&self, key: &str) -> Result<&'a str, SchemaError> {
        let value = self.value(key)?;
        value.as_str().ok_or_else(|| self.mismatch(key, "string", value))
    }

    fn integer(&self, key: &str) -> Result<i64, SchemaError> {
        let value = self.value(key)?;
        value.as_i64().ok_or_else(|| self.mismatch(key, "integer", value))
    }

    fn unsigned(&self, key: &str) -> Result<u64, SchemaError> {
        let value = self.value(key)?;
        value
            .as_u64()
            .ok_or_else(|| self.mismatch(key, "non-negative integer", value))
    }

    fn number(&self, key: &str) -> Result<f64, SchemaError> {
        let value = self.value(key)?;
        value.as_f64().ok_or_else(|| self.mismatch(key, "number", value))
    }

    fn row(&self, key: &str) -> Result<u32, SchemaError> {
        let row = self.unsigned(key)?;
        u32::try_from(row).map_err(|_| self.wrong_type(key, "row number"))
    }

    fn mismatch(&self, key: &str, expected: &'static str, found: &JsonValue) -> SchemaError {
        SchemaError::WrongFieldType {
            path: self.path.to_string(),
            field: key.to_string(),
            expected,
            found: describe(found),
        }
    }

    fn wrong_type(&self, key: &str, expected: &'static str) -> SchemaError {
        match self.obj.get(key) {
            Some(value) => self.mismatch(key, expected, value),
            None => SchemaError::MissingField {
                path: self.path.to_string(),
                field: key.to_string(),
            },
        }
    }
}

fn as_object<'a>(node: &'a JsonValue, path: &str) -> Result<&'a Map<String, JsonValue>, SchemaError> {
    node.as_object().ok_or_else(|| SchemaError::NotAnObject {
        path: path.to_string(),
        found: describe(node),
    })
}

fn parent_path(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => ROOT_PATH.to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(n) if n.is_u64() => "non-negative integer",
        JsonValue::Number(n) if n.is_i64() => "integer",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn describe(value: &JsonValue) -> String {
    match value {
        JsonValue::Array(_) | JsonValue::Object(_) => json_type_name(value).to_string(),
        scalar => format!("{} {scalar}", json_type_name(value)),
    }
}

fn join<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names.into_iter().collect::<Vec<_>>().join(", ")
}
