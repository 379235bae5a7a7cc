//! Document materialisation from a validated template tree.

use crate::sources::{DefaultSource, Source, SourceError};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use template_core::{
    child_path, EndOfDataCause, GeneratedValue, ReadError, TemplateNode, ValueSource, ROOT_PATH,
};
use tracing::{debug, info, warn};

/// What happens to a document when one of its fields cannot be built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Omit the failing field and keep going.
    #[default]
    SkipSubtree,
    /// Fail the whole document.
    AbortDocument,
}

/// Builder configuration.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Seed for the random sources. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub failure_policy: FailurePolicy,
}

/// Error type for document building.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    /// A source could not be created.
    #[error("Cannot create source for {path}: {source}")]
    Source { path: String, source: SourceError },

    /// A source failed to produce a value.
    #[error("Cannot read value for {path}: {source}")]
    Read { path: String, source: ReadError },

    /// A scalar source ran out of data, so no further document can be complete.
    #[error("Source for {path} is exhausted ({cause})")]
    Exhausted { path: String, cause: EndOfDataCause },
}

impl BuildError {
    /// Path of the template node that failed.
    pub fn path(&self) -> &str {
        match self {
            Self::Source { path, .. } | Self::Read { path, .. } | Self::Exhausted { path, .. } => {
                path
            }
        }
    }
}

/// One generated document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub value: GeneratedValue,
    /// Fields left out under [`FailurePolicy::SkipSubtree`]
    pub skipped: Vec<BuildError>,
}

/// Template node with its sources instantiated.
enum PlanNode {
    Map {
        fields: Vec<(String, PlanNode)>,
    },
    MapArray {
        path: String,
        size: usize,
        fields: Vec<(String, PlanNode)>,
    },
    Leaf {
        path: String,
        array: bool,
        size: usize,
        source: Source,
    },
    /// Leaf whose source could not be created
    Failed {
        error: BuildError,
    },
}

/// Produces documents from a validated template.
///
/// Every source is created once, up front, and lives as long as the builder,
/// so stateful sources continue where the previous document stopped.
pub struct DocumentBuilder {
    root: PlanNode,
    policy: FailurePolicy,
    documents_built: u64,
    exhausted: bool,
}

impl DocumentBuilder {
    /// Instantiate one source per leaf of `template`.
    ///
    /// Under [`FailurePolicy::AbortDocument`] the first source that cannot be
    /// created fails the builder. Otherwise the field is skipped in every
    /// document.
    pub fn new(template: &TemplateNode, options: BuildOptions) -> Result<Self, BuildError> {
        let mut seeder = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let root = plan_node(template, ROOT_PATH, &mut seeder, options.failure_policy)?;

        info!(
            "Document builder ready ({} sources, policy {:?})",
            template.leaf_count(),
            options.failure_policy
        );

        Ok(Self {
            root,
            policy: options.failure_policy,
            documents_built: 0,
            exhausted: false,
        })
    }

    /// Build the next document.
    pub fn build_document(&mut self) -> Result<Document, BuildError> {
        let mut skipped = Vec::new();
        let result = build_node(&mut self.root, self.policy, &mut skipped);

        match result {
            Ok(value) => {
                self.documents_built += 1;
                debug!("Built document #{}", self.documents_built);
                Ok(Document {
                    value: value.unwrap_or(GeneratedValue::Null),
                    skipped,
                })
            }
            Err(e) => {
                if matches!(e, BuildError::Exhausted { .. }) {
                    self.exhausted = true;
                }
                Err(e)
            }
        }
    }

    /// Iterate over up to `count` documents.
    ///
    /// Iteration ends early once a scalar source is exhausted.
    pub fn documents(&mut self, count: u64) -> Documents<'_> {
        Documents {
            builder: self,
            remaining: count,
        }
    }

    /// Number of documents built so far.
    pub fn documents_built(&self) -> u64 {
        self.documents_built
    }

    /// Whether a scalar source has run out of data.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Iterator returned by [`DocumentBuilder::documents`].
pub struct Documents<'a> {
    builder: &'a mut DocumentBuilder,
    remaining: u64,
}

impl Iterator for Documents<'_> {
    type Item = Result<Document, BuildError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.builder.exhausted {
            return None;
        }
        self.remaining -= 1;

        match self.builder.build_document() {
            Err(BuildError::Exhausted { path, cause }) => {
                info!(
                    "Stopping after {} documents: source for {path} is exhausted ({cause})",
                    self.builder.documents_built
                );
                None
            }
            other => Some(other),
        }
    }
}

// ============================================================================
// Planning
// ============================================================================

fn plan_node(
    node: &TemplateNode,
    path: &str,
    seeder: &mut StdRng,
    policy: FailurePolicy,
) -> Result<PlanNode, BuildError> {
    let plan = match node {
        TemplateNode::Map { fields } => PlanNode::Map {
            fields: plan_fields(fields, path, seeder, policy)?,
        },
        TemplateNode::MapArray { size, fields } => PlanNode::MapArray {
            path: path.to_string(),
            size: *size,
            fields: plan_fields(fields, path, seeder, policy)?,
        },
        TemplateNode::Leaf {
            entry,
            size,
            source,
        } => match Source::from_config(source, seeder) {
            Ok(source) => {
                debug!("Created {} source for {path}", source.type_name());
                PlanNode::Leaf {
                    path: path.to_string(),
                    array: entry.is_array(),
                    size: *size,
                    source,
                }
            }
            Err(e) => {
                let error = BuildError::Source {
                    path: path.to_string(),
                    source: e,
                };
                if policy == FailurePolicy::AbortDocument {
                    return Err(error);
                }
                warn!("{error}; the field will be left out");
                PlanNode::Failed { error }
            }
        },
        TemplateNode::Constant(value) => PlanNode::Leaf {
            path: path.to_string(),
            array: false,
            size: 1,
            source: Source::Default(DefaultSource::new(GeneratedValue::from(value))),
        },
    };
    Ok(plan)
}

fn plan_fields(
    fields: &[template_core::TemplateField],
    path: &str,
    seeder: &mut StdRng,
    policy: FailurePolicy,
) -> Result<Vec<(String, PlanNode)>, BuildError> {
    fields
        .iter()
        .map(|field| {
            let child = child_path(path, &field.name);
            Ok((field.name.clone(), plan_node(&field.node, &child, seeder, policy)?))
        })
        .collect()
}

// ============================================================================
// Building
// ============================================================================

/// Build one node. `Ok(None)` means the node was skipped.
fn build_node(
    node: &mut PlanNode,
    policy: FailurePolicy,
    skipped: &mut Vec<BuildError>,
) -> Result<Option<GeneratedValue>, BuildError> {
    match node {
        PlanNode::Map { fields } => build_fields(fields, policy, skipped).map(Some),
        PlanNode::MapArray { path, size, fields } => {
            let mut items = Vec::with_capacity(*size);
            for _ in 0..*size {
                match build_fields(fields, policy, skipped) {
                    Ok(item) => items.push(item),
                    Err(BuildError::Exhausted { cause, .. }) => {
                        info!(
                            "{path}: stopping after {} of {size} elements ({cause})",
                            items.len()
                        );
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(Some(GeneratedValue::Array(items)))
        }
        PlanNode::Leaf {
            path,
            array,
            size,
            source,
        } => settle(read_leaf(source, path, *array, *size), policy, skipped),
        PlanNode::Failed { error } => settle(Err(error.clone()), policy, skipped),
    }
}

fn build_fields(
    fields: &mut [(String, PlanNode)],
    policy: FailurePolicy,
    skipped: &mut Vec<BuildError>,
) -> Result<GeneratedValue, BuildError> {
    let mut object = IndexMap::with_capacity(fields.len());
    for (name, node) in fields.iter_mut() {
        if let Some(value) = build_node(node, policy, skipped)? {
            object.insert(name.clone(), value);
        }
    }
    Ok(GeneratedValue::Object(object))
}

/// Read the value(s) of one leaf.
///
/// Scalars read exactly once. Arrays read up to `size` values and end early
/// when the source runs out of data.
fn read_leaf<S: ValueSource + ?Sized>(
    source: &mut S,
    path: &str,
    array: bool,
    size: usize,
) -> Result<GeneratedValue, BuildError> {
    if !array {
        return source.produce_one().map_err(|e| read_error(path, e));
    }

    let mut items = Vec::with_capacity(size);
    for _ in 0..size {
        match source.produce_one() {
            Ok(value) => items.push(value),
            Err(ReadError::EndOfData { cause }) => {
                info!(
                    "{path}: array ends after {} of {size} values ({cause})",
                    items.len()
                );
                break;
            }
            Err(e) => return Err(read_error(path, e)),
        }
    }
    Ok(GeneratedValue::Array(items))
}

fn read_error(path: &str, error: ReadError) -> BuildError {
    match error {
        ReadError::EndOfData { cause } => BuildError::Exhausted {
            path: path.to_string(),
            cause,
        },
        source => BuildError::Read {
            path: path.to_string(),
            source,
        },
    }
}

/// Apply the failure policy to the outcome of a leaf.
///
/// Exhaustion always propagates.
fn settle(
    result: Result<GeneratedValue, BuildError>,
    policy: FailurePolicy,
    skipped: &mut Vec<BuildError>,
) -> Result<Option<GeneratedValue>, BuildError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e @ BuildError::Exhausted { .. }) => Err(e),
        Err(e) if policy == FailurePolicy::AbortDocument => Err(e),
        Err(e) => {
            warn!("Skipping {}: {e}", e.path());
            skipped.push(e);
            Ok(None)
        }
    }
}
