//! Whole-document parsing: comments, tokens, blocks, then resources and friends

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use infragraph_core::{EngineWarning, Resource, ResourceKey, Scalar};

use crate::attributes::{assignments, raw_expression, scalar_attributes, scalar_value, string_attribute};
use crate::blocks::{parse_blocks, Block};
use crate::comments::strip_comments;
use crate::error::ParseError;
use crate::lexer::tokenize;
use crate::references::extract_references;

/// A named configuration text, e.g. the contents of `main.tf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub name: String,
    pub text: String,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        SourceDocument {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub var_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Scalar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    /// Raw expression text.
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub attributes: BTreeMap<String, Scalar>,
}

/// Everything extracted from a set of documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedConfiguration {
    pub resources: Vec<Resource>,
    pub variables: Vec<Variable>,
    pub outputs: Vec<Output>,
    pub modules: Vec<Module>,
    pub warnings: Vec<EngineWarning>,
}

/// Parse documents in order. A malformed document contributes nothing but a
/// `ParseFailure` warning; the others are unaffected.
pub fn parse_documents(documents: &[SourceDocument]) -> ParsedConfiguration {
    let mut parsed = ParsedConfiguration::default();
    let mut slot: HashMap<ResourceKey, usize> = HashMap::new();

    for document in documents {
        let contents = match parse_document(&document.text) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!("Failed to parse {}: {}", document.name, e);
                parsed.warnings.push(EngineWarning::ParseFailure {
                    document: document.name.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        for resource in contents.resources {
            let key = resource.key();
            match slot.get(&key) {
                Some(&i) => {
                    tracing::debug!("{} redeclared in {}", key, document.name);
                    parsed.resources[i] = resource;
                    parsed.warnings.push(EngineWarning::DuplicateResource { key });
                }
                None => {
                    slot.insert(key, parsed.resources.len());
                    parsed.resources.push(resource);
                }
            }
        }
        parsed.variables.extend(contents.variables);
        parsed.outputs.extend(contents.outputs);
        parsed.modules.extend(contents.modules);
    }

    tracing::debug!(
        "Parsed {} documents: {} resources, {} variables, {} outputs, {} modules",
        documents.len(),
        parsed.resources.len(),
        parsed.variables.len(),
        parsed.outputs.len(),
        parsed.modules.len()
    );

    parsed
}

/// Parse a single anonymous document.
pub fn parse_str(text: &str) -> ParsedConfiguration {
    parse_documents(&[SourceDocument::new("<input>", text)])
}

#[derive(Default)]
struct DocumentContents {
    resources: Vec<Resource>,
    variables: Vec<Variable>,
    outputs: Vec<Output>,
    modules: Vec<Module>,
}

fn parse_document(text: &str) -> Result<DocumentContents, ParseError> {
    let stripped = strip_comments(text)?;
    let tokens = tokenize(&stripped)?;
    let blocks = parse_blocks(&tokens)?;

    let mut contents = DocumentContents::default();
    for block in blocks {
        match block {
            Block::Resource {
                resource_type,
                name,
                body,
                ..
            } => {
                let mut resource = Resource::new(resource_type, name);
                let own_key = resource.key();
                resource.attributes = scalar_attributes(&body);
                resource.dependencies = extract_references(&body);
                resource.dependencies.remove(&own_key);
                contents.resources.push(resource);
            }
            Block::Variable { name, body, .. } => contents.variables.push(Variable {
                name,
                var_type: raw_expression(&body, "type"),
                default: assignments(&body)
                    .into_iter()
                    .rev()
                    .find(|a| a.key == "default")
                    .and_then(|a| scalar_value(a.value)),
                description: string_attribute(&body, "description"),
            }),
            Block::Output { name, body, .. } => contents.outputs.push(Output {
                name,
                value: raw_expression(&body, "value").unwrap_or_default(),
                description: string_attribute(&body, "description"),
            }),
            Block::Module { name, body, .. } => {
                let mut attributes = scalar_attributes(&body);
                attributes.remove("source");
                contents.modules.push(Module {
                    name,
                    source: string_attribute(&body, "source"),
                    attributes,
                });
            }
            Block::Other { kind, labels, line } => {
                tracing::debug!("Skipping {} block {:?} at line {}", kind, labels, line);
            }
        }
    }

    Ok(contents)
}
