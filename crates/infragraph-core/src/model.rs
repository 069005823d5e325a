//! Core data structures for the infrastructure graph

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique node identifier. Freshly generated on every build, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn generate() -> Self {
        NodeId(Uuid::new_v4())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    pub fn generate() -> Self {
        EdgeId(Uuid::new_v4())
    }
}

/// Stable identity of a declared resource: `(type, name)`, rendered `type.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceKey {
    pub resource_type: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        ResourceKey {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

impl TryFrom<String> for ResourceKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.split_once('.') {
            Some((ty, name)) if !ty.is_empty() && !name.is_empty() => Ok(ResourceKey::new(ty, name)),
            _ => Err(format!("resource key must look like `type.name`, got `{}`", value)),
        }
    }
}

impl From<ResourceKey> for String {
    fn from(key: ResourceKey) -> Self {
        key.to_string()
    }
}

/// A flat attribute value. Nested blocks are never modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Integer(i64),
    String(String),
}

impl Scalar {
    /// Convert a JSON value from a state export or inventory. Composite values yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Scalar::Integer(i)),
                None => Some(Scalar::String(n.to_string())),
            },
            serde_json::Value::String(s) => Some(Scalar::String(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

/// Cloud provider a resource type belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Provider {
    Aws,
    Azure,
    Gcp,
    Other(String),
}

impl Provider {
    /// Providers with catalog coverage, in tie-break order.
    pub const KNOWN: [Provider; 3] = [Provider::Aws, Provider::Azure, Provider::Gcp];

    /// Infer the provider from a resource type prefix (`aws_instance` -> aws).
    pub fn from_resource_type(resource_type: &str) -> Self {
        let prefix = resource_type.split('_').next().unwrap_or(resource_type);
        Provider::from(prefix.to_string())
    }

    /// Parse provider strings as they appear in state exports, e.g.
    /// `provider["registry.terraform.io/hashicorp/aws"]`, as well as plain names.
    pub fn from_label(label: &str) -> Self {
        let trimmed = label
            .trim()
            .trim_start_matches("provider[")
            .trim_end_matches(']')
            .trim_matches('"');
        let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
        Provider::from(last.to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Provider::Aws => "aws",
            Provider::Azure => "azure",
            Provider::Gcp => "gcp",
            Provider::Other(name) => name,
        }
    }
}

impl From<String> for Provider {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "aws" => Provider::Aws,
            "azure" | "azurerm" => Provider::Azure,
            "gcp" | "google" | "google-beta" => Provider::Gcp,
            _ => Provider::Other(value),
        }
    }
}

impl From<Provider> for String {
    fn from(provider: Provider) -> Self {
        provider.as_str().to_string()
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse grouping used for placement buckets and fallback drift matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Networking,
    Compute,
    Database,
    Storage,
    Integration,
    Security,
    Other,
}

impl Category {
    /// Bucket order for the initial placement.
    pub const ALL: [Category; 7] = [
        Category::Networking,
        Category::Compute,
        Category::Database,
        Category::Storage,
        Category::Integration,
        Category::Security,
        Category::Other,
    ];
}

/// A declared infrastructure resource, as produced by the parser or a ground-truth importer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub name: String,
    pub provider: Provider,
    #[serde(default)]
    pub attributes: BTreeMap<String, Scalar>,
    #[serde(default)]
    pub dependencies: BTreeSet<ResourceKey>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        let resource_type = resource_type.into();
        Resource {
            provider: Provider::from_resource_type(&resource_type),
            resource_type,
            name: name.into(),
            attributes: BTreeMap::new(),
            dependencies: BTreeSet::new(),
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(&self.resource_type, &self.name)
    }
}

/// 2D canvas position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Provenance flags carried by every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeFlags {
    /// Built from configuration text, a state export or a live inventory.
    pub imported: bool,
    /// Added while reconciling drift.
    pub from_drift: bool,
    /// `position` is a placeholder; layouts that seed from existing
    /// positions choose a fresh one for this node.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unplaced: bool,
}

/// A single node in the infrastructure graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: NodeId,
    pub position: Position,
    pub canonical_id: String,
    pub category: Category,
    pub label: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Scalar>,
    #[serde(default)]
    pub flags: NodeFlags,
    /// `(type, name)` of the resource this node was built from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_key: Option<ResourceKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
}

/// What kind of relationship this edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    DependsOn,
}

/// A directed edge from a dependency to its dependent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

/// The exchange format handed to layouts, drift detection and the cost advisor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfraGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphNode {
    /// Copy of this node at `position`, no longer marked unplaced.
    pub fn placed_at(&self, position: Position) -> GraphNode {
        GraphNode {
            position,
            flags: NodeFlags {
                unplaced: false,
                ..self.flags
            },
            ..self.clone()
        }
    }
}

impl InfraGraph {
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_by_key(&self, key: &ResourceKey) -> Option<&GraphNode> {
        self.nodes
            .iter()
            .find(|n| n.resource_key.as_ref() == Some(key))
    }

    /// Copy of this graph carrying `nodes` (typically a layout result) and the same edges.
    pub fn with_nodes(&self, nodes: Vec<GraphNode>) -> InfraGraph {
        InfraGraph {
            nodes,
            edges: self.edges.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
