//! Ground-truth ingestion: state exports and live cloud inventories
//!
//! Both inputs are normalised into [`GroundTruthResource`] so drift detection
//! and graph building never care where the truth came from.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use infragraph_core::{Provider, Resource, ResourceKey, Scalar};

#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("resource #{index} has an empty '{field}'")]
    EmptyField { index: usize, field: &'static str },
}

/// Where a ground-truth resource came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundTruthSource {
    State,
    Live,
}

/// A resource as the outside world reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthResource {
    pub key: ResourceKey,
    pub provider: Provider,
    pub attributes: BTreeMap<String, Scalar>,
    #[serde(default)]
    pub dependencies: BTreeSet<ResourceKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub source: GroundTruthSource,
}

// ── State export ────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct StateExport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: Vec<StateResource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateResource {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub resource_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
    /// `managed` or `data`.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub instances: Vec<StateInstance>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StateInstance {
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dependencies: Vec<String>,
}

impl StateExport {
    pub fn from_json(text: &str) -> Result<Self, InventoryError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Trailing `type.name` of a state address such as `module.net.aws_vpc.main[0]`.
static RESOURCE_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\.)([A-Za-z][A-Za-z0-9]*_[A-Za-z0-9_]+)\.([A-Za-z_][A-Za-z0-9_-]*)(?:\[[^\]]*\])?$")
        .expect("resource address pattern is valid")
});

fn parse_address(address: &str) -> Option<ResourceKey> {
    if address.starts_with("data.") || address.contains(".data.") {
        return None;
    }
    let captures = RESOURCE_ADDRESS.captures(address)?;
    Some(ResourceKey::new(&captures[1], &captures[2]))
}

/// Normalise a state export. Data sources are skipped; each resource takes the
/// attributes of its first instance.
pub fn parse_state_export(text: &str) -> Result<Vec<GroundTruthResource>, InventoryError> {
    let export = StateExport::from_json(text)?;
    let mut resources = Vec::with_capacity(export.resources.len());

    for (index, resource) in export.resources.into_iter().enumerate() {
        check_field(index, "type", &resource.resource_type)?;
        check_field(index, "name", &resource.name)?;

        if resource.mode.as_deref() == Some("data") {
            tracing::debug!("Skipping data source {}.{}", resource.resource_type, resource.name);
            continue;
        }

        let provider = match &resource.provider {
            Some(label) => Provider::from_label(label),
            None => Provider::from_resource_type(&resource.resource_type),
        };
        let (attributes, dependencies) = match resource.instances.first() {
            Some(instance) => (
                scalars(&instance.attributes),
                instance.dependencies.iter().filter_map(|d| parse_address(d)).collect(),
            ),
            None => (BTreeMap::new(), BTreeSet::new()),
        };

        resources.push(GroundTruthResource {
            key: ResourceKey::new(resource.resource_type, resource.name),
            provider,
            region: attributes.get("region").map(|r| r.to_string()),
            attributes,
            dependencies,
            source: GroundTruthSource::State,
        });
    }

    tracing::debug!("Read {} resources from state export", resources.len());
    Ok(resources)
}

// ── Live inventory ──────────────────────────────────────────

/// One entry of a live cloud enumeration.
#[derive(Debug, Clone, Deserialize)]
pub struct LiveResource {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub resource_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: serde_json::Map<String, serde_json::Value>,
}

/// Normalise a live inventory. A nameless entry falls back to its cloud id.
pub fn parse_live_inventory(text: &str) -> Result<Vec<GroundTruthResource>, InventoryError> {
    let entries: Vec<LiveResource> = serde_json::from_str(text)?;
    let mut resources = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        check_field(index, "type", &entry.resource_type)?;
        let name = if entry.name.is_empty() { entry.id.clone() } else { entry.name };
        check_field(index, "name", &name)?;

        if let Some(status) = &entry.status {
            tracing::debug!("{}.{} reported as {}", entry.resource_type, name, status);
        }

        let provider = match &entry.provider {
            Some(label) => Provider::from_label(label),
            None => Provider::from_resource_type(&entry.resource_type),
        };

        resources.push(GroundTruthResource {
            key: ResourceKey::new(entry.resource_type, name),
            provider,
            attributes: scalars(&entry.properties),
            dependencies: BTreeSet::new(),
            region: entry.region,
            source: GroundTruthSource::Live,
        });
    }

    tracing::debug!("Read {} resources from live inventory", resources.len());
    Ok(resources)
}

/// Exporters write `null` for absent collections and strings.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn check_field(index: usize, field: &'static str, value: &str) -> Result<(), InventoryError> {
    if value.trim().is_empty() {
        return Err(InventoryError::EmptyField { index, field });
    }
    Ok(())
}

fn scalars(values: &serde_json::Map<String, serde_json::Value>) -> BTreeMap<String, Scalar> {
    values
        .iter()
        .filter_map(|(k, v)| Scalar::from_json(v).map(|s| (k.clone(), s)))
        .collect()
}

/// Turn ground truth into resources the graph builder accepts.
pub fn resources_from_ground_truth(truth: &[GroundTruthResource]) -> Vec<Resource> {
    truth
        .iter()
        .map(|t| Resource {
            resource_type: t.key.resource_type.clone(),
            name: t.key.name.clone(),
            provider: t.provider.clone(),
            attributes: t.attributes.clone(),
            dependencies: t.dependencies.clone(),
        })
        .collect()
}
