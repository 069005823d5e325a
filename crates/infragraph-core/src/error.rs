//! Non-fatal diagnostics returned alongside partial results

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ResourceKey;

/// Diagnostics collected while importing configuration and building the graph.
///
/// None of these abort an import: the caller always receives whatever could be
/// built, together with the full list of warnings.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineWarning {
    #[error("parse failure: {reason}")]
    ParseFailure { document: String, reason: String },

    #[error("unmapped resource type '{resource_type}', using generic component")]
    UnmappedResourceType { resource_type: String },

    #[error("'{from}' references '{to}', which is not declared; no edge created")]
    DanglingReference { from: ResourceKey, to: ResourceKey },

    #[error("resource '{key}' is declared more than once; the last declaration wins")]
    DuplicateResource { key: ResourceKey },
}

impl EngineWarning {
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, EngineWarning::ParseFailure { .. })
    }
}
