//! Symbol table for dependency resolution

use crate::model::{NodeId, ResourceKey};
use std::collections::HashMap;

/// Maps `(type, name)` resource keys to the node built for them.
#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: HashMap<ResourceKey, NodeId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: HashMap::new(),
        }
    }

    /// Insert a symbol, returning the node previously registered under the same key.
    pub fn insert(&mut self, key: ResourceKey, node_id: NodeId) -> Option<NodeId> {
        self.symbols.insert(key, node_id)
    }

    /// Look up a symbol by resource key.
    pub fn lookup(&self, key: &ResourceKey) -> Option<NodeId> {
        self.symbols.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
