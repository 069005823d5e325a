//! Resource configuration parsing and ground-truth ingestion

pub mod attributes;
pub mod blocks;
pub mod comments;
pub mod document;
pub mod error;
pub mod import;
pub mod inventory;
pub mod lexer;
pub mod references;
mod template;


pub use blocks::{parse_blocks, Block};
pub use document::{parse_documents, parse_str, Module, Output, ParsedConfiguration, SourceDocument, Variable};
pub use error::ParseError;
pub use import::{import_configuration, import_ground_truth, ImportResult};
pub use inventory::{
    parse_live_inventory, parse_state_export, resources_from_ground_truth, GroundTruthResource, GroundTruthSource,
    InventoryError, LiveResource, StateExport,
};
pub use lexer::{tokenize, Token, TokenKind};
pub use references::extract_references;
