//! Error types for the slot core

use thiserror::Error;

use crate::symbols::SymbolKind;

/// Configuration and loading errors.
///
/// Runtime evaluation never fails; everything here is raised while a
/// catalog or config is being built, so a bad table stops startup.
#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid payline {id}: {reason}")]
    InvalidPayline { id: u32, reason: String },

    #[error("Duplicate payline id: {0}")]
    DuplicatePayline(u32),

    #[error("Invalid symbol {kind}: {reason}")]
    InvalidSymbol { kind: SymbolKind, reason: String },

    #[error("Empty catalog: {0}")]
    EmptyCatalog(&'static str),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type SlotResult<T> = Result<T, SlotError>;
