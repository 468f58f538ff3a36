//! Error types for the annotation engine
//!
//! Event handling never surfaces these to the caller; they exist so the
//! lower-level building blocks can say why something was rejected.

use crate::annotation::{AnnotationId, AnnotationKind};

/// Errors produced by the annotation engine building blocks
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("invalid color '{0}' (expected #rrggbb or #rrggbbaa)")]
    InvalidColor(String),

    #[error("degenerate {kind} annotation cannot be committed")]
    DegenerateAnnotation { kind: AnnotationKind },

    #[error("annotation {0} already exists")]
    DuplicateId(AnnotationId),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
