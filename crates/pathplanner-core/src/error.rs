//! Error type shared by the planner library.
//!
//! A missing path is not an error: it is reported as
//! [`PathOutcome::Unreachable`](crate::PathOutcome::Unreachable).

use std::path::PathBuf;

/// Failures surfaced by input adapters, graph loaders, and configuration.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("node index {index} is out of range (expected 0..{})", crate::NODE_COUNT)]
    InvalidIndex { index: u64 },
    #[error("invalid argument `{value}`: {reason}")]
    InvalidArgument { value: String, reason: String },
    #[error("invalid register map: {0}")]
    InvalidRegisterMap(String),
    #[error("malformed graph: {0}")]
    MalformedGraph(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
