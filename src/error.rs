//! Error taxonomy shared by the DSL, the stage compiler and the bridge.
//!
//! None of these errors are retried automatically: every failure surfaces
//! synchronously to the caller of the operation that raised it, and a run
//! either yields complete statistics or one of these errors.

use std::path::PathBuf;
use thiserror::Error;

use crate::elements::Category;

/// Message used when the worker process exits with a non-zero code.
pub const WORKER_FAILURE_MESSAGE: &str =
    "JVM execution failed. Check stderr and stdout for additional info.";

#[derive(Debug, Error)]
pub enum DslError {
    /// Malformed duration, enum or result document text.
    #[error("Invalid format: {0}")]
    Format(String),

    /// A stage was appended in a position the engine cannot express.
    #[error("Invalid stage sequence: {0}")]
    InvalidSequence(String),

    /// The stage profile mixes expressions with a non-simple shape.
    #[error("Unsupported thread profile: {0}")]
    UnsupportedProfile(String),

    /// A child was added to a container that does not accept its category.
    #[error("{child} can not be added to {parent}: only {accepted:?} elements are accepted")]
    UnsupportedChild {
        parent: &'static str,
        child: &'static str,
        accepted: Category,
    },

    /// The worker exited with a non-zero status.
    #[error("{} (exit status: {status})", WORKER_FAILURE_MESSAGE)]
    WorkerExecution { status: String },

    /// A bundled runtime artifact could not be located in any source directory.
    #[error("Missing runtime artifact '{name}', searched in {searched:?}")]
    MissingArtifact { name: String, searched: Vec<PathBuf> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T, E = DslError> = std::result::Result<T, E>;
