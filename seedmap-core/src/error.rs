//! Error types for SeedMap
//!
//! Every variant here is fatal for a run: the mapper is a one-shot batch
//! computation and never retries or emits partial results.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading inputs or validating parameters
#[derive(Debug, Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("No sequences found in {0}")]
    EmptyInput(PathBuf),

    #[error("Genome file consists of more than one reference sequence (second entry: {0})")]
    MultipleReferences(String),

    #[error("Read [{name}] exceeds {max} symbols")]
    ReadTooLong { name: String, max: usize },

    #[error("Read [{0}] occurs more than once in the reads file")]
    DuplicateRead(String),

    #[error("Base received before any sequence header")]
    OrphanBase,

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Allocation of {what} failed ({bytes} bytes)")]
    OutOfMemory { what: &'static str, bytes: usize },
}

impl MapError {
    pub fn parse<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid_params<S: Into<String>>(message: S) -> Self {
        Self::InvalidParams(message.into())
    }
}

/// Result type for mapper operations
pub type MapResult<T> = Result<T, MapError>;
