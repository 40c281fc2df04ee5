use std::path::PathBuf;
use thiserror::Error;

use super::config::ConfigError;
use super::runner::RunError;
use crate::core::io::blk::BlkError;
use crate::core::io::summary::SummaryError;
use crate::core::project::document::DocumentError;
use crate::core::project::workspace::ProjectError;

/// Errors a campaign stage can surface. Every variant is fatal for the
/// invoking operation: no local recovery, no retry, no partial output.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Block output error for '{path}': {source}", path = path.display())]
    BlockOutput {
        path: PathBuf,
        #[source]
        source: BlkError,
    },

    #[error("Summary error for '{path}': {source}", path = path.display())]
    Summary {
        path: PathBuf,
        #[source]
        source: SummaryError,
    },

    #[error("Run failed: {0}")]
    Run(#[from] RunError),

    #[error("Replicate group '{0}' has no members")]
    EmptyGroup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
