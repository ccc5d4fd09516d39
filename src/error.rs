//! Terminal errors of a pipeline run.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source location could not be listed. Raised before any work starts.
    #[error("cannot list source {}", location.display())]
    Enumeration {
        location: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// A worker could not open its storage session.
    #[error("cannot connect to storage")]
    Connect {
        #[source]
        source: anyhow::Error,
    },

    #[error("upload of {} to `{key}` failed", path.display())]
    Upload {
        path: PathBuf,
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Manifest append or flush failed.
    #[error("cannot write manifest")]
    Write {
        #[source]
        source: anyhow::Error,
    },

    #[error("run cancelled after {uploaded} uploads")]
    Cancelled { uploaded: usize },

    #[error("{failed} uploads failed ({uploaded} succeeded)")]
    Incomplete { failed: usize, uploaded: usize },

    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),
}

impl PipelineError {
    /// Uploads that completed and were recorded before the run ended, when known.
    pub fn uploaded(&self) -> Option<usize> {
        match self {
            Self::Cancelled { uploaded } | Self::Incomplete { uploaded, .. } => Some(*uploaded),
            _ => None,
        }
    }
}
