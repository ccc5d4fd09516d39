//! Fanload: upload labelled directories through a bounded worker pool and record them in a manifest.

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod types;
pub mod upload;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use error::PipelineError;
pub use sink::{CsvManifest, LocalStore, ManifestSink, NullStore, StorageConnect, StorageSink};
pub use source::{DirSource, WorkSource};
pub use upload::{list_job_items, upload_dir, upload_dir_with_source, upload_jobs};
pub use utils::CancelToken;

/// Result alias used by the CLI-facing API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
