//! Public and internal types for the fanload API and pipeline.

use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

use crate::utils::config::DEFAULT_WORKERS;

/// One listed source file: absolute (or caller-relative) path plus its base name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub base_name: String,
}

/// One unit of work for the pool. Consumed exactly once by exactly one worker.
#[derive(Clone, Debug)]
pub struct WorkItem {
    pub path: PathBuf,
    pub base_name: String,
    pub label: String,
}

impl WorkItem {
    pub fn new(entry: SourceEntry, label: &str) -> Self {
        Self {
            path: entry.path,
            base_name: entry.base_name,
            label: label.to_string(),
        }
    }
}

/// Produced by a worker after a successful upload; becomes one manifest row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadResult {
    /// Object key inside the destination (`{label}/{base_name}`).
    pub key: String,
    pub label: String,
}

/// What to do when an upload fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Stop dispatching on the first failed upload and return that error.
    #[default]
    FailFast,
    /// Record the failure, keep uploading the rest, report an incomplete run at the end.
    Continue,
}

/// A labelled source directory and the destination its files go to.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Job {
    pub label: String,
    pub source: PathBuf,
    pub destination: String,
}

/// Parses `LABEL=SOURCE@DESTINATION`, e.g. `apple=train/apples@apples-bucket`.
/// The last `@` splits source from destination so source paths may contain `@`.
impl FromStr for Job {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, rest) = s
            .split_once('=')
            .ok_or_else(|| format!("expected LABEL=SOURCE@DESTINATION, got `{s}`"))?;
        let (source, destination) = rest
            .rsplit_once('@')
            .ok_or_else(|| format!("missing @DESTINATION in `{s}`"))?;
        if label.is_empty() || source.is_empty() || destination.is_empty() {
            return Err(format!("empty label, source or destination in `{s}`"));
        }
        Ok(Job {
            label: label.to_string(),
            source: PathBuf::from(source),
            destination: destination.to_string(),
        })
    }
}

/// Configuration of one pipeline run: one destination, fixed pool size.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub workers: usize,
    pub destination: String,
    pub error_policy: ErrorPolicy,
}

impl PipelineConfig {
    pub fn new(destination: impl Into<String>, workers: usize) -> Self {
        Self {
            workers,
            destination: destination.into(),
            error_policy: ErrorPolicy::default(),
        }
    }

    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }
}

/// Outcome of a successful run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Items handed to the pool.
    pub dispatched: usize,
    /// Items uploaded and recorded in the manifest.
    pub uploaded: usize,
}

impl std::ops::AddAssign for RunSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.dispatched += rhs.dispatched;
        self.uploaded += rhs.uploaded;
    }
}

/// Full options (CLI, config file, lib).
#[derive(Clone, Debug)]
pub struct Opts {
    /// Worker pool size per job. Must be at least 1.
    pub workers: usize,
    pub error_policy: ErrorPolicy,
    /// Strict mode: fail on the first unreadable directory entry instead of skipping it.
    pub strict: bool,
    /// Follow symbolic links to files.
    pub follow_links: bool,
    /// Exclude patterns (glob syntax, matched against base names).
    pub exclude: Vec<String>,
    /// Debug logging and progress bar.
    pub verbose: bool,
    /// Root directory of the local object store. When None, resolved from env or default.
    pub store_root: Option<PathBuf>,
    /// Read every file but store nothing.
    pub dry_run: bool,
    pub jobs: Vec<Job>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            error_policy: ErrorPolicy::default(),
            strict: false,
            follow_links: false,
            exclude: Vec::new(),
            verbose: false,
            store_root: None,
            dry_run: false,
            jobs: Vec::new(),
        }
    }
}

impl Opts {
    pub fn pipeline_config(&self, job: &Job) -> PipelineConfig {
        PipelineConfig::new(job.destination.clone(), self.workers)
            .with_error_policy(self.error_policy)
    }
}
