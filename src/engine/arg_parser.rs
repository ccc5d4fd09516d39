use clap::Parser;
use std::path::PathBuf;

use crate::{ErrorPolicy, Job};

/// Upload labelled directories in parallel and write a CSV manifest of what was uploaded.
#[derive(Clone, Debug, Parser)]
#[command(name = "fanload", version)]
#[command(about = "Upload labelled directories through a worker pool; record each upload in a CSV manifest.")]
pub struct Cli {
    /// Manifest file to create (one `reference,label` row per uploaded file).
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Job as LABEL=SOURCE@DESTINATION. Repeat for several jobs; they run in order.
    /// Replaces `[[jobs]]` from `.fanload.toml`.
    #[arg(long, short = 'j', value_name = "LABEL=SOURCE@DESTINATION")]
    pub job: Vec<Job>,

    /// Number of parallel upload workers. Default: 4.
    #[arg(long, short = 'w', value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Object store root directory. Default: $FANLOAD_STORE, else `.fanload_store`.
    #[arg(long, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// What to do when an upload fails.
    #[arg(long, value_enum)]
    pub on_error: Option<ErrorPolicy>,

    /// Strict mode: fail on the first unreadable directory entry instead of skipping.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub strict: Option<bool>,

    /// Follow symbolic links to files.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Exclude patterns (glob syntax on file names). Can specify multiple: -e '*.tmp' '*.log'
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Read every file but store nothing; the manifest is still written.
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output (debug logs and progress bar).
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
