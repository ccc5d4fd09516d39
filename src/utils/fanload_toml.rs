//! Load `.fanload.toml` from a directory (CLI only). Lib callers build [`Opts`] directly.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::utils::config::PackagePaths;
use crate::{ErrorPolicy, Job, Opts};

#[derive(Debug, Default, Deserialize)]
pub struct FanloadToml {
    #[serde(default)]
    settings: SettingsSection,
    #[serde(default)]
    jobs: Vec<Job>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    workers: Option<usize>,
    store: Option<String>,
    on_error: Option<ErrorPolicy>,
    strict: Option<bool>,
    follow_links: Option<bool>,
    exclude: Option<Vec<String>>,
    verbose: Option<bool>,
}

/// Parse a config file body. Errors are logged and yield None.
pub fn parse_fanload_toml(s: &str, origin: &Path) -> Option<FanloadToml> {
    toml::from_str(s)
        .map_err(|e| log::warn!("{}: {}", origin.display(), e))
        .ok()
}

/// Load `.fanload.toml` from `dir` if present. Returns None if file missing or unreadable.
pub fn load_fanload_toml(dir: &Path) -> Option<FanloadToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    parse_fanload_toml(&s, &path)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
/// Relative job sources are resolved against `dir`.
pub fn apply_file_to_opts(file: &FanloadToml, opts: &mut Opts, dir: &Path) {
    let s = &file.settings;
    apply_file_opt!(s, opts, workers => workers);
    if let Some(ref p) = s.store {
        opts.store_root = Some(dir.join(PathBuf::from(p)));
    }
    apply_file_opt!(s, opts, on_error => error_policy);
    apply_file_opt!(s, opts, strict => strict);
    apply_file_opt!(s, opts, follow_links => follow_links);
    if let Some(ref v) = s.exclude {
        opts.exclude = v.clone();
    }
    apply_file_opt!(s, opts, verbose => verbose);
    if !file.jobs.is_empty() {
        opts.jobs = file
            .jobs
            .iter()
            .map(|j| Job {
                source: dir.join(&j.source),
                ..j.clone()
            })
            .collect();
    }
}
