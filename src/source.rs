//! Work Source: list a directory into [`SourceEntry`]s.

use anyhow::{Context, Result, anyhow, bail};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::SourceEntry;
use crate::engine::tools::{base_name, should_include_in_listing};

/// Enumeration capability. The listing is finite and taken once per run.
pub trait WorkSource {
    fn list(&self, location: &Path) -> Result<Vec<SourceEntry>>;
}

/// Lists the regular files directly under a directory (non-recursive).
#[derive(Clone, Debug, Default)]
pub struct DirSource {
    pub follow_links: bool,
    /// Fail on the first unreadable entry instead of skipping it.
    pub strict: bool,
    pub exclude: Vec<String>,
}

impl DirSource {
    pub fn from_opts(opts: &crate::Opts) -> Self {
        Self {
            follow_links: opts.follow_links,
            strict: opts.strict,
            exclude: opts.exclude.clone(),
        }
    }
}

impl WorkSource for DirSource {
    fn list(&self, location: &Path) -> Result<Vec<SourceEntry>> {
        let meta = std::fs::metadata(location).context("read source metadata")?;
        if !meta.is_dir() {
            bail!("not a directory");
        }

        let mut entries = Vec::new();
        let mut skipped: Vec<(PathBuf, String)> = Vec::new();
        let walker = WalkDir::new(location)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.follow_links)
            .sort_by_file_name();

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    // Depth 0 is the location itself: never skippable.
                    if self.strict || err.depth() == 0 {
                        return Err(anyhow!(err));
                    }
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| location.to_path_buf());
                    skipped.push((path, err.to_string()));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(name) = base_name(entry.path()) else {
                // A lossy name could collide with another file's key.
                if self.strict {
                    bail!("file name is not valid UTF-8: {}", entry.path().display());
                }
                skipped.push((entry.into_path(), "file name is not valid UTF-8".into()));
                continue;
            };
            if !should_include_in_listing(&name, &self.exclude) {
                debug!("excluded {}", entry.path().display());
                continue;
            }
            entries.push(SourceEntry {
                path: entry.into_path(),
                base_name: name,
            });
        }

        if !skipped.is_empty() {
            warn!(
                "Skipped {} unreadable entries in {}",
                skipped.len(),
                location.display()
            );
            for (p, msg) in &skipped {
                debug!("  skipped: {} ({})", p.display(), msg);
            }
        }
        Ok(entries)
    }
}
