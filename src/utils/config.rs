//! Application configuration constants.
//! Defaults and package-derived names in one place.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
    store_dirname: String,
    store_env_key: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
                store_dirname: format!(".{pkg}_store"),
                store_env_key: format!("{}_STORE", pkg.to_uppercase()),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// `.fanload.toml`
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Default local object store directory when nothing else is configured.
    pub fn store_dirname(&self) -> &str {
        &self.store_dirname
    }

    /// Environment variable naming the object store root (`FANLOAD_STORE`).
    pub fn store_env_key(&self) -> &str {
        &self.store_env_key
    }

    /// Resolve the store root: explicit value → env (after `.env` in `dir`) → `dir/.fanload_store`.
    pub fn resolve_store_root(&self, explicit: Option<&Path>, dir: &Path) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        let env_path = dir.join(".env");
        if env_path.is_file() {
            let _ = dotenvy::from_path(&env_path);
        }
        match std::env::var(self.store_env_key()) {
            Ok(s) if !s.trim().is_empty() => PathBuf::from(s.trim()),
            _ => dir.join(self.store_dirname()),
        }
    }
}

// ---- Worker pool ----

/// Pool size when neither CLI nor config file sets one.
pub const DEFAULT_WORKERS: usize = 4;

// ---- Storage ----

/// Suffix of the temp file an object is streamed into before the atomic rename.
pub const PART_SUFFIX: &str = ".part";

/// Copy buffer for streaming source files into the store (bytes). 256 KB.
pub const COPY_BUFFER_SIZE: usize = 256 * 1024;
