//! Directory-backed object store: `root/<destination>/<key>`.

use anyhow::{Context, Result, bail};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};

use super::{StorageConnect, StorageSink};
use crate::utils::config::{COPY_BUFFER_SIZE, PART_SUFFIX};

/// Object store rooted at a local directory. Destinations are subdirectories,
/// created on first write.
#[derive(Clone, Debug)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where object `key` of `destination` lives on disk.
    pub fn object_path(&self, destination: &str, key: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for part in [destination, key] {
            let rel = Path::new(part);
            if !rel.components().all(|c| matches!(c, Component::Normal(_))) {
                bail!("invalid object path component `{part}`");
            }
            path.push(rel);
        }
        Ok(path)
    }
}

impl StorageConnect for LocalStore {
    type Sink = LocalSession;

    fn connect(&self) -> Result<LocalSession> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create store root {}", self.root.display()))?;
        Ok(LocalSession {
            store: self.clone(),
            buf: vec![0u8; COPY_BUFFER_SIZE],
        })
    }

    fn object_url(&self, destination: &str, key: &str) -> String {
        let root = std::path::absolute(&self.root).unwrap_or_else(|_| self.root.clone());
        format!("file://{}/{destination}/{key}", root.display())
    }
}

/// Per-worker session; owns its copy buffer.
pub struct LocalSession {
    store: LocalStore,
    buf: Vec<u8>,
}

impl LocalSession {
    fn copy_into(&mut self, contents: &mut dyn Read, out: &mut impl Write) -> Result<u64> {
        let mut written = 0_u64;
        loop {
            let n = match contents.read(&mut self.buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("read source"),
            };
            out.write_all(&self.buf[..n]).context("write object")?;
            written += n as u64;
        }
        out.flush().context("flush object")?;
        Ok(written)
    }
}

impl StorageSink for LocalSession {
    fn put(&mut self, destination: &str, key: &str, contents: &mut dyn Read) -> Result<u64> {
        let final_path = self.store.object_path(destination, key)?;
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let mut part_name = final_path.as_os_str().to_owned();
        part_name.push(PART_SUFFIX);
        let part_path = PathBuf::from(part_name);

        let file = File::create(&part_path)
            .with_context(|| format!("create {}", part_path.display()))?;
        let mut out = BufWriter::new(file);
        let written = match self.copy_into(contents, &mut out) {
            Ok(n) => n,
            Err(e) => {
                drop(out);
                let _ = fs::remove_file(&part_path);
                return Err(e);
            }
        };
        drop(out);
        if let Err(e) = fs::rename(&part_path, &final_path) {
            let _ = fs::remove_file(&part_path);
            return Err(e).with_context(|| {
                format!(
                    "rename {} -> {}",
                    part_path.display(),
                    final_path.display()
                )
            });
        }
        Ok(written)
    }
}
