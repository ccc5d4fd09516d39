//! Shared test doubles: recording store, failing store, in-memory manifests, source dirs.
#![allow(dead_code)]

use anyhow::{Result, bail};
use fanload::{ManifestSink, StorageConnect, StorageSink};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Shared record of stored objects: `(destination, key)` → contents.
pub type Objects = Arc<Mutex<HashMap<(String, String), Vec<u8>>>>;

/// Store that keeps objects in memory and can fail the N-th `put` (1-based, by call order).
#[derive(Clone, Default)]
pub struct TestStore {
    pub objects: Objects,
    pub puts: Arc<AtomicUsize>,
    pub connects: Arc<AtomicUsize>,
    pub fail_on_put: Option<usize>,
    pub fail_keys: Vec<String>,
    pub fail_connect: bool,
}

impl TestStore {
    pub fn failing_on(n: usize) -> Self {
        Self {
            fail_on_put: Some(n),
            ..Self::default()
        }
    }

    pub fn failing_keys(keys: &[&str]) -> Self {
        Self {
            fail_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn stored_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }
}

pub struct TestSession {
    store: TestStore,
}

impl StorageConnect for TestStore {
    type Sink = TestSession;

    fn connect(&self) -> Result<TestSession> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect {
            bail!("connection refused");
        }
        Ok(TestSession {
            store: self.clone(),
        })
    }

    fn object_url(&self, destination: &str, key: &str) -> String {
        format!("test://{destination}/{key}")
    }
}

impl StorageSink for TestSession {
    fn put(&mut self, destination: &str, key: &str, contents: &mut dyn Read) -> Result<u64> {
        let n = self.store.puts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.store.fail_on_put == Some(n) || self.store.fail_keys.iter().any(|k| k == key) {
            bail!("injected failure on put #{n} ({key})");
        }
        let mut buf = Vec::new();
        contents.read_to_end(&mut buf)?;
        let len = buf.len() as u64;
        self.store
            .objects
            .lock()
            .unwrap()
            .insert((destination.to_string(), key.to_string()), buf);
        Ok(len)
    }
}

/// Manifest kept in memory; optionally fails the N-th append (1-based).
#[derive(Default)]
pub struct VecManifest {
    pub rows: Vec<Vec<String>>,
    pub flushes: usize,
    pub fail_on_append: Option<usize>,
}

impl ManifestSink for VecManifest {
    fn append_row(&mut self, fields: &[&str]) -> Result<()> {
        if self.fail_on_append == Some(self.rows.len() + 1) {
            bail!("disk full");
        }
        self.rows
            .push(fields.iter().map(|f| f.to_string()).collect());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

impl VecManifest {
    pub fn references(&self) -> Vec<String> {
        let mut refs: Vec<String> = self.rows.iter().map(|r| r[0].clone()).collect();
        refs.sort();
        refs
    }
}

/// Temp dir with `n` files named `img_00.jpg`, `img_01.jpg`, ...
pub fn source_dir(n: usize) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..n {
        write_file(dir.path(), &format!("img_{i:02}.jpg"), &format!("bytes of {i}"));
    }
    dir
}

pub fn write_file(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}
