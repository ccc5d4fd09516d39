//! Capabilities the pipeline consumes: object storage and the manifest.
//!
//! Workers never share a storage session: each calls [`StorageConnect::connect`] once
//! and owns the returned [`StorageSink`]. The manifest has exactly one writer, so
//! [`ManifestSink`] needs no internal locking.

pub mod csv_manifest;
pub mod local;
pub mod null;

pub use csv_manifest::CsvManifest;
pub use local::{LocalSession, LocalStore};
pub use null::NullStore;

use anyhow::Result;
use std::io::Read;

/// One storage session, owned by a single worker.
pub trait StorageSink {
    /// Stream `contents` into object `key` of `destination`. Returns bytes written.
    fn put(&mut self, destination: &str, key: &str, contents: &mut dyn Read) -> Result<u64>;
}

/// Shared factory for storage sessions. Borrowed by every worker thread.
pub trait StorageConnect: Sync {
    type Sink: StorageSink;

    fn connect(&self) -> Result<Self::Sink>;

    /// Reference written to the manifest for an uploaded object.
    fn object_url(&self, destination: &str, key: &str) -> String {
        format!("{destination}/{key}")
    }
}

/// Append-only record sink.
pub trait ManifestSink {
    fn append_row(&mut self, fields: &[&str]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

impl<M: ManifestSink + ?Sized> ManifestSink for &mut M {
    fn append_row(&mut self, fields: &[&str]) -> Result<()> {
        (**self).append_row(fields)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}
