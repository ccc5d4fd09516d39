//! Dry-run store: reads every source fully, keeps nothing.

use anyhow::{Context, Result};
use std::io::Read;

use super::{StorageConnect, StorageSink};

#[derive(Clone, Copy, Debug, Default)]
pub struct NullStore;

impl StorageConnect for NullStore {
    type Sink = NullStore;

    fn connect(&self) -> Result<NullStore> {
        Ok(NullStore)
    }

    fn object_url(&self, destination: &str, key: &str) -> String {
        format!("null://{destination}/{key}")
    }
}

impl StorageSink for NullStore {
    fn put(&mut self, _destination: &str, _key: &str, contents: &mut dyn Read) -> Result<u64> {
        std::io::copy(contents, &mut std::io::sink()).context("read source")
    }
}
