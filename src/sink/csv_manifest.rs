use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::ManifestSink;

/// CSV manifest: one record per row, no header.
pub struct CsvManifest<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvManifest<W> {
    pub fn new(out: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_writer(out);
        Self { writer }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flush manifest: {}", e.error()))
    }
}

impl CsvManifest<File> {
    /// Create (truncate) the manifest file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("create manifest {}", path.display()))?;
        Ok(Self::new(file))
    }
}

impl<W: Write> ManifestSink for CsvManifest<W> {
    fn append_row(&mut self, fields: &[&str]) -> Result<()> {
        self.writer.write_record(fields).context("append manifest row")
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("flush manifest")
    }
}
