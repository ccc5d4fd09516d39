//! Serial writer: the only consumer of the result channel and the only user of the manifest.

use crossbeam_channel::Receiver;
use log::debug;

use super::context::RunState;
use crate::UploadResult;
use crate::error::PipelineError;
use crate::sink::{ManifestSink, StorageConnect};

/// Progress callback invoked with the number of rows just appended.
pub type RowCallback = dyn Fn(usize) + Send + Sync;

/// Parameters for [`run_writer_loop`].
pub struct WriterParams<'a, C: StorageConnect> {
    pub connector: &'a C,
    pub destination: &'a str,
    pub state: &'a RunState,
    pub on_row: Option<&'a RowCallback>,
}

/// Append one `(reference, label)` row per result, in delivery order, until the
/// result channel is closed and drained; then flush. Returns rows appended.
///
/// A failed append is fatal: the writer flushes what it has and returns, which
/// disconnects the channel so blocked workers see the failure on their next send.
pub fn run_writer_loop<M, C>(
    result_rx: Receiver<UploadResult>,
    manifest: &mut M,
    params: WriterParams<'_, C>,
) -> usize
where
    M: ManifestSink,
    C: StorageConnect,
{
    let mut rows = 0_usize;
    for result in result_rx.iter() {
        let reference = params.connector.object_url(params.destination, &result.key);
        if let Err(source) = manifest.append_row(&[reference.as_str(), result.label.as_str()]) {
            params.state.record_fatal(PipelineError::Write { source });
            let _ = manifest.flush();
            return rows;
        }
        rows += 1;
        if let Some(cb) = params.on_row {
            cb(1);
        }
    }
    debug!("writer: channel closed, {rows} rows appended");
    if let Err(source) = manifest.flush() {
        params.state.record_fatal(PipelineError::Write { source });
    }
    rows
}
