use log::{debug, warn};
use std::thread::{self, ScopedJoinHandle};

use super::context::{RunState, create_pipeline_channels};
use super::dispatch::run_dispatch_loop;
use super::worker::spawn_upload_workers;
use super::writer::{RowCallback, WriterParams, run_writer_loop};
use crate::error::PipelineError;
use crate::sink::{ManifestSink, StorageConnect};
use crate::utils::CancelToken;
use crate::{PipelineConfig, RunSummary, WorkItem};

/// Join every worker. A panicked worker is recorded as fatal.
fn join_workers(handles: Vec<ScopedJoinHandle<'_, ()>>, state: &RunState) {
    for h in handles {
        if h.join().is_err() {
            state.record_fatal(PipelineError::WorkerPanicked("upload worker"));
        }
    }
}

/// Main orchestrator: items → item channel → N workers (upload) → result channel → writer → manifest.
///
/// Workers and the writer start before the first item is sent; dispatch runs on the
/// calling thread. Shutdown is two-phase: the item channel closes when dispatch ends,
/// every worker is joined, and only then is the last result sender dropped so the
/// writer can drain, flush and be joined. Every thread is joined on every path.
pub fn run_pipeline<I, C, M>(
    items: I,
    config: &PipelineConfig,
    connector: &C,
    manifest: &mut M,
    cancel: &CancelToken,
    on_row: Option<&RowCallback>,
) -> Result<RunSummary, PipelineError>
where
    I: IntoIterator<Item = WorkItem>,
    C: StorageConnect,
    M: ManifestSink + Send,
{
    let num_workers = if config.workers == 0 {
        warn!("worker count 0 is invalid; using 1");
        1
    } else {
        config.workers
    };
    let state = RunState::new(config.error_policy, cancel.clone());
    let channels = create_pipeline_channels();
    let destination = config.destination.as_str();

    let (dispatched, uploaded) = thread::scope(|scope| {
        let result_rx = channels.result_rx;
        let state = &state;
        let writer_handle = scope.spawn(move || {
            run_writer_loop(
                result_rx,
                manifest,
                WriterParams {
                    connector,
                    destination,
                    state,
                    on_row,
                },
            )
        });

        let worker_handles = spawn_upload_workers(
            scope,
            num_workers,
            connector,
            &channels.item_rx,
            &channels.result_tx,
            destination,
            state,
        );
        drop(channels.item_rx);
        debug!("started {num_workers} workers and 1 writer");

        let dispatched = run_dispatch_loop(channels.item_tx, items, state);
        debug!("dispatch done ({dispatched} items); item channel closed");

        join_workers(worker_handles, state);
        // Safe to close: no worker can send any more.
        drop(channels.result_tx);
        debug!("workers joined; result channel closed");

        let uploaded = writer_handle.join().unwrap_or_else(|_| {
            state.record_fatal(PipelineError::WorkerPanicked("manifest writer"));
            0
        });
        (dispatched, uploaded)
    });

    state.finish(dispatched, uploaded)
}
