use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::fs::File;
use std::path::Path;
use std::thread::{Scope, ScopedJoinHandle};

use super::context::{Flow, RunState};
use crate::engine::tools::destination_key;
use crate::error::PipelineError;
use crate::sink::{StorageConnect, StorageSink};
use crate::{UploadResult, WorkItem};

/// Stream one source file into the sink.
fn upload_item<S: StorageSink>(sink: &mut S, destination: &str, key: &str, src: &Path) -> Result<u64> {
    let mut file = File::open(src).context("open source file")?;
    sink.put(destination, key, &mut file)
}

/// Single upload worker: read items from item_rx, upload, send a result on result_tx.
/// Exits when the item channel is closed and drained, the run is stopped, or the writer is gone.
fn upload_worker_loop<S: StorageSink>(
    worker_id: usize,
    mut sink: S,
    item_rx: Receiver<WorkItem>,
    result_tx: Sender<UploadResult>,
    destination: &str,
    state: &RunState,
) {
    let mut done = 0_usize;
    while let Ok(item) = item_rx.recv() {
        if state.should_stop() {
            debug!("worker {worker_id}: stop requested, dropping {}", item.path.display());
            break;
        }
        let key = destination_key(&item.label, &item.base_name);
        match upload_item(&mut sink, destination, &key, &item.path) {
            Ok(bytes) => {
                debug!(
                    "worker {worker_id}: {} -> {destination}/{key} ({bytes} bytes)",
                    item.path.display()
                );
                done += 1;
                let result = UploadResult {
                    key,
                    label: item.label,
                };
                if result_tx.send(result).is_err() {
                    break;
                }
            }
            Err(source) => {
                let err = PipelineError::Upload {
                    path: item.path,
                    key,
                    source,
                };
                if state.record_upload_failure(err) == Flow::Stop {
                    break;
                }
            }
        }
    }
    debug!("worker {worker_id}: exiting after {done} uploads");
}

/// Spawn `num_workers` upload workers in `scope`. Each opens its own storage session.
/// The caller must drop its own `item_rx` so workers are the only receivers.
pub fn spawn_upload_workers<'scope, C: StorageConnect>(
    scope: &'scope Scope<'scope, '_>,
    num_workers: usize,
    connector: &'scope C,
    item_rx: &Receiver<WorkItem>,
    result_tx: &Sender<UploadResult>,
    destination: &'scope str,
    state: &'scope RunState,
) -> Vec<ScopedJoinHandle<'scope, ()>> {
    (0..num_workers)
        .map(|worker_id| {
            let item_rx = item_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || match connector.connect() {
                Ok(sink) => {
                    upload_worker_loop(worker_id, sink, item_rx, result_tx, destination, state)
                }
                Err(source) => state.record_fatal(PipelineError::Connect { source }),
            })
        })
        .collect()
}
