//! Pipeline channels and the shared run state (stop flag, first error, recorded failures).

use crossbeam_channel::{Receiver, Sender, bounded};
use log::warn;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::PipelineError;
use crate::utils::CancelToken;
use crate::{ErrorPolicy, RunSummary, UploadResult, WorkItem};

/// Both handoff points of a run. Zero capacity: every send waits for a receiver,
/// so the source never runs ahead of idle workers and workers never run ahead of the writer.
pub struct PipelineChannels {
    pub item_tx: Sender<WorkItem>,
    pub item_rx: Receiver<WorkItem>,
    pub result_tx: Sender<UploadResult>,
    pub result_rx: Receiver<UploadResult>,
}

pub fn create_pipeline_channels() -> PipelineChannels {
    let (item_tx, item_rx) = bounded::<WorkItem>(0);
    let (result_tx, result_rx) = bounded::<UploadResult>(0);
    PipelineChannels {
        item_tx,
        item_rx,
        result_tx,
        result_rx,
    }
}

/// Whether a worker keeps pulling items after a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// State shared by reference between the dispatcher, the workers and the writer.
pub struct RunState {
    policy: ErrorPolicy,
    cancel: CancelToken,
    stop: AtomicBool,
    first_error: Mutex<Option<PipelineError>>,
    failed: Mutex<Vec<(PathBuf, String)>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RunState {
    pub fn new(policy: ErrorPolicy, cancel: CancelToken) -> Self {
        Self {
            policy,
            cancel,
            stop: AtomicBool::new(false),
            first_error: Mutex::new(None),
            failed: Mutex::new(Vec::new()),
        }
    }

    /// True once a fatal error was recorded or the caller cancelled.
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed) || self.cancel.is_cancelled()
    }

    /// Record an error that ends the run. Only the first one is kept.
    pub fn record_fatal(&self, err: PipelineError) {
        let mut slot = lock(&self.first_error);
        if slot.is_none() {
            *slot = Some(err);
        } else {
            warn!("additional error after run was stopped: {err}");
        }
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Record a failed upload according to the error policy.
    pub fn record_upload_failure(&self, err: PipelineError) -> Flow {
        match self.policy {
            ErrorPolicy::FailFast => {
                self.record_fatal(err);
                Flow::Stop
            }
            ErrorPolicy::Continue => {
                let path = match &err {
                    PipelineError::Upload { path, .. } => path.clone(),
                    _ => PathBuf::new(),
                };
                let msg = format!("{:#}", anyhow::Error::from(err));
                warn!("{msg}");
                lock(&self.failed).push((path, msg));
                Flow::Continue
            }
        }
    }

    /// Collapse the run into its terminal result. Call after every thread is joined.
    pub fn finish(self, dispatched: usize, uploaded: usize) -> Result<RunSummary, PipelineError> {
        let first_error = self
            .first_error
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(err) = first_error {
            return Err(err);
        }
        if self.cancel.is_cancelled() {
            return Err(PipelineError::Cancelled { uploaded });
        }
        let failed = self
            .failed
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if !failed.is_empty() {
            for (path, msg) in &failed {
                warn!("  failed: {} ({})", path.display(), msg);
            }
            return Err(PipelineError::Incomplete {
                failed: failed.len(),
                uploaded,
            });
        }
        Ok(RunSummary {
            dispatched,
            uploaded,
        })
    }
}
