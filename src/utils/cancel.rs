//! Cooperative cancellation shared between the caller and a running pipeline.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable stop flag. Raising it makes the dispatcher stop sending and workers
/// exit after their current item; the run then returns `Cancelled`.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Raise `token` on Ctrl+C. Can only be installed once per process.
pub fn cancel_on_ctrlc(token: &CancelToken) -> Result<()> {
    let handler_token = token.clone();
    ctrlc::set_handler(move || {
        log::warn!("Ctrl+C received; finishing in-flight uploads...");
        handler_token.cancel();
    })
    .context("set Ctrl+C handler")
}
