//! Dispatch loop: hand items one at a time to idle workers.

use crossbeam_channel::Sender;
use log::debug;

use super::context::RunState;
use crate::WorkItem;

/// Send every item on `item_tx` until the items run out, the run is stopped, or no
/// worker is left to receive. Drops `item_tx` on return, which closes the item channel.
/// Returns the number of items handed to a worker.
pub fn run_dispatch_loop<I>(item_tx: Sender<WorkItem>, items: I, state: &RunState) -> usize
where
    I: IntoIterator<Item = WorkItem>,
{
    let mut count = 0_usize;
    for item in items {
        if state.should_stop() {
            debug!("dispatch: stop requested after {count} items");
            break;
        }
        // Blocks until a worker is ready; errors only when every worker has exited.
        if item_tx.send(item).is_err() {
            debug!("dispatch: no workers left after {count} items");
            break;
        }
        count += 1;
    }
    drop(item_tx);
    count
}
