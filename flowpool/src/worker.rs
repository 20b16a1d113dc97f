//! # Worker Threads
//!
//! Each worker is one OS thread bound 1:1 to a signal channel, participating
//! in every queue of the pool.
//!
//! ## Core Algorithm
//! 1. Wait on the worker's own signal for a wake (or shutdown)
//! 2. Run the placement scan in pop mode, starting at the worker's own index
//! 3. Execute the task if one came back
//! 4. Repeat; after observing drained-and-shutting-down, perform exactly one
//!    more pop-execute cycle and exit
//!
//! Tasks still queued anywhere in the pool when shutdown is signaled are not
//! guaranteed to run; that limitation is part of the pool's shutdown contract.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{error, trace};

use crate::pool::PoolCore;

/// States a worker moves through, in order. The transition into `Draining`
/// happens when the worker's signal reports drained-and-shutting-down and
/// lasts for exactly one more pop-execute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerState {
    Running,
    Draining,
    Stopped,
}

pub(crate) struct Worker {
    index: usize,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    /// Starts the worker thread. The thread is named `"<prefix>-<index>"`.
    pub(crate) fn spawn(index: usize, core: Arc<PoolCore>, name_prefix: &str) -> io::Result<Self> {
        let thread = thread::Builder::new()
            .name(format!("{name_prefix}-{index}"))
            .spawn(move || worker_loop(index, core))?;
        Ok(Self {
            index,
            thread: Some(thread),
        })
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    /// Waits for the worker thread to exit. Safe to call more than once.
    pub(crate) fn join(&mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                // tasks run under catch_unwind, so this indicates a bug in the
                // pool itself rather than in a user callback
                error!(index = self.index, "worker thread terminated by panic");
            }
        }
    }
}

fn worker_loop(index: usize, core: Arc<PoolCore>) {
    let span = crate::worker_span!(index);
    let _guard = span.enter();
    trace!("worker running");
    let mut state = WorkerState::Running;
    while state == WorkerState::Running {
        if core.signal(index).wait_and_consume() {
            state = WorkerState::Draining;
            trace!("worker draining");
        }
        if let Some(task) = core.steal(index) {
            task.run();
        }
    }
    state = WorkerState::Stopped;
    trace!(?state, "worker exiting");
}
