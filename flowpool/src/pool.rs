//! # Pool (Dispatcher)
//!
//! The pool owns N (queue, signal, worker thread) triples, N fixed at
//! construction. Submissions and steals both run the same bounded placement
//! scan over the queues; whichever queue accepts a submission gets its
//! worker's signal notified.
//!
//! ## Key Concepts
//! - Distributed queues: one mutex-guarded FIFO per worker, no global lock
//! - Work stealing: any thread pops from any queue, own index first
//! - Helper-stealing await: awaiters drain the pool instead of blocking
//!
//! ## Ordering
//! FIFO holds within one queue only. Placement may route a submission to any
//! of the candidate queues, so there is no global submission order, only
//! "eventually executed" (modulo the shutdown limitation on `Drop`).

use std::sync::Arc;

use tracing::{debug, error};

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::placement::Placement;
use crate::queue::{TaskQueue, TryPop};
use crate::signal::Signal;
use crate::task::{Slot, Task, TaskHandle};
use crate::worker::Worker;

/// Shared state of a pool: the queues, the signals, and the placement
/// strategy. Workers and task handles keep it alive through an `Arc`, so an
/// awaiter can still steal work after the owning [`Pool`] was dropped.
pub(crate) struct PoolCore {
    queues: Box<[TaskQueue]>,
    signals: Box<[Signal]>,
    placement: Placement,
}

impl PoolCore {
    fn new(size: usize) -> Self {
        Self {
            queues: (0..size).map(|_| TaskQueue::new()).collect(),
            signals: (0..size).map(|_| Signal::new()).collect(),
            placement: Placement::new(size),
        }
    }

    pub(crate) fn placement(&self) -> Placement {
        self.placement
    }

    pub(crate) fn signal(&self, index: usize) -> &Signal {
        &self.signals[index]
    }

    /// Places a task on some queue and notifies that queue's worker.
    ///
    /// Probes up to `4N` queues with the non-blocking push, starting at this
    /// thread's decorrelated index; if every probe loses the lock race, falls
    /// back to a blocking push on the start index so submission can never
    /// starve.
    pub(crate) fn submit(&self, task: Task) {
        let start = self.placement.decorrelated_start();
        let mut task = task;
        for index in self.placement.probe(start) {
            task = match self.queues[index].try_push(task) {
                Ok(()) => {
                    self.signals[index].notify();
                    return;
                }
                Err(task) => task,
            };
        }
        self.queues[start].push(task);
        self.signals[start].notify();
    }

    /// Pops a task from some queue, probing `4N` candidates from `start` and
    /// falling back to a blocking pop on `start`. Returns `None` when nothing
    /// is queued right now.
    pub(crate) fn steal(&self, start: usize) -> Option<Task> {
        for index in self.placement.probe(start) {
            if let TryPop::Task(task) = self.queues[index].try_pop() {
                return Some(task);
            }
        }
        self.queues[start].pop()
    }
}

/// A fixed-size worker-thread pool.
///
/// Callbacks submitted via [`submit`](Self::submit) return a
/// [`TaskHandle`] whose [`join`](TaskHandle::join) retrieves the result;
/// [`submit_detached`](Self::submit_detached) is the fire-and-forget path.
/// Both may be called concurrently from any number of threads.
///
/// Dropping the pool (or calling [`shutdown`](Self::shutdown)) signals every
/// worker, then joins them. Each worker performs at most one more pop-execute
/// cycle after observing shutdown, so tasks still queued at that moment may be
/// dropped without running.
pub struct Pool {
    core: Arc<PoolCore>,
    workers: Vec<Worker>,
}

impl Pool {
    /// Creates a pool with `size` worker threads and default configuration
    /// otherwise.
    pub fn new(size: usize) -> Result<Self, PoolError> {
        Self::with_config(PoolConfig {
            size,
            ..PoolConfig::default()
        })
    }

    /// Creates a pool from an explicit configuration.
    ///
    /// If any worker thread fails to start, every worker that already started
    /// is shut down and joined before the error is returned; a partially
    /// constructed pool is never exposed.
    pub fn with_config(config: PoolConfig) -> Result<Self, PoolError> {
        if config.size == 0 {
            return Err(PoolError::InvalidSize);
        }
        let core = Arc::new(PoolCore::new(config.size));
        let mut workers: Vec<Worker> = Vec::with_capacity(config.size);
        for index in 0..config.size {
            match Worker::spawn(index, Arc::clone(&core), &config.thread_name_prefix) {
                Ok(worker) => workers.push(worker),
                Err(source) => {
                    error!(index, error = %source, "failed to spawn worker thread");
                    for worker in &workers {
                        core.signal(worker.index()).notify_shutdown();
                    }
                    for worker in &mut workers {
                        worker.join();
                    }
                    return Err(PoolError::ThreadSpawn { index, source });
                }
            }
        }
        debug!(size = config.size, "pool started");
        Ok(Self { core, workers })
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Submits a callback whose result the caller wants back later.
    pub fn submit<F, R>(&self, f: F) -> TaskHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let slot = Arc::new(Slot::new());
        self.core.submit(Task::awaited(f, Arc::clone(&slot)));
        TaskHandle::new(slot, Arc::clone(&self.core))
    }

    /// Submits a fire-and-forget callback. The pool drops the task right
    /// after its single execution; the caller can never reference it again.
    pub fn submit_detached<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.core.submit(Task::detached(f));
    }

    /// Shuts the pool down: signals every worker, then joins them all.
    ///
    /// Equivalent to dropping the pool, just explicit at the call site. Tasks
    /// still queued when shutdown is signaled are not guaranteed to run.
    pub fn shutdown(self) {
        // teardown runs in Drop
    }

    fn shutdown_workers(&mut self) {
        for worker in &self.workers {
            self.core.signal(worker.index()).notify_shutdown();
        }
        for worker in &mut self.workers {
            worker.join();
        }
        debug!(size = self.workers.len(), "pool stopped");
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        self.shutdown_workers();
    }
}
