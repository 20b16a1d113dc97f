//! # Tasks and Task Handles
//!
//! A task is a unit of deferred work: a type-erased `FnOnce` that some worker
//! (or a helping awaiter) executes exactly once. Ownership of the closure
//! moves into the queue and back out exactly once, so "whoever executes it
//! frees it" is ordinary drop semantics rather than a convention.
//!
//! ## Key Concepts
//! - Detached task: runs and is dropped; nobody can observe its result
//! - Awaited task: publishes its outcome into a shared completion slot
//! - Helper-stealing wait: `TaskHandle::join` executes other pending tasks
//!   instead of blocking idly

use std::cell::UnsafeCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;

use tracing::error;

use crate::pool::PoolCore;

const PENDING: u8 = 0;
const DONE: u8 = 1;

/// One-shot completion slot shared between the executor and the awaiter.
///
/// The state field carries the whole synchronization: the executor writes the
/// outcome, then stores `DONE` with `Release`; the awaiter observes `DONE`
/// with `Acquire` and only then reads the outcome. Exactly one thread writes,
/// exactly one thread reads afterwards, so no lock is needed on the slot.
pub(crate) struct Slot<R> {
    state: AtomicU8,
    outcome: UnsafeCell<Option<thread::Result<R>>>,
}

// Safety: the outcome cell is written once by the executing thread before the
// Release store of DONE, and read once by the single awaiter after an Acquire
// load of DONE. The state machine never allows concurrent access to the cell.
unsafe impl<R: Send> Sync for Slot<R> {}

impl<R> Slot<R> {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(PENDING),
            outcome: UnsafeCell::new(None),
        }
    }

    /// Publishes the outcome. Must be called at most once; a second call is a
    /// contract violation and aborts via panic.
    pub(crate) fn complete(&self, outcome: thread::Result<R>) {
        // Safety: sole writer. The task closure owning the only other handle
        // to this slot is FnOnce, so a competing write cannot exist.
        unsafe {
            *self.outcome.get() = Some(outcome);
        }
        let previous = self.state.swap(DONE, Ordering::Release);
        assert_eq!(previous, PENDING, "completion slot published twice");
    }

    pub(crate) fn is_done(&self) -> bool {
        self.state.load(Ordering::Acquire) == DONE
    }

    /// Takes the published outcome. Only valid after `is_done` returned true,
    /// and only once.
    pub(crate) fn take(&self) -> thread::Result<R> {
        debug_assert!(self.is_done());
        // Safety: DONE was observed with Acquire, so the executor's write
        // happened-before this read, and the single-awaiter contract means no
        // other thread touches the cell from here on.
        let outcome = unsafe { (*self.outcome.get()).take() };
        outcome.expect("task result taken twice")
    }
}

/// A queued unit of work. Move-only; executing it consumes it.
pub(crate) struct Task {
    run: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    /// A fire-and-forget task. A panicking callback is caught and logged so
    /// it cannot take the executing worker down with it.
    pub(crate) fn detached<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            run: Box::new(move || {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
                    error!(panic = panic_message(&payload), "detached task panicked");
                }
            }),
        }
    }

    /// An awaited task: the callback's outcome, panic included, lands in the
    /// completion slot for the awaiter to pick up.
    pub(crate) fn awaited<F, R>(f: F, slot: Arc<Slot<R>>) -> Self
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        Self {
            run: Box::new(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(f));
                slot.complete(outcome);
            }),
        }
    }

    pub(crate) fn run(self) {
        (self.run)()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}

/// Handle to an awaited task submitted via [`Pool::submit`](crate::Pool::submit).
///
/// The handle is the only way to observe the task's result, and joining
/// consumes it, so a task can never be awaited twice. The handle keeps the
/// pool's queues alive: joining after the pool itself was dropped still makes
/// progress, because the awaiter executes pending tasks on its own.
pub struct TaskHandle<R> {
    slot: Arc<Slot<R>>,
    core: Arc<PoolCore>,
}

impl<R> TaskHandle<R> {
    pub(crate) fn new(slot: Arc<Slot<R>>, core: Arc<PoolCore>) -> Self {
        Self { slot, core }
    }

    /// Whether the task has finished executing.
    pub fn is_done(&self) -> bool {
        self.slot.is_done()
    }

    /// Waits for the task to finish and returns its result.
    ///
    /// This does not block on a condition variable. While the task is still
    /// pending, the calling thread steals and executes other queued tasks
    /// exactly as a worker would, including, possibly, the awaited task
    /// itself. Helping instead of blocking is what keeps a pool whose workers
    /// all await each other's results from deadlocking; the cost is that the
    /// caller may run arbitrary unrelated work while it waits.
    ///
    /// If the task's callback panicked, the panic resumes on the joining
    /// thread, like [`std::thread::JoinHandle::join`] without the `Result`
    /// wrapper.
    pub fn join(self) -> R {
        while !self.slot.is_done() {
            let start = self.core.placement().decorrelated_start();
            match self.core.steal(start) {
                Some(task) => task.run(),
                None => thread::yield_now(),
            }
        }
        match self.slot.take() {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

impl<R> fmt::Debug for TaskHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("done", &self.is_done())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_publishes_once_and_is_taken_once() {
        let slot: Slot<u32> = Slot::new();
        assert!(!slot.is_done());
        slot.complete(Ok(42));
        assert!(slot.is_done());
        assert_eq!(slot.take().unwrap(), 42);
    }

    #[test]
    #[should_panic(expected = "completion slot published twice")]
    fn double_completion_is_fatal() {
        let slot: Slot<u32> = Slot::new();
        slot.complete(Ok(1));
        slot.complete(Ok(2));
    }

    #[test]
    #[should_panic(expected = "task result taken twice")]
    fn double_take_is_fatal() {
        let slot: Slot<u32> = Slot::new();
        slot.complete(Ok(1));
        let _ = slot.take();
        let _ = slot.take();
    }

    #[test]
    fn awaited_task_fills_its_slot() {
        let slot = Arc::new(Slot::new());
        let task = Task::awaited(|| 6 * 7, Arc::clone(&slot));
        task.run();
        assert_eq!(slot.take().unwrap(), 42);
    }

    #[test]
    fn awaited_panic_is_captured_in_the_slot() {
        let slot: Arc<Slot<()>> = Arc::new(Slot::new());
        let task = Task::awaited(|| panic!("boom"), Arc::clone(&slot));
        task.run();
        assert!(slot.take().is_err());
    }

    #[test]
    fn detached_panic_does_not_unwind_out_of_run() {
        let task = Task::detached(|| panic!("boom"));
        task.run();
    }
}
