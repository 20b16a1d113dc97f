use std::collections::VecDeque;
use std::sync::{Mutex, TryLockError};

use crate::task::Task;

/// Outcome of a non-blocking pop attempt.
///
/// `Empty` and `Busy` are distinguished internally, but callers treat both as
/// "no task available right now" and move on to the next candidate queue.
pub(crate) enum TryPop {
    Task(Task),
    Empty,
    Busy,
}

/// A per-worker FIFO of pending tasks behind a single mutex.
///
/// Tasks enter at the tail and leave at the head. Every operation comes in a
/// `try` flavor (acquire the lock only if it is immediately free) and a forced
/// flavor (acquire unconditionally). An empty queue is a valid steady state;
/// popping never blocks on emptiness.
pub(crate) struct TaskQueue {
    inner: Mutex<VecDeque<Task>>,
}

impl TaskQueue {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(VecDeque::new()),
        }
    }

    /// Appends the task if the lock is immediately available, otherwise hands
    /// it back to the caller.
    pub(crate) fn try_push(&self, task: Task) -> Result<(), Task> {
        match self.inner.try_lock() {
            Ok(mut queue) => {
                queue.push_back(task);
                Ok(())
            }
            Err(TryLockError::WouldBlock) => Err(task),
            Err(TryLockError::Poisoned(poisoned)) => {
                panic!("work queue mutex poisoned: {poisoned}")
            }
        }
    }

    /// Appends the task, waiting for the lock if necessary.
    pub(crate) fn push(&self, task: Task) {
        self.inner.lock().unwrap().push_back(task);
    }

    /// Removes the head task if the lock is immediately available.
    pub(crate) fn try_pop(&self) -> TryPop {
        match self.inner.try_lock() {
            Ok(mut queue) => match queue.pop_front() {
                Some(task) => TryPop::Task(task),
                None => TryPop::Empty,
            },
            Err(TryLockError::WouldBlock) => TryPop::Busy,
            Err(TryLockError::Poisoned(poisoned)) => {
                panic!("work queue mutex poisoned: {poisoned}")
            }
        }
    }

    /// Removes the head task, waiting for the lock if necessary. Returns
    /// `None` immediately after acquiring the lock on an empty queue.
    pub(crate) fn pop(&self) -> Option<Task> {
        self.inner.lock().unwrap().pop_front()
    }
}
