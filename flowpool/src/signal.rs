use std::sync::{Condvar, Mutex};

/// Per-worker counting wake primitive with an associated shutdown flag.
///
/// Each worker owns exactly one `Signal` and is the only thread that consumes
/// it; any thread may notify it. Every `notify`/`notify_shutdown` is matched
/// by exactly one decrement in `wait_and_consume`, so a wake sent before the
/// wait begins is never lost.
pub(crate) struct Signal {
    state: Mutex<SignalState>,
    cond: Condvar,
}

#[derive(Default)]
struct SignalState {
    pending: usize,
    shutdown: bool,
}

impl Signal {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SignalState::default()),
            cond: Condvar::new(),
        }
    }

    /// Records one pending wake and wakes the owning worker if it is blocked.
    pub(crate) fn notify(&self) {
        let mut state = self.state.lock().unwrap();
        state.pending += 1;
        drop(state);
        self.cond.notify_one();
    }

    /// Like [`notify`](Self::notify), but additionally marks the channel as
    /// shutting down. Idempotent on the flag; each call still counts as one
    /// pending wake.
    pub(crate) fn notify_shutdown(&self) {
        let mut state = self.state.lock().unwrap();
        state.pending += 1;
        state.shutdown = true;
        drop(state);
        self.cond.notify_one();
    }

    /// Blocks until a wake is pending or shutdown was signaled, consumes one
    /// pending wake if there is one, and returns whether the channel is now
    /// drained and shutting down.
    pub(crate) fn wait_and_consume(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        while state.pending == 0 && !state.shutdown {
            state = self.cond.wait(state).unwrap();
        }
        if state.pending > 0 {
            state.pending -= 1;
        }
        state.pending == 0 && state.shutdown
    }
}
