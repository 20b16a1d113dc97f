use std::io;
use thiserror::Error;

/// Errors surfaced while constructing a [`Pool`](crate::Pool).
///
/// Submission itself is infallible; the only observable failure points are the
/// constructor arguments and worker thread creation. Lock contention is an
/// internal retry signal, never an error.
#[derive(Error, Debug)]
pub enum PoolError {
    /// A pool needs at least one worker thread.
    #[error("pool size must be at least 1")]
    InvalidSize,

    /// The operating system refused to start a worker thread. Every worker
    /// that had already started has been shut down and joined before this is
    /// returned; a partially constructed pool is never exposed.
    #[error("failed to spawn worker thread {index}: {source}")]
    ThreadSpawn {
        index: usize,
        #[source]
        source: io::Error,
    },
}
