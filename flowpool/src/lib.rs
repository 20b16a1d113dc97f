// Flowpool
//
// A fixed-size worker-thread pool. Submitted callbacks run asynchronously on
// dedicated OS threads; callers either keep a future-like handle and retrieve
// the result later, or fire-and-forget. Each worker owns a mutex-guarded FIFO
// queue and a counting wake signal; submissions and steals are spread across
// the pool by a bounded randomized probe, and an awaiting caller executes
// other pending tasks instead of blocking idle.

pub mod config;
pub mod error;
pub mod logging;
pub mod pool;

mod placement;
mod queue;
mod signal;
mod task;
mod worker;

// Re-export commonly used types
pub use config::PoolConfig;
pub use error::PoolError;
pub use pool::Pool;
pub use task::TaskHandle;
