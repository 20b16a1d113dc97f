/// Configuration for a [`Pool`](crate::Pool).
///
/// The pool size is fixed for the lifetime of the pool; there is no runtime
/// growth or shrink.
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Number of worker threads. Must be at least 1.
    pub size: usize,

    /// Prefix for worker thread names; workers are named `"<prefix>-<index>"`.
    /// Thread names show up in debuggers and profilers.
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            size: num_cpus::get(),
            thread_name_prefix: "flowpool-worker".to_string(),
        }
    }
}
