//! Rayon thread pool sizing for multi-layer runs.
//!
//! Layers are independent, so [crate::optimizer::optimize_layers] can spread them across
//! workers. Each layer still runs single-threaded on its own grid.

use rayon::ThreadPoolBuilder;

/// Configures how many worker threads process layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    /// Number of worker threads. 0 means the Rayon default (num_cpus); 1 means sequential.
    pub workers: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self { workers: 0 }
    }
}

impl WorkerPool {
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    pub fn sequential() -> Self {
        Self { workers: 1 }
    }

    /// Reads `TILECLIMB_WORKERS`; unset or unparsable falls back to the Rayon default.
    pub fn from_env() -> Self {
        match std::env::var("TILECLIMB_WORKERS") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(workers) => Self::with_workers(workers),
                Err(_) => {
                    log::warn!("invalid TILECLIMB_WORKERS '{raw}', using all cores");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn is_sequential(&self) -> bool {
        self.workers == 1
    }

    /// Runs `f` on a pool with this worker count. With 0 workers, or if a dedicated pool
    /// cannot be built, `f` runs on the global Rayon pool.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                log::warn!(
                    "could not build a {}-thread pool ({err}), using the global pool",
                    self.workers
                );
                f()
            }
        }
    }
}
