//! # Threading Configuration
//!
//! Rayon thread pool setup. Variant and gene steps run on the global pool;
//! batch runs may get a dedicated pool so concurrent analyses do not starve
//! each other's record-level parallelism.

use crate::error::{Result, RexomiserError};

/// Configure the global rayon pool. Returns the effective thread count.
///
/// A pool that was already initialised (tests, embedding applications) is
/// kept as-is.
pub fn configure_global_pool(n_threads: usize) -> usize {
    if rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .thread_name(|i| format!("rexomiser-worker-{}", i))
        .build_global()
        .is_err()
    {
        tracing::debug!("Global thread pool already initialised");
    }
    rayon::current_num_threads()
}

/// Create a dedicated thread pool.
pub fn build_thread_pool(n_threads: usize) -> Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .thread_name(|i| format!("rexomiser-batch-{}", i))
        .build()
        .map_err(|e| RexomiserError::config(format!("Failed to create thread pool: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_thread_pool() {
        let pool = build_thread_pool(2).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
        let sum: u32 = pool.install(|| {
            use rayon::prelude::*;
            (1..=10u32).into_par_iter().sum()
        });
        assert_eq!(sum, 55);
    }
}
