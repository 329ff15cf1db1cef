//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::GradeError;
use crate::parallel::{DEFAULT_PARALLEL_THRESHOLD, ExecContext};

/// Default number of spare output buffers kept for reuse.
const DEFAULT_POOL_CAPACITY: usize = 4;

/// Runtime configuration for the grading engine.
///
/// `Default` reads `LUTSTUDIO_THREADS`, `LUTSTUDIO_PARALLEL_THRESHOLD` and
/// `LUTSTUDIO_POOL_CAPACITY`; unset or unparsable values fall back to the
/// built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads for regrade jobs. `0` lets rayon pick.
    pub worker_threads: usize,
    /// Pixel count at which passes go parallel.
    pub parallel_threshold: usize,
    /// Spare output buffers retained by the buffer pool.
    pub pool_capacity: usize,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            worker_threads: env_or("LUTSTUDIO_THREADS", 0),
            parallel_threshold: env_or("LUTSTUDIO_PARALLEL_THRESHOLD", DEFAULT_PARALLEL_THRESHOLD),
            pool_capacity: env_or("LUTSTUDIO_POOL_CAPACITY", DEFAULT_POOL_CAPACITY),
        }
    }
}

impl EngineConfig {
    /// Execution settings without a cancel token.
    pub fn exec(&self) -> ExecContext<'static> {
        ExecContext {
            parallel_threshold: self.parallel_threshold,
            cancel: None,
        }
    }

    /// Build the worker pool regrade jobs run on.
    pub fn build_thread_pool(&self) -> Result<rayon::ThreadPool, GradeError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_threads)
            .thread_name(|i| format!("lutstudio-grade-{i}"))
            .build()?;
        tracing::debug!(threads = pool.current_num_threads(), "built grading thread pool");
        Ok(pool)
    }
}
