//! Bounded worker pool for per-role tasks.

use crate::config::RuntimeConfig;
use crate::error::{InsightError, Result};
use rayon::prelude::*;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, warn};

/// Deadline and cancellation flag of one task. Long-running work calls
/// [`TaskDeadline::check`] between units of work.
#[derive(Debug, Clone)]
pub struct TaskDeadline {
    started: Instant,
    timeout: Option<Duration>,
    cancelled: Arc<AtomicBool>,
}

impl TaskDeadline {
    pub fn new(timeout: Duration, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            started: Instant::now(),
            timeout: Some(timeout),
            cancelled,
        }
    }

    /// Never expires and cannot be cancelled.
    pub fn unlimited() -> Self {
        Self {
            started: Instant::now(),
            timeout: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn check(&self, what: &str) -> Result<()> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Err(InsightError::timeout(format!("{what}: cancelled")));
        }
        if let Some(timeout) = self.timeout {
            if self.started.elapsed() > timeout {
                return Err(InsightError::timeout(format!(
                    "{what}: exceeded {:.1}s deadline",
                    timeout.as_secs_f64()
                )));
            }
        }
        Ok(())
    }
}

pub struct RoleWorkerPool {
    pool: rayon::ThreadPool,
    timeout: Duration,
    cancelled: Arc<AtomicBool>,
}

impl RoleWorkerPool {
    /// `threads == 0` lets rayon pick one thread per core.
    pub fn new(threads: usize, timeout: Duration) -> Result<Self> {
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|i| format!("shortage-worker-{i}"));
        if threads > 0 {
            builder = builder.num_threads(threads);
        }
        let pool = builder
            .build()
            .map_err(|e| InsightError::internal(format!("failed to build worker pool: {e}")))?;
        Ok(Self {
            pool,
            timeout,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn from_config(runtime: &RuntimeConfig) -> Result<Self> {
        Self::new(
            runtime.worker_threads,
            Duration::from_secs(runtime.task_timeout_secs),
        )
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Makes every running and future task fail its next deadline check
    /// until [`RoleWorkerPool::reset`].
    pub fn cancel(&self) {
        warn!("Cancelling outstanding role tasks");
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Clears a previous [`RoleWorkerPool::cancel`] so new tasks run again.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Applies `f` to every item in parallel. Output order follows input order.
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync,
    {
        self.pool.install(|| items.par_iter().map(&f).collect())
    }

    /// Runs a fallible task per item with its own deadline. A panicking task
    /// yields an `Internal` error for that item only.
    pub fn run_each<T, R, F>(&self, items: &[T], f: F) -> Vec<Result<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T, &TaskDeadline) -> Result<R> + Sync,
    {
        self.pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    let deadline = TaskDeadline::new(self.timeout, Arc::clone(&self.cancelled));
                    match panic::catch_unwind(AssertUnwindSafe(|| f(item, &deadline))) {
                        Ok(result) => result,
                        Err(payload) => {
                            let msg = panic_message(payload.as_ref());
                            error!(panic = %msg, "Role task panicked");
                            Err(InsightError::internal(format!("task panicked: {msg}")))
                        }
                    }
                })
                .collect()
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
