//! Background task execution seam.
//!
//! The job queue and the bookmark pipeline schedule their I/O through a
//! [`TaskRunner`] rather than spawning threads directly. Production code uses
//! [`ThreadRunner`]; tests substitute a deterministic runner that holds tasks
//! until pumped.

use std::sync::Arc;

/// A boxed unit of background work.
pub type Task = Box<dyn FnOnce() + Send>;

/// Executes background tasks on behalf of the core components.
///
/// `spawn` must not block the caller; the task runs later, possibly on
/// another thread. The core never relies on tasks sharing a thread.
pub trait TaskRunner: Send + Sync {
    /// Schedule a task for execution.
    fn spawn(&self, task: Task);
}

/// Default runner: one OS thread per task.
///
/// File-operation jobs and bookmark I/O are rare and long-lived enough that
/// a pool is not worth carrying here.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRunner;

impl TaskRunner for ThreadRunner {
    fn spawn(&self, task: Task) {
        let result = std::thread::Builder::new()
            .name("fm-core-worker".to_string())
            .spawn(task);

        if let Err(e) = result {
            tracing::error!("failed to spawn worker thread: {e}");
        }
    }
}

/// Shared handle to a task runner.
pub type RunnerHandle = Arc<dyn TaskRunner>;
