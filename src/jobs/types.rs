//! Job types and handles shared with the UI layer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::events::{Signal, Subscription};

/// Kind of file operation a job performs.
///
/// Drives the admission policy: `Create` (new folder / new document) is the
/// only fast-path kind and starts immediately even while another operation
/// runs; everything else queues behind the active job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Copy,
    Move,
    Delete,
    Trash,
    Create,
}

impl OpKind {
    /// Get display string for UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Copy => "Copy",
            Self::Move => "Move",
            Self::Delete => "Delete",
            Self::Trash => "Trash",
            Self::Create => "Create",
        }
    }
}

/// Opaque caller-supplied identity for a job's operation data.
///
/// Two submissions carrying the same key are the same job; the second one is
/// rejected while the first is still queued or running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobKey(pub u64);

/// Work closure executed when a job starts. Receives the job's cancel handle.
pub type JobFn = Box<dyn FnOnce(CancelHandle) + Send>;

/// Cooperative cancellation handle for a job.
///
/// The queue never cancels jobs itself; the caller holds a clone and flips
/// it, and the work function is expected to poll `is_cancelled`.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Lifecycle state of a job's progress handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    /// Created, not yet admitted to the queue.
    Pending,
    /// Admitted, waiting for its turn.
    Queued,
    /// Work function dispatched.
    Running,
    /// Completion signal fired.
    Finished,
}

struct ProgressInner {
    state: Mutex<ProgressState>,
    finished: Signal<()>,
}

/// Shared handle representing one operation's lifecycle.
///
/// The queue uses it as the job's lookup key (pointer identity) and relies on
/// its `finished` signal firing exactly once to reap the job and advance the
/// queue. The UI observes it for progress display.
#[derive(Clone)]
pub struct ProgressHandle {
    inner: Arc<ProgressInner>,
}

impl ProgressHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ProgressInner {
                state: Mutex::new(ProgressState::Pending),
                finished: Signal::new(),
            }),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ProgressState {
        *self.inner.state.lock()
    }

    pub fn is_finished(&self) -> bool {
        self.state() == ProgressState::Finished
    }

    /// Mark the operation finished and notify observers.
    ///
    /// Idempotent: the finished signal fires only on the first call.
    pub fn finish(&self) {
        {
            let mut state = self.inner.state.lock();
            if *state == ProgressState::Finished {
                return;
            }
            *state = ProgressState::Finished;
        }
        self.inner.finished.emit(&());
    }

    /// Observe completion. The handler runs once, when `finish` is called.
    pub fn on_finished(&self, handler: impl Fn(&()) + Send + Sync + 'static) -> Subscription {
        self.inner.finished.connect(handler)
    }

    /// Whether two handles refer to the same operation.
    pub fn same_as(&self, other: &ProgressHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn set_state(&self, state: ProgressState) {
        *self.inner.state.lock() = state;
    }
}

impl Default for ProgressHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProgressHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressHandle")
            .field("state", &self.state())
            .finish()
    }
}
