//! File-operation job queue with single-concurrency admission.
//!
//! By default one job runs at a time: new submissions append to the queued
//! list and the head is started when the running job's progress handle
//! signals finished. `Create` operations are the one fast path - they start
//! immediately so "new folder" never waits behind a long copy. The UI can
//! also promote a specific queued job out of order with
//! [`JobQueue::start_job_by_handle`].

use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;

use crate::events::{Signal, Subscription};
use crate::tasks::{RunnerHandle, Task, ThreadRunner};

use super::types::{CancelHandle, JobFn, JobKey, OpKind, ProgressHandle, ProgressState};

/// One queued or running background file operation.
struct Job {
    key: JobKey,
    kind: OpKind,
    /// Taken when the job starts; a job never starts twice.
    work: Option<JobFn>,
    cancel: CancelHandle,
    progress: ProgressHandle,
    /// Keeps the finished-signal handler connected for the job's lifetime.
    _finished_sub: Subscription,
}

#[derive(Default)]
struct QueueState {
    queued: Vec<Job>,
    running: Vec<Job>,
}

/// Read-only snapshot of one queued job, for UI inspection.
#[derive(Debug, Clone)]
pub struct JobInfo {
    pub key: JobKey,
    pub kind: OpKind,
    pub progress: ProgressHandle,
}

/// Serializes admission of background file operations.
pub struct JobQueue {
    state: Mutex<QueueState>,
    new_job: Signal<()>,
    runner: RunnerHandle,
    /// Self-reference handed to completion handlers.
    weak: Weak<JobQueue>,
}

fn shared_slot() -> &'static Mutex<Weak<JobQueue>> {
    static SLOT: OnceLock<Mutex<Weak<JobQueue>>> = OnceLock::new();
    SLOT.get_or_init(|| Mutex::new(Weak::new()))
}

impl JobQueue {
    /// Create a queue using the given task runner.
    pub fn new(runner: RunnerHandle) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            state: Mutex::new(QueueState::default()),
            new_job: Signal::new(),
            runner,
            weak: weak.clone(),
        })
    }

    /// Process-wide queue instance.
    ///
    /// The static holds only a weak reference: when the last external owner
    /// releases the queue it is destroyed, and the next call creates a fresh
    /// one.
    pub fn shared() -> Arc<Self> {
        let mut slot = shared_slot().lock();
        if let Some(queue) = slot.upgrade() {
            return queue;
        }
        let queue = Self::new(Arc::new(ThreadRunner));
        *slot = Arc::downgrade(&queue);
        queue
    }

    /// Observe admissions. Fires once per accepted `submit`.
    pub fn on_new_job(&self, handler: impl Fn(&()) + Send + Sync + 'static) -> Subscription {
        self.new_job.connect(handler)
    }

    /// Admit a job.
    ///
    /// A submission whose `key` matches a job already queued or running is a
    /// caller bug; it is logged and dropped. Otherwise the job is appended to
    /// the queued list, its progress handle is marked queued and observed for
    /// completion, and it either starts immediately (`Create`) or waits for
    /// the single-concurrency gate. The new-job notification fires
    /// unconditionally after admission.
    pub fn submit(
        &self,
        work: JobFn,
        key: JobKey,
        cancel: CancelHandle,
        progress: ProgressHandle,
        kind: OpKind,
    ) {
        let to_start = {
            let mut state = self.state.lock();

            let duplicate = state
                .queued
                .iter()
                .chain(state.running.iter())
                .any(|job| job.key == key);
            if duplicate {
                tracing::warn!(key = key.0, "adding the same file job to the job queue");
                return;
            }

            progress.set_state(ProgressState::Queued);

            let queue = self.weak.clone();
            let handle = progress.clone();
            let finished_sub = progress.on_finished(move |_| {
                if let Some(queue) = queue.upgrade() {
                    queue.job_finished(&handle);
                }
            });

            state.queued.push(Job {
                key,
                kind,
                work: Some(work),
                cancel,
                progress,
                _finished_sub: finished_sub,
            });

            if should_start_immediately(kind) {
                let index = state.queued.len() - 1;
                begin_job(&mut state, index)
            } else {
                next_startable(&mut state)
            }
        };

        if let Some(task) = to_start {
            self.runner.spawn(task);
        }

        self.new_job.emit(&());
    }

    /// Start the head of the queued list if nothing is running.
    ///
    /// This is the single-concurrency gate; it is a no-op while a job runs
    /// or when the queue is empty.
    pub fn start_next_job(&self) {
        let task = {
            let mut state = self.state.lock();
            next_startable(&mut state)
        };
        if let Some(task) = task {
            self.runner.spawn(task);
        }
    }

    /// Force-start the queued job identified by `progress`, even while
    /// another job runs.
    ///
    /// Explicit promotion escape hatch for the UI; does nothing if the handle
    /// matches no queued job.
    pub fn start_job_by_handle(&self, progress: &ProgressHandle) {
        let task = {
            let mut state = self.state.lock();
            state
                .queued
                .iter()
                .position(|job| job.progress.same_as(progress))
                .and_then(|index| begin_job(&mut state, index))
        };
        if let Some(task) = task {
            self.runner.spawn(task);
        }
    }

    /// Snapshot of the queued (not yet started) jobs, in queue order.
    pub fn all_jobs(&self) -> Vec<JobInfo> {
        self.state
            .lock()
            .queued
            .iter()
            .map(|job| JobInfo {
                key: job.key,
                kind: job.kind,
                progress: job.progress.clone(),
            })
            .collect()
    }

    /// Number of jobs currently running.
    pub fn running_count(&self) -> usize {
        self.state.lock().running.len()
    }

    /// Reap a finished job and advance the queue.
    ///
    /// The handle may match a running job or a still-queued one - a job can
    /// finish (e.g. be cancelled) before it ever started.
    fn job_finished(&self, progress: &ProgressHandle) {
        let task = {
            let mut state = self.state.lock();

            if let Some(index) = state
                .running
                .iter()
                .position(|job| job.progress.same_as(progress))
            {
                state.running.remove(index);
            } else if let Some(index) = state
                .queued
                .iter()
                .position(|job| job.progress.same_as(progress))
            {
                state.queued.remove(index);
            }

            next_startable(&mut state)
        };
        if let Some(task) = task {
            self.runner.spawn(task);
        }
    }
}

/// Only lightweight create-on-the-fly operations bypass the queue.
fn should_start_immediately(kind: OpKind) -> bool {
    matches!(kind, OpKind::Create)
}

/// Move `queued[index]` to the running list and hand back its work closure
/// as a spawnable task. Must be called with the state lock held; the caller
/// spawns the task after releasing it.
fn begin_job(state: &mut QueueState, index: usize) -> Option<Task> {
    let mut job = state.queued.remove(index);
    job.progress.set_state(ProgressState::Running);

    let work = job.work.take();
    let cancel = job.cancel.clone();
    state.running.push(job);

    match work {
        Some(work) => Some(Box::new(move || work(cancel))),
        None => {
            tracing::error!("job reached start with no work function");
            None
        }
    }
}

/// Start the queue head iff nothing is running.
fn next_startable(state: &mut QueueState) -> Option<Task> {
    if state.running.is_empty() && !state.queued.is_empty() {
        begin_job(state, 0)
    } else {
        None
    }
}
