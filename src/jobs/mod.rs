//! Background file-operation jobs.
//!
//! This module provides:
//! - The [`JobQueue`] admission policy (one job at a time, `Create` fast path)
//! - Progress/cancellation handles shared with the UI layer

mod queue;
mod types;

pub use queue::{JobInfo, JobQueue};
pub use types::{CancelHandle, JobFn, JobKey, OpKind, ProgressHandle, ProgressState};
