use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::JobError;

/// Lifecycle of a permission change job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Spawned but waiting on the permission change lock.
    Pending,
    /// Holding the lock and mutating paths.
    Running,
    /// Every path was changed.
    Success,
    /// A path failed; earlier changes remain in place.
    Failed,
    /// Cancelled between paths.
    Aborted,
}

/// A point-in-time progress report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Completion estimate from 0 to 100.
    pub percent: u8,
    /// Human-readable description of the current phase.
    pub description: String,
}

/// Observer handle for a spawned permission change job.
///
/// Dropping the handle detaches the job; it keeps running to completion.
#[derive(Debug)]
pub struct JobHandle {
    pub(crate) state: watch::Receiver<JobState>,
    pub(crate) progress: watch::Receiver<Progress>,
    pub(crate) cancel: CancellationToken,
    pub(crate) task: JoinHandle<Result<(), JobError>>,
}

impl JobHandle {
    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> JobState {
        *self.state.borrow()
    }

    /// Latest progress report.
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress.borrow().clone()
    }

    /// Requests cancellation. The job stops at the next inter-path check;
    /// a path mutation already underway completes first.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the job to reach a terminal state and returns its result.
    pub async fn wait(self) -> Result<(), JobError> {
        self.task.await?
    }
}
