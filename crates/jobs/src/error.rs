use thiserror::Error;

use fsattr::FsAttrError;
use walk::WalkError;

/// Error produced by a permission change job.
#[derive(Debug, Error)]
pub enum JobError {
    /// Subtree traversal failed.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// Applying protection metadata to a path failed.
    #[error(transparent)]
    Attr(#[from] FsAttrError),

    /// The job was cancelled before it finished.
    #[error("permission change job was aborted")]
    Aborted,

    /// The job task terminated abnormally.
    #[error("permission change task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
