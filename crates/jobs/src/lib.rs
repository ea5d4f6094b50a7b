#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `jobs` runs permission changes as background tasks. A job applies one
//! change (a full ACL, a unix mode, or an ownership change) to a path and,
//! when requested, to every entry beneath it.
//!
//! # Design
//!
//! All jobs in a process serialize on one lock: concurrent permission
//! changes over overlapping subtrees would interleave unpredictably, so a
//! second job stays [`JobState::Pending`] until the first releases the
//! lock. The filesystem work itself runs on the blocking pool; the async
//! side only sequences lock acquisition, state transitions, and progress.
//!
//! # Invariants
//!
//! * The lock is held from before the first mutation until the job
//!   reaches a terminal state, on every exit path.
//! * Cancellation is honored between paths, never mid-path. A cancelled
//!   job that has not yet mutated anything leaves the tree untouched.
//! * A per-path failure is fatal. Paths already changed stay changed;
//!   there is no rollback.

mod change;
mod error;
mod handle;
mod lock;


pub use change::{ChangeOptions, PermissionChange, spawn};
pub use error::JobError;
pub use handle::{JobHandle, JobState, Progress};
pub use lock::acquire_permission_lock;
