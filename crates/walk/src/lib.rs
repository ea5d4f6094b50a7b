#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `walk` provides the deterministic subtree traversal used by permission
//! change jobs. The walker yields the root path first and then every
//! descendant in depth-first order, sorting directory entries
//! lexicographically so mutation order is stable regardless of the
//! underlying filesystem's iteration order.
//!
//! # Design
//!
//! - [`WalkBuilder`] configures the traversal: the root path and whether
//!   descent may cross into child filesystems (nested datasets or mounts).
//! - [`Walker`] implements [`Iterator`] and yields [`WalkEntry`] values.
//!   Symbolic links are yielded but never followed; a permission change
//!   applied through a link target would escape the requested subtree.
//! - [`WalkError`] carries the failing operation, the offending path, and
//!   the underlying [`std::io::Error`].
//!
//! # Invariants
//!
//! - The root entry is always yielded first.
//! - With boundary crossing disabled, a directory whose device id differs
//!   from the root's is neither yielded nor descended into: the mount point
//!   inode belongs to the child filesystem, so mutating it would already
//!   cross the boundary.
//! - Traversal never panics; filesystem failures surface as [`WalkError`].

mod builder;
mod entry;
mod error;
mod walker;

pub use builder::WalkBuilder;
pub use entry::WalkEntry;
pub use error::WalkError;
pub use walker::Walker;

#[cfg(test)]
mod tests;
