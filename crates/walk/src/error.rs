use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error raised while traversing a subtree.
#[derive(Debug, Error)]
#[error("failed to {context} '{}': {source}", path.display())]
pub struct WalkError {
    context: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl WalkError {
    pub(crate) fn new(context: &'static str, path: &Path, source: io::Error) -> Self {
        Self {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    /// The operation being performed when the error occurred.
    #[must_use]
    pub const fn context(&self) -> &'static str {
        self.context
    }

    /// The path involved in the failing operation.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The underlying I/O error.
    #[must_use]
    pub fn source_error(&self) -> &io::Error {
        &self.source
    }
}
