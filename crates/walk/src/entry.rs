use std::fs;
use std::path::{Path, PathBuf};

/// One filesystem object yielded by a [`Walker`](crate::Walker).
#[derive(Debug)]
pub struct WalkEntry {
    pub(crate) path: PathBuf,
    pub(crate) metadata: fs::Metadata,
    pub(crate) is_root: bool,
}

impl WalkEntry {
    /// Absolute path of the entry.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Metadata captured when the entry was discovered (links not followed).
    #[must_use]
    pub const fn metadata(&self) -> &fs::Metadata {
        &self.metadata
    }

    /// Whether this entry is the traversal root.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.is_root
    }

    /// Whether the entry is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.metadata.file_type().is_dir()
    }
}
