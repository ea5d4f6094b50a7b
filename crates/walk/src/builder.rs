use std::path::{Path, PathBuf};

use crate::error::WalkError;
use crate::walker::Walker;

/// Configures a subtree traversal rooted at a specific path.
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    root: PathBuf,
    cross_boundaries: bool,
}

impl WalkBuilder {
    /// Starts configuring a traversal of `root`.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            cross_boundaries: false,
        }
    }

    /// Allows descent across filesystem boundaries (nested datasets or
    /// mounts below the root). Disabled by default.
    #[must_use]
    pub const fn cross_boundaries(mut self, cross: bool) -> Self {
        self.cross_boundaries = cross;
        self
    }

    /// Builds the walker, capturing the root's metadata and device id.
    pub fn build(self) -> Result<Walker, WalkError> {
        Walker::new(self.root, self.cross_boundaries)
    }
}
