use std::fs;
use std::path::PathBuf;

use tracing::trace;

use crate::entry::WalkEntry;
use crate::error::WalkError;

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Depth-first iterator over a subtree.
#[derive(Debug)]
pub struct Walker {
    root_device: u64,
    cross_boundaries: bool,
    pending_root: Option<WalkEntry>,
    stack: Vec<DirectoryState>,
    finished: bool,
}

#[derive(Debug)]
struct DirectoryState {
    entries: Vec<PathBuf>,
    next: usize,
}

impl DirectoryState {
    fn read(path: &PathBuf) -> Result<Self, WalkError> {
        let reader =
            fs::read_dir(path).map_err(|error| WalkError::new("read directory", path, error))?;
        let mut entries = Vec::new();
        for entry in reader {
            let entry = entry.map_err(|error| WalkError::new("read directory", path, error))?;
            entries.push(entry.path());
        }
        // Stable mutation order across platforms and filesystems.
        entries.sort_unstable();
        Ok(Self { entries, next: 0 })
    }
}

impl Walker {
    pub(crate) fn new(root: PathBuf, cross_boundaries: bool) -> Result<Self, WalkError> {
        let metadata = fs::symlink_metadata(&root)
            .map_err(|error| WalkError::new("inspect traversal root", &root, error))?;
        let root_device = device_of(&metadata);
        trace!(root = %root.display(), cross_boundaries, "starting subtree walk");

        let mut stack = Vec::new();
        if metadata.file_type().is_dir() {
            stack.push(DirectoryState::read(&root)?);
        }

        Ok(Self {
            root_device,
            cross_boundaries,
            pending_root: Some(WalkEntry {
                path: root,
                metadata,
                is_root: true,
            }),
            stack,
            finished: false,
        })
    }

    fn next_entry(&mut self) -> Result<Option<WalkEntry>, WalkError> {
        if let Some(root) = self.pending_root.take() {
            return Ok(Some(root));
        }

        while let Some(state) = self.stack.last_mut() {
            let Some(path) = state.entries.get(state.next).cloned() else {
                self.stack.pop();
                continue;
            };
            state.next += 1;

            let metadata = fs::symlink_metadata(&path)
                .map_err(|error| WalkError::new("inspect entry", &path, error))?;

            if metadata.file_type().is_dir() {
                if !self.cross_boundaries && device_of(&metadata) != self.root_device {
                    // The mount point inode already belongs to the child
                    // filesystem; skip it entirely.
                    trace!(path = %path.display(), "stopping at filesystem boundary");
                    continue;
                }
                self.stack.push(DirectoryState::read(&path)?);
            }

            return Ok(Some(WalkEntry {
                path,
                metadata,
                is_root: false,
            }));
        }

        Ok(None)
    }
}

impl Iterator for Walker {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(error) => {
                self.finished = true;
                Some(Err(error))
            }
        }
    }
}

#[cfg(unix)]
fn device_of(metadata: &fs::Metadata) -> u64 {
    metadata.dev()
}

#[cfg(not(unix))]
fn device_of(_metadata: &fs::Metadata) -> u64 {
    0
}
