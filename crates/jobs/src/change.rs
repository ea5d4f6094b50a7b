use std::path::{Path, PathBuf};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn};

use acl::{AclDialect, AclEntries, Nfs41Flags};
use walk::WalkBuilder;

use crate::error::JobError;
use crate::handle::{JobHandle, JobState, Progress};
use crate::lock;

/// The mutation a job applies to each path.
#[derive(Debug, Clone)]
pub enum PermissionChange {
    /// Replace the ACL, optionally re-owning each path.
    SetAcl {
        /// Entries to store. Ignored when `strip` is set.
        entries: AclEntries,
        /// Per-ACL NFSv4.1 flags to persist alongside the entries.
        nfs41_flags: Nfs41Flags,
        /// New owner, if any.
        uid: Option<u32>,
        /// New owning group, if any.
        gid: Option<u32>,
        /// Remove the ACL instead of writing one, leaving the plain mode.
        strip: bool,
    },
    /// Set a unix mode, optionally stripping an existing ACL first.
    SetMode {
        /// Mode bits to apply. `None` leaves the mode alone, useful when
        /// only stripping an ACL or re-owning the tree.
        mode: Option<u32>,
        /// New owner, if any.
        uid: Option<u32>,
        /// New owning group, if any.
        gid: Option<u32>,
        /// Remove any ACL so the mode alone governs access.
        strip: bool,
    },
    /// Change ownership only.
    Chown {
        /// New owner, if any.
        uid: Option<u32>,
        /// New owning group, if any.
        gid: Option<u32>,
    },
}

impl PermissionChange {
    fn verb(&self) -> &'static str {
        match self {
            Self::SetAcl { .. } => "set the ACL",
            Self::SetMode { .. } => "set permissions",
            Self::Chown { .. } => "change ownership",
        }
    }

    fn gerund(&self) -> &'static str {
        match self {
            Self::SetAcl { .. } => "setting the ACL",
            Self::SetMode { .. } => "setting permissions",
            Self::Chown { .. } => "changing ownership",
        }
    }

    fn strips(&self) -> bool {
        matches!(
            self,
            Self::SetAcl { strip: true, .. } | Self::SetMode { strip: true, .. }
        )
    }
}

/// Traversal options for a permission change.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeOptions {
    /// Apply the change to the whole subtree, not just the path itself.
    pub recursive: bool,
    /// Descend into filesystems mounted below the path. Only meaningful
    /// together with `recursive`.
    pub traverse: bool,
}

/// Spawns a permission change job over `path`.
///
/// The returned handle observes the job; the job itself waits for the
/// process-wide permission change lock before touching anything.
#[must_use]
pub fn spawn(path: PathBuf, change: PermissionChange, options: ChangeOptions) -> JobHandle {
    let (state_tx, state_rx) = watch::channel(JobState::Pending);
    let (progress_tx, progress_rx) = watch::channel(Progress {
        percent: 0,
        description: format!("Preparing to {}.", change.verb()),
    });
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    let task = tokio::spawn(async move {
        let root = path.clone();
        let result = run(path, change, options, &state_tx, &progress_tx, &token).await;
        let terminal = match &result {
            Ok(()) => JobState::Success,
            Err(JobError::Aborted) => JobState::Aborted,
            Err(_) => JobState::Failed,
        };
        match terminal {
            JobState::Aborted => warn!(path = %root.display(), "permission change aborted"),
            _ => info!(path = %root.display(), state = ?terminal, "permission change finished"),
        }
        let _ = state_tx.send(terminal);
        result
    });

    JobHandle {
        state: state_rx,
        progress: progress_rx,
        cancel,
        task,
    }
}

async fn run(
    path: PathBuf,
    change: PermissionChange,
    options: ChangeOptions,
    state: &watch::Sender<JobState>,
    progress: &watch::Sender<Progress>,
    cancel: &CancellationToken,
) -> Result<(), JobError> {
    // Held until the job returns, on every exit path.
    let _guard = lock::acquire_permission_lock().await;
    let _ = state.send(JobState::Running);

    if cancel.is_cancelled() {
        return Err(JobError::Aborted);
    }

    let span = info_span!("permission_change", path = %path.display(), verb = change.verb());
    let progress = progress.clone();
    let cancel = cancel.clone();
    tokio::task::spawn_blocking(move || {
        let _entered = span.entered();
        apply_tree(&path, &change, options, &progress, &cancel)
    })
    .await?
}

fn apply_tree(
    path: &Path,
    change: &PermissionChange,
    options: ChangeOptions,
    progress: &watch::Sender<Progress>,
    cancel: &CancellationToken,
) -> Result<(), JobError> {
    let dialect = if change.strips() {
        Some(fsattr::probe_dialect(path)?)
    } else {
        None
    };

    let _ = progress.send(Progress {
        percent: 0,
        description: format!("Preparing to {}.", change.verb()),
    });
    apply_one(path, change, dialect, false)?;

    if options.recursive {
        let _ = progress.send(Progress {
            percent: 10,
            description: format!("Recursively {} on {}.", change.gerund(), path.display()),
        });
        let walker = WalkBuilder::new(path)
            .cross_boundaries(options.traverse)
            .build()?;
        for entry in walker {
            let entry = entry?;
            if entry.is_root() {
                continue;
            }
            if cancel.is_cancelled() {
                debug!(path = %entry.path().display(), "stopping before path, job cancelled");
                return Err(JobError::Aborted);
            }
            let symlink = entry.metadata().file_type().is_symlink();
            debug!(path = %entry.path().display(), "applying permission change");
            apply_one(entry.path(), change, dialect, symlink)?;
        }
    }

    let _ = progress.send(Progress {
        percent: 100,
        description: format!("Finished {}.", change.gerund()),
    });
    Ok(())
}

/// Applies the change to a single path. Symbolic links only ever have
/// their ownership changed; modes and ACLs would affect the link target.
fn apply_one(
    path: &Path,
    change: &PermissionChange,
    dialect: Option<AclDialect>,
    symlink: bool,
) -> Result<(), JobError> {
    match change {
        PermissionChange::SetAcl {
            entries,
            nfs41_flags,
            uid,
            gid,
            strip,
        } => {
            if !symlink {
                if *strip {
                    if let Some(dialect) = dialect {
                        fsattr::strip_acl(path, dialect)?;
                    }
                } else {
                    fsattr::write_acl(path, entries, *nfs41_flags)?;
                }
            }
            fsattr::apply_owner(path, *uid, *gid)?;
        }
        PermissionChange::SetMode {
            mode,
            uid,
            gid,
            strip,
        } => {
            if !symlink {
                if *strip {
                    if let Some(dialect) = dialect {
                        fsattr::strip_acl(path, dialect)?;
                    }
                }
                if let Some(mode) = mode {
                    fsattr::apply_mode(path, *mode)?;
                }
            }
            fsattr::apply_owner(path, *uid, *gid)?;
        }
        PermissionChange::Chown { uid, gid } => {
            fsattr::apply_owner(path, *uid, *gid)?;
        }
    }
    Ok(())
}
