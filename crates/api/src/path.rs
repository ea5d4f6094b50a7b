use std::path::{Path, PathBuf};

use crate::error::ValidationErrors;

/// Prefix marking a clustered-volume path in a request.
pub const CLUSTER_PREFIX: &str = "CLUSTER:";

/// Mount base the cluster prefix expands to.
pub const CLUSTER_PATH_BASE: &str = "/cluster";

/// Expands the `CLUSTER:<volume>/<rel>` shorthand into the mounted path
/// `/cluster/<volume>/<rel>`. Paths without the prefix pass through
/// unchanged; actual volume resolution is the embedding service's concern.
#[must_use]
pub fn rewrite_cluster_path(path: &str) -> PathBuf {
    match path.strip_prefix(CLUSTER_PREFIX) {
        Some(rest) => PathBuf::from(format!("{CLUSTER_PATH_BASE}/{rest}")),
        None => PathBuf::from(path),
    }
}

/// Common request path validation shared by every operation.
///
/// Rewrites the cluster prefix, then requires an absolute path to an
/// existing filesystem object. `recursive` operations additionally require
/// a directory. Problems are recorded against `attribute`; the rewritten
/// path is returned either way so later checks can keep accumulating.
pub fn validate_request_path(
    attribute: &str,
    path: &str,
    recursive: bool,
    verrors: &mut ValidationErrors,
) -> PathBuf {
    let resolved = rewrite_cluster_path(path);

    if !resolved.is_absolute() {
        verrors.add(attribute, "Path must be absolute.");
        return resolved;
    }

    match std::fs::symlink_metadata(&resolved) {
        Ok(metadata) => {
            if recursive && !metadata.file_type().is_dir() {
                verrors.add(
                    attribute,
                    "Recursive operations require the path to be a directory.",
                );
            }
        }
        Err(_) => {
            verrors.add(attribute, "Path does not exist.");
        }
    }

    resolved
}

/// Whether a directory currently holds any entries.
pub fn directory_has_contents(path: &Path) -> std::io::Result<bool> {
    Ok(std::fs::read_dir(path)?.next().is_some())
}
