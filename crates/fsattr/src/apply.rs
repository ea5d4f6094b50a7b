use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use rustix::fs::{AtFlags, CWD, chownat};
use rustix::process::{RawGid, RawUid};

use crate::error::FsAttrError;
use crate::ownership;

/// Applies a unix mode to `path`.
pub fn apply_mode(path: &Path, mode: u32) -> Result<(), FsAttrError> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|error| FsAttrError::new("set permissions", path, error))
}

/// Applies ownership to `path`. A `None` uid or gid leaves the respective
/// id unchanged. Symbolic links are not followed; the link itself is
/// re-owned.
pub fn apply_owner(
    path: &Path,
    uid: Option<u32>,
    gid: Option<u32>,
) -> Result<(), FsAttrError> {
    if uid.is_none() && gid.is_none() {
        return Ok(());
    }

    let owner = uid.map(|raw| ownership::uid_from_raw(raw as RawUid));
    let group = gid.map(|raw| ownership::gid_from_raw(raw as RawGid));

    chownat(CWD, path, owner, group, AtFlags::SYMLINK_NOFOLLOW)
        .map_err(|error| FsAttrError::new("change ownership", path, io::Error::from(error)))
}
