use std::io;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

use acl::{AclDialect, AclEntries, Nfs41Flags, PosixAce};

use crate::error::FsAttrError;
use crate::nfs4::{NFS4_ACL_XATTR, decode_nfs4_acl, encode_nfs4_acl};
use crate::posix::{POSIX_ACCESS_XATTR, POSIX_DEFAULT_XATTR, decode_posix_acl, encode_posix_acl};
use crate::probe::probe_dialect;

/// The protection metadata read back from a path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathAcl {
    /// The dialect governing the path.
    pub dialect: AclDialect,
    /// The stored entries; empty when ACLs are disabled.
    pub entries: AclEntries,
    /// Per-ACL NFSv4.1 flags; default for non-NFSv4 paths.
    pub nfs41_flags: Nfs41Flags,
    /// Owner of the path.
    pub uid: u32,
    /// Owning group of the path.
    pub gid: u32,
}

fn read_attribute(path: &Path, name: &str) -> Result<Option<Vec<u8>>, FsAttrError> {
    match xattr::get(path, name) {
        Ok(value) => Ok(value),
        Err(error) if error.raw_os_error() == Some(libc::ENODATA) => Ok(None),
        Err(error) => Err(FsAttrError::new("read ACL attribute", path, error)),
    }
}

fn remove_attribute(path: &Path, name: &str) -> Result<(), FsAttrError> {
    match xattr::remove(path, name) {
        Ok(()) => Ok(()),
        // Absent attribute: nothing to strip.
        Err(error) if error.raw_os_error() == Some(libc::ENODATA) => Ok(()),
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(FsAttrError::new("remove ACL attribute", path, error)),
    }
}

fn decode_error(path: &Path, error: io::Error) -> FsAttrError {
    FsAttrError::new("parse ACL attribute", path, error)
}

/// Reads the ACL and ownership of `path`, probing the dialect first.
pub fn read_acl(path: &Path) -> Result<PathAcl, FsAttrError> {
    let metadata = std::fs::symlink_metadata(path)
        .map_err(|error| FsAttrError::new("inspect path", path, error))?;
    let dialect = probe_dialect(path)?;

    let (entries, nfs41_flags) = match dialect {
        AclDialect::Nfs4 => match read_attribute(path, NFS4_ACL_XATTR)? {
            Some(blob) => {
                let (aces, flags) =
                    decode_nfs4_acl(&blob).map_err(|error| decode_error(path, error))?;
                (AclEntries::Nfs4(aces), flags)
            }
            None => (AclEntries::Nfs4(Vec::new()), Nfs41Flags::default()),
        },
        AclDialect::Posix1e => {
            let mut aces: Vec<PosixAce> = Vec::new();
            if let Some(blob) = read_attribute(path, POSIX_ACCESS_XATTR)? {
                aces.extend(
                    decode_posix_acl(&blob, false).map_err(|error| decode_error(path, error))?,
                );
            }
            if let Some(blob) = read_attribute(path, POSIX_DEFAULT_XATTR)? {
                aces.extend(
                    decode_posix_acl(&blob, true).map_err(|error| decode_error(path, error))?,
                );
            }
            (AclEntries::Posix1e(aces), Nfs41Flags::default())
        }
        AclDialect::Disabled => (AclEntries::Nfs4(Vec::new()), Nfs41Flags::default()),
    };

    Ok(PathAcl {
        dialect,
        entries,
        nfs41_flags,
        uid: metadata.uid(),
        gid: metadata.gid(),
    })
}

/// Writes a complete ACL to `path`, replacing whatever the dialect's
/// attributes held before.
pub fn write_acl(
    path: &Path,
    entries: &AclEntries,
    nfs41_flags: Nfs41Flags,
) -> Result<(), FsAttrError> {
    match entries {
        AclEntries::Nfs4(aces) => {
            let blob = encode_nfs4_acl(aces, nfs41_flags);
            xattr::set(path, NFS4_ACL_XATTR, &blob)
                .map_err(|error| FsAttrError::new("write ACL attribute", path, error))
        }
        AclEntries::Posix1e(aces) => {
            let access: Vec<PosixAce> =
                aces.iter().filter(|a| !a.default).cloned().collect();
            let default: Vec<PosixAce> = aces.iter().filter(|a| a.default).cloned().collect();

            let blob = encode_posix_acl(&access);
            xattr::set(path, POSIX_ACCESS_XATTR, &blob)
                .map_err(|error| FsAttrError::new("write ACL attribute", path, error))?;

            if default.is_empty() {
                remove_attribute(path, POSIX_DEFAULT_XATTR)
            } else {
                let blob = encode_posix_acl(&default);
                xattr::set(path, POSIX_DEFAULT_XATTR, &blob)
                    .map_err(|error| FsAttrError::new("write ACL attribute", path, error))
            }
        }
    }
}

/// Removes the dialect's ACL attributes from `path`, reducing its
/// protection to the plain mode. Absent attributes are not an error.
pub fn strip_acl(path: &Path, dialect: AclDialect) -> Result<(), FsAttrError> {
    match dialect {
        AclDialect::Nfs4 => remove_attribute(path, NFS4_ACL_XATTR),
        AclDialect::Posix1e => {
            remove_attribute(path, POSIX_ACCESS_XATTR)?;
            remove_attribute(path, POSIX_DEFAULT_XATTR)
        }
        AclDialect::Disabled => Ok(()),
    }
}
