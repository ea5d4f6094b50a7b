use std::io;
use std::path::Path;

use acl::AclDialect;

use crate::error::FsAttrError;
use crate::nfs4::NFS4_ACL_XATTR;
use crate::posix::POSIX_ACCESS_XATTR;

fn errno_of(error: &io::Error) -> Option<i32> {
    error.raw_os_error()
}

/// Determines which ACL dialect governs `path`.
///
/// A readable or merely absent (`ENODATA`) `system.posix_acl_access`
/// attribute means the filesystem speaks POSIX1e; `EOPNOTSUPP` there falls
/// through to the NFSv4 attribute, and `EOPNOTSUPP` on both means ACLs are
/// disabled and the path's protection is a plain mode.
pub fn probe_dialect(path: &Path) -> Result<AclDialect, FsAttrError> {
    match xattr::get(path, POSIX_ACCESS_XATTR) {
        Ok(_) => return Ok(AclDialect::Posix1e),
        Err(error) if errno_of(&error) == Some(libc::ENODATA) => {
            return Ok(AclDialect::Posix1e);
        }
        Err(error) if errno_of(&error) == Some(libc::EOPNOTSUPP) => {}
        Err(error) => {
            return Err(FsAttrError::new("probe ACL support", path, error));
        }
    }

    // An absent attribute still means the dialect is supported; only
    // EOPNOTSUPP marks it unavailable.
    match xattr::get(path, NFS4_ACL_XATTR) {
        Ok(_) => Ok(AclDialect::Nfs4),
        Err(error) if errno_of(&error) == Some(libc::ENODATA) => Ok(AclDialect::Nfs4),
        Err(error) if errno_of(&error) == Some(libc::EOPNOTSUPP) => Ok(AclDialect::Disabled),
        Err(error) => Err(FsAttrError::new("probe ACL support", path, error)),
    }
}
