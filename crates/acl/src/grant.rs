use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dialect::AclDialect;
use crate::entry::{
    AceType, AclEntries, BasicFlag, BasicPerm, Nfs4Ace, Nfs4Tag, NfsFlags, NfsPerms, PosixAce,
    PosixPerms, PosixTag,
};

/// Identity class of a simplified grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantIdType {
    /// The id names a user.
    #[serde(rename = "USER")]
    User,
    /// The id names a group.
    #[serde(rename = "GROUP")]
    Group,
}

/// Access level of a simplified grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantAccess {
    /// Read and traverse.
    #[serde(rename = "READ")]
    Read,
    /// Read, write, and traverse.
    #[serde(rename = "MODIFY")]
    Modify,
    /// Every permission.
    #[serde(rename = "FULL_CONTROL")]
    FullControl,
}

/// One simplified grant: give `access` to the user or group `id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantEntry {
    /// Whether `id` names a user or a group.
    pub id_type: GrantIdType,
    /// The numeric identity receiving access.
    pub id: i32,
    /// The simplified access level.
    pub access: GrantAccess,
}

/// Error produced when a grant cannot be expressed in the target dialect.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GrantError {
    /// FULL_CONTROL has no POSIX1e expression beyond rwx, which MODIFY
    /// already provides; the original system rejects it for this dialect.
    #[error("{0}: unsupported permissions type for POSIX1E acltype")]
    UnsupportedPosixAccess(&'static str),
    /// Grants cannot be expressed on a path with ACLs disabled.
    #[error("ACLs are disabled; simplified grants are not supported")]
    AclsDisabled,
}

/// Expands simplified grants into a complete, dialect-correct ACL.
///
/// The result is intended to *replace* any ACL present at the target path;
/// callers that want merge semantics must read and combine beforehand. The
/// expansion always includes the dialect's structural base entries so the
/// produced ACL is valid on its own.
pub fn expand_grant(dialect: AclDialect, grants: &[GrantEntry]) -> Result<AclEntries, GrantError> {
    match dialect {
        AclDialect::Nfs4 => Ok(AclEntries::Nfs4(expand_nfs4(grants))),
        AclDialect::Posix1e => expand_posix(grants).map(AclEntries::Posix1e),
        AclDialect::Disabled => Err(GrantError::AclsDisabled),
    }
}

fn expand_nfs4(grants: &[GrantEntry]) -> Vec<Nfs4Ace> {
    let special = |tag, basic| Nfs4Ace {
        tag,
        id: None,
        ace_type: AceType::Allow,
        perms: NfsPerms::Basic { basic },
        flags: NfsFlags::Basic {
            basic: BasicFlag::Inherit,
        },
        who: None,
    };

    // The owner keeps full control so the grant cannot lock the file's
    // owner out of its own ACL.
    let mut out = vec![
        special(Nfs4Tag::Owner, BasicPerm::FullControl),
        special(Nfs4Tag::Group, BasicPerm::Traverse),
    ];

    for grant in grants {
        let tag = match grant.id_type {
            GrantIdType::User => Nfs4Tag::User,
            GrantIdType::Group => Nfs4Tag::NamedGroup,
        };
        let basic = match grant.access {
            GrantAccess::Read => BasicPerm::Read,
            GrantAccess::Modify => BasicPerm::Modify,
            GrantAccess::FullControl => BasicPerm::FullControl,
        };
        out.push(Nfs4Ace {
            tag,
            id: Some(grant.id),
            ace_type: AceType::Allow,
            perms: NfsPerms::Basic { basic },
            flags: NfsFlags::Basic {
                basic: BasicFlag::Inherit,
            },
            who: None,
        });
    }

    out
}

fn expand_posix(grants: &[GrantEntry]) -> Result<Vec<PosixAce>, GrantError> {
    let base = |tag, perms: PosixPerms, default| PosixAce {
        default,
        tag,
        id: -1,
        perms,
        who: None,
    };

    let mut out = Vec::new();
    // Access entries first, then their default mirrors so recursive
    // application inherits the same policy.
    for default in [false, true] {
        out.push(base(PosixTag::UserObj, PosixPerms::new(true, true, true), default));
        out.push(base(PosixTag::GroupObj, PosixPerms::new(true, false, true), default));

        for grant in grants {
            let tag = match grant.id_type {
                GrantIdType::User => PosixTag::User,
                GrantIdType::Group => PosixTag::Group,
            };
            let perms = match grant.access {
                GrantAccess::Read => PosixPerms::new(true, false, true),
                GrantAccess::Modify => PosixPerms::new(true, true, true),
                GrantAccess::FullControl => {
                    return Err(GrantError::UnsupportedPosixAccess("FULL_CONTROL"));
                }
            };
            out.push(PosixAce {
                default,
                tag,
                id: grant.id,
                perms,
                who: None,
            });
        }

        // Named entries require a mask bounding their effect.
        out.push(base(PosixTag::Mask, PosixPerms::new(true, true, true), default));
        out.push(base(PosixTag::Other, PosixPerms::default(), default));
    }

    Ok(out)
}
