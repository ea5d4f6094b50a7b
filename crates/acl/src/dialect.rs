use std::fmt;

use serde::{Deserialize, Serialize};

/// Extended attribute names under which an ACL of any dialect may be
/// persisted. The apply step uses this set to know which attribute families
/// to write or clear.
pub const ACL_XATTR_NAMES: [&str; 3] = [
    "system.posix_acl_access",
    "system.posix_acl_default",
    "system.nfs4_acl_xdr",
];

/// The ACL dialect governing a path.
///
/// The set is closed: every consumer matches exhaustively so a new dialect
/// cannot be added without updating all call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AclDialect {
    /// NFSv4-style ACL: ordered, typed (ALLOW/DENY) entries with
    /// fine-grained permission and inheritance bits.
    #[serde(rename = "NFS4")]
    Nfs4,
    /// POSIX1e ACL: access/default entries with a read/write/execute triad.
    #[serde(rename = "POSIX1E")]
    Posix1e,
    /// ACLs are disabled; the path's protection is a plain unix mode.
    #[serde(rename = "DISABLED")]
    Disabled,
}

impl AclDialect {
    /// Returns the exact key set every entry of this dialect must supply.
    #[must_use]
    pub const fn required_keys(self) -> &'static [&'static str] {
        match self {
            Self::Nfs4 => &["tag", "id", "perms", "flags", "type"],
            Self::Posix1e => &["default", "tag", "id", "perms"],
            Self::Disabled => &[],
        }
    }

    /// Returns the special principal tags for this dialect.
    ///
    /// Special tags denote a structural role (owner, group, everyone, mask)
    /// rather than a resolvable numeric identity.
    #[must_use]
    pub const fn special_tags(self) -> &'static [&'static str] {
        match self {
            Self::Nfs4 => &["owner@", "group@", "everyone@"],
            Self::Posix1e => &["USER_OBJ", "GROUP_OBJ", "OTHER", "MASK"],
            Self::Disabled => &[],
        }
    }

    /// Checks whether `tag` is a special principal tag for this dialect.
    #[must_use]
    pub fn is_special(self, tag: &str) -> bool {
        self.special_tags().contains(&tag)
    }

    /// Returns the extended attribute names an ACL of any dialect may be
    /// stored under.
    #[must_use]
    pub const fn xattr_names() -> &'static [&'static str] {
        &ACL_XATTR_NAMES
    }
}

impl fmt::Display for AclDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nfs4 => "NFS4",
            Self::Posix1e => "POSIX1E",
            Self::Disabled => "DISABLED",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_keys_are_exact() {
        assert_eq!(
            AclDialect::Nfs4.required_keys(),
            ["tag", "id", "perms", "flags", "type"]
        );
        assert_eq!(
            AclDialect::Posix1e.required_keys(),
            ["default", "tag", "id", "perms"]
        );
        assert!(AclDialect::Disabled.required_keys().is_empty());
    }

    #[test]
    fn special_tags_match_dialect() {
        assert!(AclDialect::Nfs4.is_special("owner@"));
        assert!(!AclDialect::Nfs4.is_special("USER"));
        assert!(AclDialect::Posix1e.is_special("MASK"));
        assert!(!AclDialect::Posix1e.is_special("USER"));
        assert!(!AclDialect::Disabled.is_special("owner@"));
    }

    #[test]
    fn dialect_names_round_trip_through_serde() {
        for (dialect, name) in [
            (AclDialect::Nfs4, "\"NFS4\""),
            (AclDialect::Posix1e, "\"POSIX1E\""),
            (AclDialect::Disabled, "\"DISABLED\""),
        ] {
            assert_eq!(serde_json::to_string(&dialect).unwrap(), name);
            assert_eq!(
                serde_json::from_str::<AclDialect>(name).unwrap(),
                dialect
            );
        }
    }
}
