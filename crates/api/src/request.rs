use serde::Deserialize;

use acl::{AclDialect, GrantEntry, Nfs41Flags, RawAce};

/// Options for [`set_acl`](crate::set_acl).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SetAclOptions {
    /// Remove the ACL instead of writing entries.
    pub stripacl: bool,
    /// Apply to the whole subtree.
    pub recursive: bool,
    /// Descend into filesystems mounted below the path.
    pub traverse: bool,
    /// Reorder NFSv4 entries into canonical form before applying.
    pub canonicalize: bool,
}

impl Default for SetAclOptions {
    fn default() -> Self {
        Self {
            stripacl: false,
            recursive: false,
            traverse: false,
            canonicalize: true,
        }
    }
}

/// Request to replace the ACL on a path.
#[derive(Debug, Clone, Deserialize)]
pub struct SetAclRequest {
    /// Target path; `CLUSTER:` shorthand accepted.
    pub path: String,
    /// The dialect the submitted entries are written in.
    pub acltype: AclDialect,
    /// Proposed entries, validated before they are parsed.
    #[serde(default)]
    pub dacl: Vec<RawAce>,
    /// Per-ACL NFSv4.1 flags; only valid for the NFS4 dialect.
    #[serde(default)]
    pub nfs41_flags: Nfs41Flags,
    /// New owner, if the operation should also re-own the path.
    #[serde(default)]
    pub uid: Option<u32>,
    /// New owning group.
    #[serde(default)]
    pub gid: Option<u32>,
    /// Behavioral options.
    #[serde(default)]
    pub options: SetAclOptions,
}

/// Options for [`get_acl`](crate::get_acl).
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GetAclOptions {
    /// Collapse bit sets that match a predefined level into their
    /// `BASIC` representation.
    pub simplified: bool,
    /// Resolve numeric identities to names via the injected resolver.
    pub resolve_ids: bool,
}

impl Default for GetAclOptions {
    fn default() -> Self {
        Self {
            simplified: true,
            resolve_ids: false,
        }
    }
}

/// Request to read the ACL on a path.
#[derive(Debug, Clone, Deserialize)]
pub struct GetAclRequest {
    /// Target path; `CLUSTER:` shorthand accepted.
    pub path: String,
    /// Behavioral options.
    #[serde(default)]
    pub options: GetAclOptions,
}

/// Options for [`set_perm`](crate::set_perm).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct SetPermOptions {
    /// Remove any ACL so the mode alone governs access.
    pub stripacl: bool,
    /// Apply to the whole subtree.
    pub recursive: bool,
    /// Descend into filesystems mounted below the path.
    pub traverse: bool,
}

/// Request to set a unix mode on a path.
#[derive(Debug, Clone, Deserialize)]
pub struct SetPermRequest {
    /// Target path; `CLUSTER:` shorthand accepted.
    pub path: String,
    /// Octal mode string, e.g. `"755"`. `None` changes ownership and
    /// stripping only.
    #[serde(default)]
    pub mode: Option<String>,
    /// New owner, if any.
    #[serde(default)]
    pub uid: Option<u32>,
    /// New owning group, if any.
    #[serde(default)]
    pub gid: Option<u32>,
    /// Behavioral options.
    #[serde(default)]
    pub options: SetPermOptions,
}

/// Options for [`chown`](crate::chown).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ChownOptions {
    /// Apply to the whole subtree.
    pub recursive: bool,
    /// Descend into filesystems mounted below the path.
    pub traverse: bool,
}

/// Request to change ownership of a path.
#[derive(Debug, Clone, Deserialize)]
pub struct ChownRequest {
    /// Target path; `CLUSTER:` shorthand accepted.
    pub path: String,
    /// New owner; at least one of `uid`/`gid` must be given.
    #[serde(default)]
    pub uid: Option<u32>,
    /// New owning group.
    #[serde(default)]
    pub gid: Option<u32>,
    /// Behavioral options.
    #[serde(default)]
    pub options: ChownOptions,
}

/// Options for [`add_to_acl`](crate::add_to_acl).
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct GrantOptions {
    /// Proceed even when the target directory already holds data.
    pub force: bool,
}

/// Request to grant simplified access levels into a directory.
#[derive(Debug, Clone, Deserialize)]
pub struct GrantRequest {
    /// Target directory; `CLUSTER:` shorthand accepted.
    pub path: String,
    /// The grants to expand into a full ACL.
    pub entries: Vec<GrantEntry>,
    /// Behavioral options.
    #[serde(default)]
    pub options: GrantOptions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_acl_options_default_to_canonicalize() {
        let request: SetAclRequest = serde_json::from_value(json!({
            "path": "/mnt/tank",
            "acltype": "NFS4"
        }))
        .unwrap();
        assert!(request.options.canonicalize);
        assert!(!request.options.stripacl);
        assert!(request.dacl.is_empty());
        assert!(!request.nfs41_flags.any());
    }

    #[test]
    fn get_acl_defaults_to_simplified_without_id_resolution() {
        let request: GetAclRequest =
            serde_json::from_value(json!({"path": "/mnt/tank"})).unwrap();
        assert!(request.options.simplified);
        assert!(!request.options.resolve_ids);
    }

    #[test]
    fn grant_entries_deserialize() {
        let request: GrantRequest = serde_json::from_value(json!({
            "path": "CLUSTER:tank/share",
            "entries": [{"id_type": "USER", "id": 1001, "access": "MODIFY"}]
        }))
        .unwrap();
        assert_eq!(request.entries.len(), 1);
        assert!(!request.options.force);
    }
}
