use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A loosely-keyed ACL entry as received at the API boundary.
///
/// Entries stay in map form until [`validate`](crate::validate) has checked
/// the dialect's exact-key-set invariant; only then are they parsed into the
/// typed representation.
pub type RawAce = serde_json::Map<String, serde_json::Value>;

/// Error produced when a validated raw entry fails to parse into its typed
/// form (for example an unknown `BASIC` token inside `perms`).
#[derive(Debug, Error)]
#[error("ACL entry {index}: {source}")]
pub struct EntryParseError {
    /// Index of the offending entry in the submitted list.
    pub index: usize,
    #[source]
    source: serde_json::Error,
}

/// NFSv4 ACE type. Special principals may only carry ALLOW entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AceType {
    /// Access allowed.
    #[serde(rename = "ALLOW")]
    Allow,
    /// Access denied.
    #[serde(rename = "DENY")]
    Deny,
}

/// NFSv4 principal tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nfs4Tag {
    /// The owner of the file.
    #[serde(rename = "owner@")]
    Owner,
    /// The owning group of the file.
    #[serde(rename = "group@")]
    Group,
    /// Every principal.
    #[serde(rename = "everyone@")]
    Everyone,
    /// A named user, identified by `id`.
    #[serde(rename = "USER")]
    User,
    /// A named group, identified by `id`.
    #[serde(rename = "GROUP")]
    NamedGroup,
}

impl Nfs4Tag {
    /// Returns the wire spelling of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner@",
            Self::Group => "group@",
            Self::Everyone => "everyone@",
            Self::User => "USER",
            Self::NamedGroup => "GROUP",
        }
    }

    /// Special tags denote a structural role instead of a numeric identity.
    #[must_use]
    pub const fn is_special(self) -> bool {
        matches!(self, Self::Owner | Self::Group | Self::Everyone)
    }
}

/// Predefined simplified permission levels for the NFSv4 dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BasicPerm {
    /// All permission bits.
    #[serde(rename = "FULL_CONTROL")]
    FullControl,
    /// Everything except changing the ACL or the owner.
    #[serde(rename = "MODIFY")]
    Modify,
    /// Sufficient rights to traverse a directory and read file contents.
    #[serde(rename = "READ")]
    Read,
    /// Sufficient rights to traverse a directory, but not read contents.
    #[serde(rename = "TRAVERSE")]
    Traverse,
}

/// Predefined simplified inheritance levels for the NFSv4 dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BasicFlag {
    /// File and directory inheritance.
    #[serde(rename = "INHERIT")]
    Inherit,
    /// No inheritance; the entry applies to the object itself.
    #[serde(rename = "NOINHERIT")]
    Noinherit,
}

/// The full NFSv4 permission bit set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Nfs4PermBits {
    /// Read data from file / list directory.
    pub read_data: bool,
    /// Write data to file / create file in directory.
    pub write_data: bool,
    /// Append data to file / create subdirectory.
    pub append_data: bool,
    /// Read named attributes.
    pub read_named_attrs: bool,
    /// Write named attributes.
    pub write_named_attrs: bool,
    /// Execute file / search directory.
    pub execute: bool,
    /// Delete a child within a directory.
    pub delete_child: bool,
    /// Read file attributes.
    pub read_attributes: bool,
    /// Write file attributes.
    pub write_attributes: bool,
    /// Delete the file itself.
    pub delete: bool,
    /// Read the ACL.
    pub read_acl: bool,
    /// Write the ACL.
    pub write_acl: bool,
    /// Change the owner.
    pub write_owner: bool,
    /// Windows synchronize semantics.
    pub synchronize: bool,
}

impl Nfs4PermBits {
    /// All permission bits set.
    #[must_use]
    pub const fn full_control() -> Self {
        Self {
            read_data: true,
            write_data: true,
            append_data: true,
            read_named_attrs: true,
            write_named_attrs: true,
            execute: true,
            delete_child: true,
            read_attributes: true,
            write_attributes: true,
            delete: true,
            read_acl: true,
            write_acl: true,
            write_owner: true,
            synchronize: true,
        }
    }

    /// Everything except WRITE_ACL and WRITE_OWNER.
    #[must_use]
    pub const fn modify() -> Self {
        let mut bits = Self::full_control();
        bits.write_acl = false;
        bits.write_owner = false;
        bits
    }

    /// Read contents, attributes, and the ACL; traverse directories.
    #[must_use]
    pub const fn read() -> Self {
        Self {
            read_data: true,
            read_named_attrs: true,
            read_attributes: true,
            read_acl: true,
            execute: true,
            synchronize: true,
            write_data: false,
            append_data: false,
            write_named_attrs: false,
            delete_child: false,
            write_attributes: false,
            delete: false,
            write_acl: false,
            write_owner: false,
        }
    }

    /// Traverse directories without reading file contents.
    #[must_use]
    pub const fn traverse() -> Self {
        let mut bits = Self::read();
        bits.read_data = false;
        bits
    }

    /// Returns the simplified level these bits collapse to, if any.
    #[must_use]
    pub fn basic_level(&self) -> Option<BasicPerm> {
        if *self == Self::full_control() {
            Some(BasicPerm::FullControl)
        } else if *self == Self::modify() {
            Some(BasicPerm::Modify)
        } else if *self == Self::read() {
            Some(BasicPerm::Read)
        } else if *self == Self::traverse() {
            Some(BasicPerm::Traverse)
        } else {
            None
        }
    }
}

impl From<BasicPerm> for Nfs4PermBits {
    fn from(level: BasicPerm) -> Self {
        match level {
            BasicPerm::FullControl => Self::full_control(),
            BasicPerm::Modify => Self::modify(),
            BasicPerm::Read => Self::read(),
            BasicPerm::Traverse => Self::traverse(),
        }
    }
}

/// The NFSv4 inheritance flag bit set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Nfs4FlagBits {
    /// Entry applies to files created in this directory.
    pub file_inherit: bool,
    /// Entry applies to subdirectories.
    pub directory_inherit: bool,
    /// Inheritance stops after one level.
    pub no_propagate_inherit: bool,
    /// Entry exists for inheritance only, not for the object itself.
    pub inherit_only: bool,
    /// Entry was inherited from a parent directory.
    pub inherited: bool,
}

impl Nfs4FlagBits {
    /// File and directory inheritance, the expansion of `BASIC: INHERIT`.
    #[must_use]
    pub const fn inherit() -> Self {
        Self {
            file_inherit: true,
            directory_inherit: true,
            no_propagate_inherit: false,
            inherit_only: false,
            inherited: false,
        }
    }

    /// Returns the simplified level these flags collapse to, if any.
    #[must_use]
    pub fn basic_level(&self) -> Option<BasicFlag> {
        if *self == Self::inherit() {
            Some(BasicFlag::Inherit)
        } else if *self == Self::default() {
            Some(BasicFlag::Noinherit)
        } else {
            None
        }
    }
}

impl From<BasicFlag> for Nfs4FlagBits {
    fn from(level: BasicFlag) -> Self {
        match level {
            BasicFlag::Inherit => Self::inherit(),
            BasicFlag::Noinherit => Self::default(),
        }
    }
}

/// NFSv4 entry permissions: either individual bits or a single simplified
/// `BASIC` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NfsPerms {
    /// A simplified permission level.
    Basic {
        /// The named level.
        #[serde(rename = "BASIC")]
        basic: BasicPerm,
    },
    /// Individual permission bits.
    Bits(Nfs4PermBits),
}

impl NfsPerms {
    /// Resolves the permissions to their full bit representation.
    #[must_use]
    pub fn bits(&self) -> Nfs4PermBits {
        match self {
            Self::Basic { basic } => Nfs4PermBits::from(*basic),
            Self::Bits(bits) => *bits,
        }
    }
}

/// NFSv4 entry flags: either individual bits or a single simplified `BASIC`
/// token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NfsFlags {
    /// A simplified inheritance level.
    Basic {
        /// The named level.
        #[serde(rename = "BASIC")]
        basic: BasicFlag,
    },
    /// Individual flag bits.
    Bits(Nfs4FlagBits),
}

impl NfsFlags {
    /// Whether the entry counts as inherited for canonical ordering.
    ///
    /// A `BASIC` representation always means "this entry's scope is the
    /// object itself", so it is never inherited regardless of level.
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        match self {
            Self::Basic { .. } => false,
            Self::Bits(bits) => bits.inherited,
        }
    }

    /// Resolves the flags to their full bit representation.
    #[must_use]
    pub fn bits(&self) -> Nfs4FlagBits {
        match self {
            Self::Basic { basic } => Nfs4FlagBits::from(*basic),
            Self::Bits(bits) => *bits,
        }
    }
}

/// One typed NFSv4 access control entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nfs4Ace {
    /// Principal tag.
    pub tag: Nfs4Tag,
    /// Numeric identity; meaningful only for non-special tags.
    pub id: Option<i32>,
    /// ALLOW or DENY.
    #[serde(rename = "type")]
    pub ace_type: AceType,
    /// Permission bits or a simplified level.
    pub perms: NfsPerms,
    /// Inheritance flags or a simplified level.
    pub flags: NfsFlags,
    /// Resolved principal name, present only when identity resolution was
    /// requested on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub who: Option<String>,
}

/// POSIX1e principal tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PosixTag {
    /// The owner of the file.
    #[serde(rename = "USER_OBJ")]
    UserObj,
    /// The owning group of the file.
    #[serde(rename = "GROUP_OBJ")]
    GroupObj,
    /// A named user, identified by `id`.
    #[serde(rename = "USER")]
    User,
    /// A named group, identified by `id`.
    #[serde(rename = "GROUP")]
    Group,
    /// Everyone else.
    #[serde(rename = "OTHER")]
    Other,
    /// The mask bounding named-entry and group permissions.
    #[serde(rename = "MASK")]
    Mask,
}

impl PosixTag {
    /// Returns the wire spelling of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserObj => "USER_OBJ",
            Self::GroupObj => "GROUP_OBJ",
            Self::User => "USER",
            Self::Group => "GROUP",
            Self::Other => "OTHER",
            Self::Mask => "MASK",
        }
    }

    /// Special tags denote a structural role instead of a numeric identity.
    #[must_use]
    pub const fn is_special(self) -> bool {
        matches!(self, Self::UserObj | Self::GroupObj | Self::Other | Self::Mask)
    }
}

/// POSIX1e permission triad.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PosixPerms {
    /// Read permission.
    pub read: bool,
    /// Write permission.
    pub write: bool,
    /// Execute/search permission.
    pub execute: bool,
}

impl PosixPerms {
    /// Builds a triad from individual bits.
    #[must_use]
    pub const fn new(read: bool, write: bool, execute: bool) -> Self {
        Self {
            read,
            write,
            execute,
        }
    }
}

fn default_posix_id() -> i32 {
    -1
}

/// One typed POSIX1e access control entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosixAce {
    /// Whether this is a default (inheritable) entry rather than an access
    /// entry.
    #[serde(default)]
    pub default: bool,
    /// Principal tag.
    pub tag: PosixTag,
    /// Numeric identity; `-1` for special tags.
    #[serde(default = "default_posix_id")]
    pub id: i32,
    /// The permission triad.
    pub perms: PosixPerms,
    /// Resolved principal name, present only when identity resolution was
    /// requested on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub who: Option<String>,
}

/// Per-ACL NFSv4.1 inheritance flags, the dialect-specific top-level
/// extension block. Only meaningful for the NFS4 dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Nfs41Flags {
    /// The ACL participates in automatic inheritance.
    pub autoinherit: bool,
    /// The ACL is protected from inheritance changes.
    pub protected: bool,
    /// The ACL was defaulted rather than explicitly set.
    pub defaulted: bool,
}

impl Nfs41Flags {
    /// Whether any flag is set.
    #[must_use]
    pub fn any(&self) -> bool {
        *self != Self::default()
    }
}

/// A typed, dialect-tagged entry list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AclEntries {
    /// NFSv4 entries in evaluation order.
    Nfs4(Vec<Nfs4Ace>),
    /// POSIX1e entries.
    Posix1e(Vec<PosixAce>),
}

impl AclEntries {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Nfs4(entries) => entries.len(),
            Self::Posix1e(entries) => entries.len(),
        }
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_entries<T>(raw: &[RawAce]) -> Result<Vec<T>, EntryParseError>
where
    T: serde::de::DeserializeOwned,
{
    raw.iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(serde_json::Value::Object(entry.clone()))
                .map_err(|source| EntryParseError { index, source })
        })
        .collect()
}

/// Parses validated raw entries into typed NFSv4 entries.
pub fn parse_nfs4_entries(raw: &[RawAce]) -> Result<Vec<Nfs4Ace>, EntryParseError> {
    parse_entries(raw)
}

/// Parses validated raw entries into typed POSIX1e entries.
pub fn parse_posix_entries(raw: &[RawAce]) -> Result<Vec<PosixAce>, EntryParseError> {
    parse_entries(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn basic_perm_levels_resolve_to_distinct_bit_sets() {
        let levels = [
            BasicPerm::FullControl,
            BasicPerm::Modify,
            BasicPerm::Read,
            BasicPerm::Traverse,
        ];
        for level in levels {
            let bits = Nfs4PermBits::from(level);
            assert_eq!(bits.basic_level(), Some(level));
        }
        assert!(!Nfs4PermBits::modify().write_acl);
        assert!(!Nfs4PermBits::traverse().read_data);
    }

    #[test]
    fn perms_deserialize_as_basic_or_bits() {
        let basic: NfsPerms = serde_json::from_value(json!({"BASIC": "READ"})).unwrap();
        assert_eq!(basic.bits(), Nfs4PermBits::read());

        let bits: NfsPerms =
            serde_json::from_value(json!({"READ_DATA": true, "EXECUTE": true})).unwrap();
        assert!(bits.bits().read_data);
        assert!(bits.bits().execute);
        assert!(!bits.bits().write_data);
    }

    #[test]
    fn basic_flags_are_never_inherited() {
        let flags: NfsFlags = serde_json::from_value(json!({"BASIC": "INHERIT"})).unwrap();
        assert!(!flags.is_inherited());

        let inherited: NfsFlags = serde_json::from_value(json!({"INHERITED": true})).unwrap();
        assert!(inherited.is_inherited());
    }

    #[test]
    fn nfs4_entry_round_trips() {
        let value = json!({
            "tag": "USER",
            "id": 1001,
            "type": "ALLOW",
            "perms": {"BASIC": "MODIFY"},
            "flags": {"BASIC": "INHERIT"}
        });
        let ace: Nfs4Ace = serde_json::from_value(value).unwrap();
        assert_eq!(ace.tag, Nfs4Tag::User);
        assert_eq!(ace.id, Some(1001));
        assert_eq!(ace.ace_type, AceType::Allow);

        let back = serde_json::to_value(&ace).unwrap();
        assert_eq!(back["tag"], "USER");
        assert_eq!(back["type"], "ALLOW");
        assert!(back.get("who").is_none());
    }

    #[test]
    fn posix_entry_defaults() {
        let ace: PosixAce = serde_json::from_value(json!({
            "tag": "MASK",
            "perms": {"READ": true, "WRITE": true, "EXECUTE": true}
        }))
        .unwrap();
        assert!(!ace.default);
        assert_eq!(ace.id, -1);
        assert!(ace.tag.is_special());
    }

    #[test]
    fn parse_reports_offending_index() {
        let good = json!({
            "tag": "owner@", "id": null, "type": "ALLOW",
            "perms": {"BASIC": "FULL_CONTROL"}, "flags": {"BASIC": "NOINHERIT"}
        });
        let bad = json!({
            "tag": "owner@", "id": null, "type": "ALLOW",
            "perms": {"BASIC": "NOT_A_LEVEL"}, "flags": {"BASIC": "NOINHERIT"}
        });
        let raw: Vec<RawAce> = [good, bad]
            .into_iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect();
        let err = parse_nfs4_entries(&raw).unwrap_err();
        assert_eq!(err.index, 1);
    }
}
