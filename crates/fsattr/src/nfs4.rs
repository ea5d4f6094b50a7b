//! Binary codec for NFSv4 ACLs stored in the `system.nfs4_acl_xdr`
//! extended attribute.
//!
//! The blob starts with one big-endian word of per-ACL NFSv4.1 flags,
//! followed by a sequence of ACE records:
//!
//! - type (4 bytes): ALLOW (0) or DENY (1)
//! - flags (4 bytes): inheritance flags plus the identifier-group bit
//! - mask (4 bytes): permission bits
//! - who length (4 bytes) and who string, padded to 4 bytes
//!
//! Special principals use the `OWNER@`/`GROUP@`/`EVERYONE@` spellings;
//! named principals store their numeric id in decimal with the
//! identifier-group flag distinguishing groups from users.

use std::io;

use acl::{
    AceType, Nfs41Flags, Nfs4Ace, Nfs4FlagBits, Nfs4PermBits, Nfs4Tag, NfsFlags, NfsPerms,
};

/// The extended attribute holding an NFSv4 ACL.
pub const NFS4_ACL_XATTR: &str = "system.nfs4_acl_xdr";

const ACE_TYPE_ALLOW: u32 = 0;
const ACE_TYPE_DENY: u32 = 1;

const FLAG_FILE_INHERIT: u32 = 0x0001;
const FLAG_DIRECTORY_INHERIT: u32 = 0x0002;
const FLAG_NO_PROPAGATE_INHERIT: u32 = 0x0004;
const FLAG_INHERIT_ONLY: u32 = 0x0008;
const FLAG_IDENTIFIER_GROUP: u32 = 0x0040;
const FLAG_INHERITED: u32 = 0x0080;

const MASK_READ_DATA: u32 = 0x0001;
const MASK_WRITE_DATA: u32 = 0x0002;
const MASK_APPEND_DATA: u32 = 0x0004;
const MASK_READ_NAMED_ATTRS: u32 = 0x0008;
const MASK_WRITE_NAMED_ATTRS: u32 = 0x0010;
const MASK_EXECUTE: u32 = 0x0020;
const MASK_DELETE_CHILD: u32 = 0x0040;
const MASK_READ_ATTRIBUTES: u32 = 0x0080;
const MASK_WRITE_ATTRIBUTES: u32 = 0x0100;
const MASK_DELETE: u32 = 0x10000;
const MASK_READ_ACL: u32 = 0x20000;
const MASK_WRITE_ACL: u32 = 0x40000;
const MASK_WRITE_OWNER: u32 = 0x80000;
const MASK_SYNCHRONIZE: u32 = 0x100000;

const ACL_FLAG_AUTOINHERIT: u32 = 0x0001;
const ACL_FLAG_PROTECTED: u32 = 0x0002;
const ACL_FLAG_DEFAULTED: u32 = 0x0004;

fn mask_from_perms(perms: &Nfs4PermBits) -> u32 {
    let mut mask = 0;
    for (set, bit) in [
        (perms.read_data, MASK_READ_DATA),
        (perms.write_data, MASK_WRITE_DATA),
        (perms.append_data, MASK_APPEND_DATA),
        (perms.read_named_attrs, MASK_READ_NAMED_ATTRS),
        (perms.write_named_attrs, MASK_WRITE_NAMED_ATTRS),
        (perms.execute, MASK_EXECUTE),
        (perms.delete_child, MASK_DELETE_CHILD),
        (perms.read_attributes, MASK_READ_ATTRIBUTES),
        (perms.write_attributes, MASK_WRITE_ATTRIBUTES),
        (perms.delete, MASK_DELETE),
        (perms.read_acl, MASK_READ_ACL),
        (perms.write_acl, MASK_WRITE_ACL),
        (perms.write_owner, MASK_WRITE_OWNER),
        (perms.synchronize, MASK_SYNCHRONIZE),
    ] {
        if set {
            mask |= bit;
        }
    }
    mask
}

fn perms_from_mask(mask: u32) -> Nfs4PermBits {
    Nfs4PermBits {
        read_data: mask & MASK_READ_DATA != 0,
        write_data: mask & MASK_WRITE_DATA != 0,
        append_data: mask & MASK_APPEND_DATA != 0,
        read_named_attrs: mask & MASK_READ_NAMED_ATTRS != 0,
        write_named_attrs: mask & MASK_WRITE_NAMED_ATTRS != 0,
        execute: mask & MASK_EXECUTE != 0,
        delete_child: mask & MASK_DELETE_CHILD != 0,
        read_attributes: mask & MASK_READ_ATTRIBUTES != 0,
        write_attributes: mask & MASK_WRITE_ATTRIBUTES != 0,
        delete: mask & MASK_DELETE != 0,
        read_acl: mask & MASK_READ_ACL != 0,
        write_acl: mask & MASK_WRITE_ACL != 0,
        write_owner: mask & MASK_WRITE_OWNER != 0,
        synchronize: mask & MASK_SYNCHRONIZE != 0,
    }
}

fn flags_word(flags: &Nfs4FlagBits, identifier_group: bool) -> u32 {
    let mut word = 0;
    for (set, bit) in [
        (flags.file_inherit, FLAG_FILE_INHERIT),
        (flags.directory_inherit, FLAG_DIRECTORY_INHERIT),
        (flags.no_propagate_inherit, FLAG_NO_PROPAGATE_INHERIT),
        (flags.inherit_only, FLAG_INHERIT_ONLY),
        (flags.inherited, FLAG_INHERITED),
        (identifier_group, FLAG_IDENTIFIER_GROUP),
    ] {
        if set {
            word |= bit;
        }
    }
    word
}

fn flags_from_word(word: u32) -> Nfs4FlagBits {
    Nfs4FlagBits {
        file_inherit: word & FLAG_FILE_INHERIT != 0,
        directory_inherit: word & FLAG_DIRECTORY_INHERIT != 0,
        no_propagate_inherit: word & FLAG_NO_PROPAGATE_INHERIT != 0,
        inherit_only: word & FLAG_INHERIT_ONLY != 0,
        inherited: word & FLAG_INHERITED != 0,
    }
}

fn who_of(ace: &Nfs4Ace) -> String {
    match ace.tag {
        Nfs4Tag::Owner => "OWNER@".to_string(),
        Nfs4Tag::Group => "GROUP@".to_string(),
        Nfs4Tag::Everyone => "EVERYONE@".to_string(),
        Nfs4Tag::User | Nfs4Tag::NamedGroup => ace.id.unwrap_or(-1).to_string(),
    }
}

/// Serializes an NFSv4 ACL to its attribute representation.
#[must_use]
pub fn encode_nfs4_acl(entries: &[Nfs4Ace], acl_flags: Nfs41Flags) -> Vec<u8> {
    let mut word = 0;
    for (set, bit) in [
        (acl_flags.autoinherit, ACL_FLAG_AUTOINHERIT),
        (acl_flags.protected, ACL_FLAG_PROTECTED),
        (acl_flags.defaulted, ACL_FLAG_DEFAULTED),
    ] {
        if set {
            word |= bit;
        }
    }

    let mut data = word.to_be_bytes().to_vec();
    for ace in entries {
        let ace_type = match ace.ace_type {
            AceType::Allow => ACE_TYPE_ALLOW,
            AceType::Deny => ACE_TYPE_DENY,
        };
        let identifier_group = ace.tag == Nfs4Tag::NamedGroup;
        data.extend_from_slice(&ace_type.to_be_bytes());
        data.extend_from_slice(&flags_word(&ace.flags.bits(), identifier_group).to_be_bytes());
        data.extend_from_slice(&mask_from_perms(&ace.perms.bits()).to_be_bytes());

        let who = who_of(ace);
        let who_bytes = who.as_bytes();
        data.extend_from_slice(&(who_bytes.len() as u32).to_be_bytes());
        data.extend_from_slice(who_bytes);
        let padding = (4 - (who_bytes.len() % 4)) % 4;
        data.extend(std::iter::repeat_n(0u8, padding));
    }
    data
}

fn read_word(data: &[u8], offset: &mut usize) -> io::Result<u32> {
    let bytes: [u8; 4] = data
        .get(*offset..*offset + 4)
        .and_then(|slice| slice.try_into().ok())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "truncated ACE"))?;
    *offset += 4;
    Ok(u32::from_be_bytes(bytes))
}

/// Parses an NFSv4 ACL from its attribute representation.
pub fn decode_nfs4_acl(data: &[u8]) -> io::Result<(Vec<Nfs4Ace>, Nfs41Flags)> {
    let mut offset = 0;
    let word = read_word(data, &mut offset)?;
    let acl_flags = Nfs41Flags {
        autoinherit: word & ACL_FLAG_AUTOINHERIT != 0,
        protected: word & ACL_FLAG_PROTECTED != 0,
        defaulted: word & ACL_FLAG_DEFAULTED != 0,
    };

    let mut entries = Vec::new();
    while offset < data.len() {
        let ace_type = match read_word(data, &mut offset)? {
            ACE_TYPE_ALLOW => AceType::Allow,
            ACE_TYPE_DENY => AceType::Deny,
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("invalid NFSv4 ACE type: {other}"),
                ));
            }
        };
        let flag_word = read_word(data, &mut offset)?;
        let mask = read_word(data, &mut offset)?;
        let who_len = read_word(data, &mut offset)? as usize;

        let who_bytes = data
            .get(offset..offset + who_len)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "truncated ACE who field"))?;
        let who = std::str::from_utf8(who_bytes)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "invalid UTF-8 in ACE"))?;
        offset += who_len + (4 - (who_len % 4)) % 4;
        if offset > data.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "truncated ACE who field",
            ));
        }

        let (tag, id) = match who {
            "OWNER@" => (Nfs4Tag::Owner, None),
            "GROUP@" => (Nfs4Tag::Group, None),
            "EVERYONE@" => (Nfs4Tag::Everyone, None),
            numeric => {
                let id: i32 = numeric.parse().map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid ACE principal: {numeric}"),
                    )
                })?;
                let tag = if flag_word & FLAG_IDENTIFIER_GROUP != 0 {
                    Nfs4Tag::NamedGroup
                } else {
                    Nfs4Tag::User
                };
                (tag, Some(id))
            }
        };

        entries.push(Nfs4Ace {
            tag,
            id,
            ace_type,
            perms: NfsPerms::Bits(perms_from_mask(mask)),
            flags: NfsFlags::Bits(flags_from_word(flag_word)),
            who: None,
        });
    }

    Ok((entries, acl_flags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use acl::{BasicFlag, BasicPerm};

    fn ace(tag: Nfs4Tag, id: Option<i32>, ace_type: AceType) -> Nfs4Ace {
        Nfs4Ace {
            tag,
            id,
            ace_type,
            perms: NfsPerms::Basic {
                basic: BasicPerm::Modify,
            },
            flags: NfsFlags::Basic {
                basic: BasicFlag::Inherit,
            },
            who: None,
        }
    }

    #[test]
    fn acl_round_trips_with_expanded_bits() {
        let input = vec![
            ace(Nfs4Tag::Owner, None, AceType::Allow),
            ace(Nfs4Tag::User, Some(1001), AceType::Allow),
            ace(Nfs4Tag::NamedGroup, Some(2000), AceType::Deny),
        ];
        let flags = Nfs41Flags {
            autoinherit: true,
            ..Nfs41Flags::default()
        };

        let blob = encode_nfs4_acl(&input, flags);
        let (decoded, decoded_flags) = decode_nfs4_acl(&blob).unwrap();

        assert_eq!(decoded_flags, flags);
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].tag, Nfs4Tag::Owner);
        assert_eq!(decoded[0].id, None);
        assert_eq!(decoded[1].tag, Nfs4Tag::User);
        assert_eq!(decoded[1].id, Some(1001));
        assert_eq!(decoded[2].tag, Nfs4Tag::NamedGroup);
        assert_eq!(decoded[2].ace_type, AceType::Deny);
        // BASIC levels expand to their bit representation on disk.
        assert_eq!(decoded[1].perms.bits(), acl::Nfs4PermBits::modify());
        assert_eq!(decoded[1].flags.bits(), acl::Nfs4FlagBits::inherit());
    }

    #[test]
    fn empty_acl_is_just_the_flags_word() {
        let blob = encode_nfs4_acl(&[], Nfs41Flags::default());
        assert_eq!(blob.len(), 4);
        let (decoded, flags) = decode_nfs4_acl(&blob).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(flags, Nfs41Flags::default());
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let blob = encode_nfs4_acl(
            &[ace(Nfs4Tag::Everyone, None, AceType::Allow)],
            Nfs41Flags::default(),
        );
        assert!(decode_nfs4_acl(&blob[..blob.len() - 2]).is_err());
        assert!(decode_nfs4_acl(&[0, 0]).is_err());
    }

    #[test]
    fn unknown_ace_type_is_rejected() {
        let mut blob = encode_nfs4_acl(
            &[ace(Nfs4Tag::Everyone, None, AceType::Allow)],
            Nfs41Flags::default(),
        );
        blob[7] = 9;
        assert!(decode_nfs4_acl(&blob).is_err());
    }
}
