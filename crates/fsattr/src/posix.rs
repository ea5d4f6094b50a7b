//! Binary codec for POSIX1e ACLs in the kernel's extended attribute
//! layout: a little-endian version header (2) followed by 8-byte entries
//! of tag, permission bits, and identity. Access entries live under
//! `system.posix_acl_access`, default entries under
//! `system.posix_acl_default`.

use std::io;

use acl::{PosixAce, PosixPerms, PosixTag};

/// The extended attribute holding the access POSIX1e ACL.
pub const POSIX_ACCESS_XATTR: &str = "system.posix_acl_access";
/// The extended attribute holding the default (inheritable) POSIX1e ACL.
pub const POSIX_DEFAULT_XATTR: &str = "system.posix_acl_default";

const POSIX_ACL_VERSION: u32 = 2;

const TAG_USER_OBJ: u16 = 0x01;
const TAG_USER: u16 = 0x02;
const TAG_GROUP_OBJ: u16 = 0x04;
const TAG_GROUP: u16 = 0x08;
const TAG_MASK: u16 = 0x10;
const TAG_OTHER: u16 = 0x20;

const PERM_EXECUTE: u16 = 0x1;
const PERM_WRITE: u16 = 0x2;
const PERM_READ: u16 = 0x4;

const UNDEFINED_ID: u32 = u32::MAX;

fn tag_word(tag: PosixTag) -> u16 {
    match tag {
        PosixTag::UserObj => TAG_USER_OBJ,
        PosixTag::User => TAG_USER,
        PosixTag::GroupObj => TAG_GROUP_OBJ,
        PosixTag::Group => TAG_GROUP,
        PosixTag::Mask => TAG_MASK,
        PosixTag::Other => TAG_OTHER,
    }
}

fn tag_from_word(word: u16) -> io::Result<PosixTag> {
    match word {
        TAG_USER_OBJ => Ok(PosixTag::UserObj),
        TAG_USER => Ok(PosixTag::User),
        TAG_GROUP_OBJ => Ok(PosixTag::GroupObj),
        TAG_GROUP => Ok(PosixTag::Group),
        TAG_MASK => Ok(PosixTag::Mask),
        TAG_OTHER => Ok(PosixTag::Other),
        other => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid POSIX ACL tag: {other:#x}"),
        )),
    }
}

/// Serializes one family (access or default) of POSIX1e entries.
///
/// The `default` flag on each entry is ignored here; callers split the
/// entry list into families before encoding.
#[must_use]
pub fn encode_posix_acl(entries: &[PosixAce]) -> Vec<u8> {
    let mut data = POSIX_ACL_VERSION.to_le_bytes().to_vec();
    for ace in entries {
        let mut perm = 0u16;
        if ace.perms.read {
            perm |= PERM_READ;
        }
        if ace.perms.write {
            perm |= PERM_WRITE;
        }
        if ace.perms.execute {
            perm |= PERM_EXECUTE;
        }
        let id = if ace.id < 0 {
            UNDEFINED_ID
        } else {
            ace.id as u32
        };
        data.extend_from_slice(&tag_word(ace.tag).to_le_bytes());
        data.extend_from_slice(&perm.to_le_bytes());
        data.extend_from_slice(&id.to_le_bytes());
    }
    data
}

/// Parses one family of POSIX1e entries, marking each with `default`.
pub fn decode_posix_acl(data: &[u8], default: bool) -> io::Result<Vec<PosixAce>> {
    if data.len() < 4 || (data.len() - 4) % 8 != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "malformed POSIX ACL attribute",
        ));
    }
    let version = u32::from_le_bytes(data[..4].try_into().unwrap_or_default());
    if version != POSIX_ACL_VERSION {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported POSIX ACL version: {version}"),
        ));
    }

    let mut entries = Vec::with_capacity((data.len() - 4) / 8);
    for record in data[4..].chunks_exact(8) {
        let tag = tag_from_word(u16::from_le_bytes([record[0], record[1]]))?;
        let perm = u16::from_le_bytes([record[2], record[3]]);
        let id = u32::from_le_bytes([record[4], record[5], record[6], record[7]]);
        entries.push(PosixAce {
            default,
            tag,
            id: if id == UNDEFINED_ID { -1 } else { id as i32 },
            perms: PosixPerms::new(
                perm & PERM_READ != 0,
                perm & PERM_WRITE != 0,
                perm & PERM_EXECUTE != 0,
            ),
            who: None,
        });
    }
    Ok(entries)
}
