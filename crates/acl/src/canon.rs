use crate::dialect::AclDialect;
use crate::entry::{AceType, AclEntries, Nfs4Ace};

/// Reorders a validated ACL into canonical form.
///
/// Only the NFSv4 dialect defines a canonical order; for every other
/// dialect the input is returned unchanged. The canonicalizer is the only
/// component allowed to reorder entries.
#[must_use]
pub fn canonicalize(dialect: AclDialect, entries: AclEntries) -> AclEntries {
    match (dialect, entries) {
        (AclDialect::Nfs4, AclEntries::Nfs4(aces)) => AclEntries::Nfs4(canonicalize_nfs4(aces)),
        (_, entries) => entries,
    }
}

/// Orders NFSv4 ACEs following the Windows DACL guidelines:
///
/// 1. DENY entries that apply to the object itself
/// 2. ALLOW entries that apply to the object itself
/// 3. DENY entries inherited from a parent
/// 4. ALLOW entries inherited from a parent
///
/// The partition is stable: relative input order is preserved within each
/// bucket. True Windows canonical ordering also considers the depth an
/// entry was inherited from, which this model does not track.
#[must_use]
pub fn canonicalize_nfs4(entries: Vec<Nfs4Ace>) -> Vec<Nfs4Ace> {
    let mut deny_noinherit = Vec::new();
    let mut allow_noinherit = Vec::new();
    let mut deny_inherit = Vec::new();
    let mut allow_inherit = Vec::new();

    for ace in entries {
        let bucket = match (ace.ace_type, ace.flags.is_inherited()) {
            (AceType::Deny, false) => &mut deny_noinherit,
            (AceType::Allow, false) => &mut allow_noinherit,
            (AceType::Deny, true) => &mut deny_inherit,
            (AceType::Allow, true) => &mut allow_inherit,
        };
        bucket.push(ace);
    }

    let mut out = deny_noinherit;
    out.append(&mut allow_noinherit);
    out.append(&mut deny_inherit);
    out.append(&mut allow_inherit);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{BasicFlag, BasicPerm, Nfs4FlagBits, Nfs4Tag, NfsFlags, NfsPerms, PosixAce,
                       PosixPerms, PosixTag};

    fn ace(id: i32, ace_type: AceType, inherited: bool) -> Nfs4Ace {
        Nfs4Ace {
            tag: Nfs4Tag::User,
            id: Some(id),
            ace_type,
            perms: NfsPerms::Basic {
                basic: BasicPerm::Read,
            },
            flags: NfsFlags::Bits(Nfs4FlagBits {
                inherited,
                ..Nfs4FlagBits::default()
            }),
            who: None,
        }
    }

    #[test]
    fn partitions_into_documented_order() {
        // [Allow-inherit(A), Deny-noinherit(B), Allow-noinherit(C),
        //  Deny-inherit(D)] must come out as [B, C, D, A].
        let input = vec![
            ace(1, AceType::Allow, true),
            ace(2, AceType::Deny, false),
            ace(3, AceType::Allow, false),
            ace(4, AceType::Deny, true),
        ];
        let out = canonicalize_nfs4(input);
        let ids: Vec<_> = out.iter().map(|a| a.id.unwrap()).collect();
        assert_eq!(ids, [2, 3, 4, 1]);
    }

    #[test]
    fn partition_is_stable_within_buckets() {
        let input = vec![
            ace(1, AceType::Allow, false),
            ace(2, AceType::Allow, false),
            ace(3, AceType::Deny, false),
            ace(4, AceType::Deny, false),
        ];
        let out = canonicalize_nfs4(input);
        let ids: Vec<_> = out.iter().map(|a| a.id.unwrap()).collect();
        assert_eq!(ids, [3, 4, 1, 2]);
    }

    #[test]
    fn canonicalization_is_idempotent() {
        let input = vec![
            ace(1, AceType::Allow, true),
            ace(2, AceType::Deny, false),
            ace(3, AceType::Allow, false),
            ace(4, AceType::Deny, true),
        ];
        let once = canonicalize_nfs4(input);
        let twice = canonicalize_nfs4(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn basic_flags_count_as_not_inherited() {
        let mut basic_inherit = ace(1, AceType::Allow, false);
        basic_inherit.flags = NfsFlags::Basic {
            basic: BasicFlag::Inherit,
        };
        let input = vec![basic_inherit, ace(2, AceType::Allow, true)];
        let out = canonicalize_nfs4(input);
        // The BASIC entry sorts with the not-inherited bucket even though
        // its level is INHERIT.
        let ids: Vec<_> = out.iter().map(|a| a.id.unwrap()).collect();
        assert_eq!(ids, [1, 2]);
    }

    #[test]
    fn posix_dialect_is_identity() {
        let entries = AclEntries::Posix1e(vec![
            PosixAce {
                default: false,
                tag: PosixTag::Other,
                id: -1,
                perms: PosixPerms::default(),
                who: None,
            },
            PosixAce {
                default: true,
                tag: PosixTag::UserObj,
                id: -1,
                perms: PosixPerms::new(true, true, true),
                who: None,
            },
        ]);
        let out = canonicalize(AclDialect::Posix1e, entries.clone());
        assert_eq!(out, entries);
    }
}
