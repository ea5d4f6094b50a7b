use crate::entry::{AceType, AclEntries, Nfs4FlagBits, PosixTag};

/// Whether an ACL is trivial, i.e. expressible losslessly as a plain unix
/// mode.
///
/// POSIX1e: trivial iff the list is exactly one access entry for each of
/// the three structural tags (owner, group, other) with no default
/// entries; an empty list, meaning no ACL is stored at all, is trivial
/// too. NFSv4: trivial iff every entry is a special-tag ALLOW with no
/// inheritance behaviour.
#[must_use]
pub fn is_trivial(entries: &AclEntries) -> bool {
    match entries {
        AclEntries::Posix1e(aces) => {
            if aces.is_empty() {
                return true;
            }
            let structural =
                |tag: PosixTag| aces.iter().filter(|a| !a.default && a.tag == tag).count() == 1;
            aces.len() == 3
                && structural(PosixTag::UserObj)
                && structural(PosixTag::GroupObj)
                && structural(PosixTag::Other)
        }
        AclEntries::Nfs4(aces) => aces.iter().all(|ace| {
            ace.tag.is_special()
                && ace.ace_type == AceType::Allow
                && ace.flags.bits() == Nfs4FlagBits::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{
        BasicPerm, Nfs4Ace, Nfs4Tag, NfsFlags, NfsPerms, PosixAce, PosixPerms,
    };

    fn posix(tag: PosixTag, default: bool) -> PosixAce {
        PosixAce {
            default,
            tag,
            id: -1,
            perms: PosixPerms::new(true, false, false),
            who: None,
        }
    }

    fn nfs4(tag: Nfs4Tag, ace_type: AceType, flags: NfsFlags) -> Nfs4Ace {
        Nfs4Ace {
            tag,
            id: if tag.is_special() { None } else { Some(1001) },
            ace_type,
            perms: NfsPerms::Basic {
                basic: BasicPerm::Read,
            },
            flags,
            who: None,
        }
    }

    #[test]
    fn three_structural_posix_entries_are_trivial() {
        let acl = AclEntries::Posix1e(vec![
            posix(PosixTag::UserObj, false),
            posix(PosixTag::GroupObj, false),
            posix(PosixTag::Other, false),
        ]);
        assert!(is_trivial(&acl));
    }

    #[test]
    fn named_or_default_posix_entries_are_not_trivial() {
        let with_named = AclEntries::Posix1e(vec![
            posix(PosixTag::UserObj, false),
            posix(PosixTag::User, false),
            posix(PosixTag::Other, false),
        ]);
        assert!(!is_trivial(&with_named));

        let with_default = AclEntries::Posix1e(vec![
            posix(PosixTag::UserObj, false),
            posix(PosixTag::GroupObj, false),
            posix(PosixTag::Other, true),
        ]);
        assert!(!is_trivial(&with_default));
    }

    #[test]
    fn posix_triviality_requires_the_exact_structural_triple() {
        // No stored ACL reduces to the mode by definition.
        assert!(is_trivial(&AclEntries::Posix1e(vec![])));

        let two_entries = AclEntries::Posix1e(vec![
            posix(PosixTag::UserObj, false),
            posix(PosixTag::GroupObj, false),
        ]);
        assert!(!is_trivial(&two_entries));

        let duplicate_tag = AclEntries::Posix1e(vec![
            posix(PosixTag::UserObj, false),
            posix(PosixTag::UserObj, false),
            posix(PosixTag::Other, false),
        ]);
        assert!(!is_trivial(&duplicate_tag));
    }

    #[test]
    fn special_allow_nfs4_entries_without_inheritance_are_trivial() {
        let flags = NfsFlags::Bits(Nfs4FlagBits::default());
        let acl = AclEntries::Nfs4(vec![
            nfs4(Nfs4Tag::Owner, AceType::Allow, flags),
            nfs4(Nfs4Tag::Group, AceType::Allow, flags),
            nfs4(Nfs4Tag::Everyone, AceType::Allow, flags),
        ]);
        assert!(is_trivial(&acl));
    }

    #[test]
    fn named_deny_or_inheriting_nfs4_entries_are_not_trivial() {
        let plain = NfsFlags::Bits(Nfs4FlagBits::default());
        assert!(!is_trivial(&AclEntries::Nfs4(vec![nfs4(
            Nfs4Tag::User,
            AceType::Allow,
            plain
        )])));
        assert!(!is_trivial(&AclEntries::Nfs4(vec![nfs4(
            Nfs4Tag::Everyone,
            AceType::Deny,
            plain
        )])));
        assert!(!is_trivial(&AclEntries::Nfs4(vec![nfs4(
            Nfs4Tag::Owner,
            AceType::Allow,
            NfsFlags::Bits(Nfs4FlagBits::inherit())
        )])));
    }
}
