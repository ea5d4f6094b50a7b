#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `acl` models the two ACL dialects supported by the permission subsystem:
//! the NFSv4 model (ordered, typed ALLOW/DENY entries with fine-grained
//! permission and inheritance bits) and the POSIX1e model (unordered
//! read/write/execute triads with access and default variants). A third
//! dialect value, [`AclDialect::Disabled`], marks paths whose protection
//! reduces to a plain mode.
//!
//! # Design
//!
//! - [`AclDialect`] is a closed enum carrying the per-dialect schema: the
//!   exact key set every entry must supply and the set of special principal
//!   tags that do not carry a numeric identity. The schema is immutable
//!   static data.
//! - [`validate`] checks a whole proposed ACL against the schema and the
//!   dialect's semantic rules, producing a complete ordered error report
//!   rather than failing fast. Malformed input is a normal outcome, never a
//!   panic.
//! - [`canonicalize`] reorders a validated NFSv4 ACL into the deterministic
//!   deny/allow x inherited/non-inherited form expected by platform ACL
//!   editors. It is the identity transform for every other dialect.
//! - [`expand_grant`] turns a simplified "grant READ/MODIFY/FULL_CONTROL to
//!   an id" request into a complete, dialect-correct ACL.
//!
//! # Invariants
//!
//! - Validation reports errors in entry order; within one entry the key-set
//!   check runs first and suppresses semantic checks, and the special-tag
//!   DENY check precedes the identity check. Callers may rely on this order.
//! - Canonicalization is idempotent and preserves relative input order
//!   within each partition bucket.
//! - No function in this crate touches the filesystem; everything here is a
//!   pure computation safe to run inline in a request handler.

mod canon;
mod dialect;
mod entry;
mod grant;
mod trivial;
mod validate;

pub use canon::{canonicalize, canonicalize_nfs4};
pub use dialect::{ACL_XATTR_NAMES, AclDialect};
pub use entry::{
    AceType, AclEntries, BasicFlag, BasicPerm, EntryParseError, Nfs41Flags, Nfs4Ace, Nfs4FlagBits,
    Nfs4PermBits, Nfs4Tag, NfsFlags, NfsPerms, PosixAce, PosixPerms, PosixTag, RawAce,
    parse_nfs4_entries, parse_posix_entries,
};
pub use grant::{GrantAccess, GrantEntry, GrantError, GrantIdType, expand_grant};
pub use trivial::is_trivial;
pub use validate::{AclValidation, AclValidationError, validate};
