#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `fsattr` is the per-path mutation capability behind permission change
//! jobs: it stores and retrieves ACLs in extended attributes, applies unix
//! modes and ownership, and probes which ACL dialect governs a path.
//!
//! NFSv4 ACLs live in the `system.nfs4_acl_xdr` attribute as big-endian
//! ACE records; POSIX1e ACLs live in `system.posix_acl_access` and
//! `system.posix_acl_default` in the kernel's little-endian version-2
//! layout. The codecs are exposed for testing but callers normally go
//! through [`read_acl`], [`write_acl`], and [`strip_acl`].
//!
//! This crate targets Unix systems; ACL storage has no portable fallback.

mod apply;
mod error;
mod nfs4;
mod ownership;
mod posix;
mod probe;
mod store;

pub use apply::{apply_mode, apply_owner};
pub use error::FsAttrError;
pub use nfs4::{NFS4_ACL_XATTR, decode_nfs4_acl, encode_nfs4_acl};
pub use posix::{POSIX_ACCESS_XATTR, POSIX_DEFAULT_XATTR, decode_posix_acl, encode_posix_acl};
pub use probe::probe_dialect;
pub use store::{PathAcl, read_acl, strip_acl, write_acl};
