#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `api` is the operation surface of the permission subsystem: five
//! contracts (set ACL, get ACL, set mode, change owner, simplified grant)
//! expressed as serde request shapes, exhaustive precondition validation,
//! and dispatch into the `jobs` engine.
//!
//! # Design
//!
//! Every mutating operation validates its whole request first and
//! accumulates problems in a [`ValidationErrors`] report keyed by dotted
//! schema paths; a job is only spawned once the report is empty. Reads
//! take no lock. Identity resolution is injected through [`IdResolver`];
//! this crate never consults directory services itself.

mod error;
mod ops;
mod path;
mod request;

#[cfg(test)]
mod tests;

pub use error::{CallError, ValidationErrors, ValidationIssue};
pub use ops::{AclInfo, IdResolver, add_to_acl, chown, get_acl, set_acl, set_perm};
pub use path::{CLUSTER_PATH_BASE, CLUSTER_PREFIX, rewrite_cluster_path};
pub use request::{
    ChownOptions, ChownRequest, GetAclOptions, GetAclRequest, GrantOptions, GrantRequest,
    SetAclOptions, SetAclRequest, SetPermOptions, SetPermRequest,
};
