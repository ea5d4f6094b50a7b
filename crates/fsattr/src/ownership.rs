//! Raw-id conversions for ownership application.
//!
//! `rustix` treats id construction as unsafe because a wrong id silently
//! re-owns files. Request ids arrive pre-validated from the API layer, so
//! the conversion is confined to these two shims.

#![allow(unsafe_code)]

pub(crate) fn uid_from_raw(raw: rustix::process::RawUid) -> rustix::fs::Uid {
    rustix::fs::Uid::from_raw(raw)
}

pub(crate) fn gid_from_raw(raw: rustix::process::RawGid) -> rustix::fs::Gid {
    rustix::fs::Gid::from_raw(raw)
}
