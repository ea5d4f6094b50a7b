use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use acl::{
    AclDialect, AclEntries, AclValidation, Nfs41Flags, Nfs4Tag, NfsFlags, NfsPerms, PosixTag,
    parse_nfs4_entries, parse_posix_entries,
};
use jobs::{ChangeOptions, JobHandle, PermissionChange};

use crate::error::{CallError, ValidationErrors};
use crate::path::{directory_has_contents, validate_request_path};
use crate::request::{
    ChownRequest, GetAclRequest, GrantRequest, SetAclRequest, SetPermRequest,
};

/// External collaborator turning numeric identities into names.
///
/// Identity resolution lives outside this crate (directory services, NSS,
/// caches); operations that need it receive the capability injected.
pub trait IdResolver {
    /// Name of the user with this uid, if known.
    fn user_name(&self, uid: u32) -> Option<String>;
    /// Name of the group with this gid, if known.
    fn group_name(&self, gid: u32) -> Option<String>;
}

/// Response shape of [`get_acl`].
#[derive(Debug, Clone, Serialize)]
pub struct AclInfo {
    /// The resolved path the ACL was read from.
    pub path: String,
    /// Whether the ACL is expressible losslessly as a plain mode.
    pub trivial: bool,
    /// Owner of the path.
    pub uid: u32,
    /// Owning group of the path.
    pub gid: u32,
    /// The dialect governing the path.
    pub acltype: AclDialect,
    /// The stored entries.
    pub acl: AclEntries,
    /// Per-ACL NFSv4.1 flags; present only for the NFS4 dialect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nfs41_flags: Option<Nfs41Flags>,
}

fn map_acl_report(schema: &str, report: &AclValidation, verrors: &mut ValidationErrors) {
    for error in report.errors() {
        let attribute = match (error.index, error.field) {
            (Some(idx), Some(field)) => format!("{schema}.dacl.{idx}.{field}"),
            (Some(idx), None) => format!("{schema}.dacl.{idx}"),
            (None, _) => format!("{schema}.nfs41_flags"),
        };
        verrors.add(attribute, error.message.clone());
    }
}

/// Replaces the ACL on a path, submitting a permission change job.
///
/// Preconditions are checked completely before the job is created; the
/// returned handle observes a job that has already passed validation.
pub fn set_acl(request: SetAclRequest) -> Result<JobHandle, CallError> {
    const SCHEMA: &str = "filesystem_acl";

    let mut verrors = ValidationErrors::default();
    let path = validate_request_path(
        &format!("{SCHEMA}.path"),
        &request.path,
        request.options.recursive,
        &mut verrors,
    );

    if request.options.stripacl && !request.dacl.is_empty() {
        verrors.add(
            format!("{SCHEMA}.dacl"),
            "Simultaneously setting and removing ACL from path is not permitted.",
        );
    }
    if request.acltype == AclDialect::Disabled && !request.options.stripacl {
        verrors.add(
            format!("{SCHEMA}.acltype"),
            "ACL entries may not be written with the DISABLED ACL type.",
        );
    }

    let report = acl::validate(request.acltype, &request.dacl, request.nfs41_flags.any());
    map_acl_report(SCHEMA, &report, &mut verrors);

    // The on-disk dialect only matters when writing entries; stripping
    // probes it again inside the job.
    if !request.options.stripacl && std::fs::symlink_metadata(&path).is_ok() {
        let on_disk = fsattr::probe_dialect(&path)?;
        if on_disk != request.acltype {
            verrors.add(
                format!("{SCHEMA}.acltype"),
                format!(
                    "ACL type mismatch. On-disk format is [{on_disk}], but received [{}].",
                    request.acltype
                ),
            );
        }
    }

    verrors.check()?;

    let entries = match request.acltype {
        AclDialect::Posix1e => AclEntries::Posix1e(parse_posix_entries(&request.dacl)?),
        AclDialect::Nfs4 | AclDialect::Disabled => {
            AclEntries::Nfs4(parse_nfs4_entries(&request.dacl)?)
        }
    };
    let entries = if request.options.canonicalize {
        acl::canonicalize(request.acltype, entries)
    } else {
        entries
    };

    info!(
        path = %path.display(),
        acltype = %request.acltype,
        entries = entries.len(),
        recursive = request.options.recursive,
        "submitting set-ACL job"
    );
    let change = PermissionChange::SetAcl {
        entries,
        nfs41_flags: request.nfs41_flags,
        uid: request.uid,
        gid: request.gid,
        strip: request.options.stripacl,
    };
    Ok(jobs::spawn(
        path,
        change,
        ChangeOptions {
            recursive: request.options.recursive,
            traverse: request.options.traverse,
        },
    ))
}

/// Reads the ACL on a path. Takes no lock; the result is a snapshot.
pub fn get_acl(
    request: &GetAclRequest,
    resolver: Option<&dyn IdResolver>,
) -> Result<AclInfo, CallError> {
    const SCHEMA: &str = "filesystem.getacl";

    let mut verrors = ValidationErrors::default();
    let path = validate_request_path(&format!("{SCHEMA}.path"), &request.path, false, &mut verrors);
    verrors.check()?;

    let stored = fsattr::read_acl(&path)?;
    let mut entries = stored.entries;
    if request.options.simplified {
        simplify_entries(&mut entries);
    }
    if request.options.resolve_ids
        && let Some(resolver) = resolver
    {
        resolve_entry_ids(&mut entries, stored.uid, stored.gid, resolver);
    }

    Ok(AclInfo {
        path: path.display().to_string(),
        trivial: acl::is_trivial(&entries),
        uid: stored.uid,
        gid: stored.gid,
        acltype: stored.dialect,
        acl: entries,
        nfs41_flags: (stored.dialect == AclDialect::Nfs4).then_some(stored.nfs41_flags),
    })
}

/// Sets a unix mode (and optionally ownership) on a path.
pub fn set_perm(request: SetPermRequest) -> Result<JobHandle, CallError> {
    const SCHEMA: &str = "filesystem.setperm";

    let mut verrors = ValidationErrors::default();
    let path = validate_request_path(
        &format!("{SCHEMA}.path"),
        &request.path,
        request.options.recursive,
        &mut verrors,
    );

    let mode = match &request.mode {
        None => None,
        Some(text) => match u32::from_str_radix(text, 8) {
            Ok(0) => {
                verrors.add(
                    format!("{SCHEMA}.mode"),
                    "Empty permissions are not permitted.",
                );
                None
            }
            Ok(bits) if bits > 0o7777 => {
                verrors.add(
                    format!("{SCHEMA}.mode"),
                    format!("{text}: mode may not exceed octal 7777."),
                );
                None
            }
            Ok(bits) => Some(bits),
            Err(_) => {
                verrors.add(
                    format!("{SCHEMA}.mode"),
                    format!("{text}: not a valid octal mode."),
                );
                None
            }
        },
    };

    if std::fs::symlink_metadata(&path).is_ok() {
        let current = fsattr::read_acl(&path)?;
        if !acl::is_trivial(&current.entries) && !request.options.stripacl {
            verrors.add(
                format!("{SCHEMA}.mode"),
                "Non-trivial ACL present on path. The 'stripacl' option is required to change permissions.",
            );
        }
    }

    verrors.check()?;

    info!(path = %path.display(), mode, recursive = request.options.recursive, "submitting set-mode job");
    let change = PermissionChange::SetMode {
        mode,
        uid: request.uid,
        gid: request.gid,
        strip: request.options.stripacl,
    };
    Ok(jobs::spawn(
        path,
        change,
        ChangeOptions {
            recursive: request.options.recursive,
            traverse: request.options.traverse,
        },
    ))
}

/// Changes ownership of a path.
pub fn chown(request: ChownRequest) -> Result<JobHandle, CallError> {
    const SCHEMA: &str = "filesystem.chown";

    let mut verrors = ValidationErrors::default();
    if request.uid.is_none() && request.gid.is_none() {
        verrors.add(
            format!("{SCHEMA}.uid"),
            "Please specify either user or group to change.",
        );
    }
    let path = validate_request_path(
        &format!("{SCHEMA}.path"),
        &request.path,
        request.options.recursive,
        &mut verrors,
    );
    verrors.check()?;

    info!(path = %path.display(), uid = request.uid, gid = request.gid, "submitting chown job");
    let change = PermissionChange::Chown {
        uid: request.uid,
        gid: request.gid,
    };
    Ok(jobs::spawn(
        path,
        change,
        ChangeOptions {
            recursive: request.options.recursive,
            traverse: request.options.traverse,
        },
    ))
}

/// Grants simplified access levels into a directory by replacing its ACL
/// recursively.
///
/// A directory that already holds data is refused without `force`: the
/// grant overwrites every ACL beneath the path, which is surprising on a
/// populated tree.
pub fn add_to_acl(request: GrantRequest) -> Result<JobHandle, CallError> {
    const SCHEMA: &str = "filesystem.add_to_acl";

    let mut verrors = ValidationErrors::default();
    let path = validate_request_path(&format!("{SCHEMA}.path"), &request.path, true, &mut verrors);
    if request.entries.is_empty() {
        verrors.add(format!("{SCHEMA}.entries"), "At least one entry is required.");
    }
    verrors.check()?;

    if directory_has_contents(&path).map_err(|source| inspect_error(&path, source))?
        && !request.options.force
    {
        return Err(CallError::DataPresent { path });
    }

    let dialect = fsattr::probe_dialect(&path)?;
    let entries = acl::expand_grant(dialect, &request.entries)?;

    info!(path = %path.display(), grants = request.entries.len(), "submitting simplified-grant job");
    let change = PermissionChange::SetAcl {
        entries,
        nfs41_flags: Nfs41Flags::default(),
        uid: None,
        gid: None,
        strip: false,
    };
    Ok(jobs::spawn(
        path,
        change,
        ChangeOptions {
            recursive: true,
            traverse: false,
        },
    ))
}

fn inspect_error(path: &Path, source: io::Error) -> CallError {
    CallError::Inspect {
        path: path.to_path_buf(),
        source,
    }
}

fn simplify_entries(entries: &mut AclEntries) {
    let AclEntries::Nfs4(aces) = entries else {
        // POSIX1e triads have no simplified representation.
        return;
    };
    for ace in aces {
        if let NfsPerms::Bits(bits) = ace.perms
            && let Some(level) = bits.basic_level()
        {
            ace.perms = NfsPerms::Basic { basic: level };
        }
        if let NfsFlags::Bits(bits) = ace.flags
            && let Some(level) = bits.basic_level()
        {
            ace.flags = NfsFlags::Basic { basic: level };
        }
    }
}

fn resolve_entry_ids(
    entries: &mut AclEntries,
    owner_uid: u32,
    owner_gid: u32,
    resolver: &dyn IdResolver,
) {
    match entries {
        AclEntries::Nfs4(aces) => {
            for ace in aces {
                ace.who = match ace.tag {
                    Nfs4Tag::Owner => resolver.user_name(owner_uid),
                    Nfs4Tag::Group => resolver.group_name(owner_gid),
                    Nfs4Tag::Everyone => None,
                    Nfs4Tag::User => entry_id(ace.id).and_then(|id| resolver.user_name(id)),
                    Nfs4Tag::NamedGroup => entry_id(ace.id).and_then(|id| resolver.group_name(id)),
                };
            }
        }
        AclEntries::Posix1e(aces) => {
            for ace in aces {
                ace.who = match ace.tag {
                    PosixTag::UserObj => resolver.user_name(owner_uid),
                    PosixTag::GroupObj => resolver.group_name(owner_gid),
                    PosixTag::User => entry_id(Some(ace.id)).and_then(|id| resolver.user_name(id)),
                    PosixTag::Group => entry_id(Some(ace.id)).and_then(|id| resolver.group_name(id)),
                    PosixTag::Other | PosixTag::Mask => None,
                };
            }
        }
    }
}

fn entry_id(id: Option<i32>) -> Option<u32> {
    id.and_then(|id| u32::try_from(id).ok())
}
