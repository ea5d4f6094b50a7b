use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};

use serde_json::json;

use acl::AclDialect;

use crate::error::CallError;
use crate::request::{ChownRequest, GetAclRequest, GrantRequest, SetAclRequest, SetPermRequest};

fn issues_of(error: CallError) -> Vec<String> {
    let CallError::Validation(verrors) = error else {
        panic!("expected a validation failure, got {error}");
    };
    verrors
        .issues()
        .iter()
        .map(|issue| issue.attribute.clone())
        .collect()
}

fn set_perm_request(path: &std::path::Path, mode: &str) -> SetPermRequest {
    serde_json::from_value(json!({
        "path": path.to_str().unwrap(),
        "mode": mode
    }))
    .unwrap()
}

#[test]
fn chown_requires_at_least_one_id() {
    let temp = tempfile::tempdir().unwrap();
    let request: ChownRequest = serde_json::from_value(json!({
        "path": temp.path().to_str().unwrap()
    }))
    .unwrap();

    let attributes = issues_of(crate::chown(request).unwrap_err());
    assert_eq!(attributes, ["filesystem.chown.uid"]);
}

#[tokio::test]
async fn chown_to_the_current_owner_succeeds() {
    let temp = tempfile::tempdir().unwrap();
    let meta = fs::metadata(temp.path()).unwrap();
    let request: ChownRequest = serde_json::from_value(json!({
        "path": temp.path().to_str().unwrap(),
        "uid": meta.uid(),
        "gid": meta.gid()
    }))
    .unwrap();

    crate::chown(request).unwrap().wait().await.unwrap();
}

#[tokio::test]
async fn set_perm_applies_an_octal_mode() {
    let temp = tempfile::tempdir().unwrap();
    let file = temp.path().join("file");
    fs::write(&file, b"x").unwrap();

    let handle = crate::set_perm(set_perm_request(&file, "640")).unwrap();
    handle.wait().await.unwrap();

    let mode = fs::metadata(&file).unwrap().permissions().mode() & 0o7777;
    assert_eq!(mode, 0o640);
}

#[test]
fn set_perm_rejects_empty_and_malformed_modes() {
    let temp = tempfile::tempdir().unwrap();

    let attributes = issues_of(crate::set_perm(set_perm_request(temp.path(), "0")).unwrap_err());
    assert_eq!(attributes, ["filesystem.setperm.mode"]);

    let attributes = issues_of(crate::set_perm(set_perm_request(temp.path(), "79x")).unwrap_err());
    assert_eq!(attributes, ["filesystem.setperm.mode"]);
}

#[test]
fn set_perm_rejects_modes_beyond_the_permission_bits() {
    let temp = tempfile::tempdir().unwrap();

    let attributes =
        issues_of(crate::set_perm(set_perm_request(temp.path(), "177777")).unwrap_err());
    assert_eq!(attributes, ["filesystem.setperm.mode"]);
}

#[test]
fn set_perm_rejects_missing_paths() {
    let temp = tempfile::tempdir().unwrap();
    let missing = temp.path().join("nope");

    let attributes = issues_of(crate::set_perm(set_perm_request(&missing, "755")).unwrap_err());
    assert_eq!(attributes, ["filesystem.setperm.path"]);
}

#[test]
fn set_acl_rejects_stripping_while_setting_entries() {
    let temp = tempfile::tempdir().unwrap();
    let request: SetAclRequest = serde_json::from_value(json!({
        "path": temp.path().to_str().unwrap(),
        "acltype": "NFS4",
        "dacl": [{
            "tag": "owner@", "id": null, "type": "ALLOW",
            "perms": {"BASIC": "FULL_CONTROL"}, "flags": {"BASIC": "NOINHERIT"}
        }],
        "options": {"stripacl": true}
    }))
    .unwrap();

    let attributes = issues_of(crate::set_acl(request).unwrap_err());
    assert!(attributes.contains(&"filesystem_acl.dacl".to_string()));
}

#[test]
fn set_acl_reports_entry_errors_by_schema_path() {
    let temp = tempfile::tempdir().unwrap();
    let request: SetAclRequest = serde_json::from_value(json!({
        "path": temp.path().to_str().unwrap(),
        "acltype": "NFS4",
        "dacl": [{
            "tag": "owner@", "id": 5, "type": "ALLOW",
            "perms": {"BASIC": "FULL_CONTROL"}, "flags": {"BASIC": "NOINHERIT"}
        }]
    }))
    .unwrap();

    let attributes = issues_of(crate::set_acl(request).unwrap_err());
    assert!(attributes.contains(&"filesystem_acl.dacl.0.id".to_string()));
}

#[test]
fn set_acl_rejects_the_disabled_dialect() {
    let temp = tempfile::tempdir().unwrap();
    let request: SetAclRequest = serde_json::from_value(json!({
        "path": temp.path().to_str().unwrap(),
        "acltype": "DISABLED"
    }))
    .unwrap();

    let attributes = issues_of(crate::set_acl(request).unwrap_err());
    assert!(attributes.contains(&"filesystem_acl.acltype".to_string()));
}

#[test]
fn add_to_acl_refuses_a_populated_directory_without_force() {
    let temp = tempfile::tempdir().unwrap();
    fs::write(temp.path().join("existing"), b"x").unwrap();

    let request: GrantRequest = serde_json::from_value(json!({
        "path": temp.path().to_str().unwrap(),
        "entries": [{"id_type": "USER", "id": 1001, "access": "READ"}]
    }))
    .unwrap();

    let error = crate::add_to_acl(request).unwrap_err();
    assert!(matches!(error, CallError::DataPresent { .. }));
}

#[test]
fn add_to_acl_requires_entries() {
    let temp = tempfile::tempdir().unwrap();
    let request: GrantRequest = serde_json::from_value(json!({
        "path": temp.path().to_str().unwrap(),
        "entries": []
    }))
    .unwrap();

    let attributes = issues_of(crate::add_to_acl(request).unwrap_err());
    assert_eq!(attributes, ["filesystem.add_to_acl.entries"]);
}

#[test]
fn get_acl_reports_ownership_and_triviality() {
    let temp = tempfile::tempdir().unwrap();
    let request: GetAclRequest = serde_json::from_value(json!({
        "path": temp.path().to_str().unwrap()
    }))
    .unwrap();

    let info = crate::get_acl(&request, None).unwrap();
    let meta = fs::metadata(temp.path()).unwrap();
    assert_eq!(info.uid, meta.uid());
    assert_eq!(info.gid, meta.gid());
    assert!(info.trivial);
    // Plain test filesystems never report the NFSv4 dialect.
    assert_ne!(info.acltype, AclDialect::Nfs4);
    assert!(info.nfs41_flags.is_none());
}

#[test]
fn get_acl_rejects_missing_paths() {
    let temp = tempfile::tempdir().unwrap();
    let request: GetAclRequest = serde_json::from_value(json!({
        "path": temp.path().join("nope").to_str().unwrap()
    }))
    .unwrap();

    let attributes = issues_of(crate::get_acl(&request, None).unwrap_err());
    assert_eq!(attributes, ["filesystem.getacl.path"]);
}
