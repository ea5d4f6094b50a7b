use std::collections::BTreeSet;

use serde_json::Value;

use crate::dialect::AclDialect;
use crate::entry::RawAce;

/// Maximum identity value accepted in an ACL entry.
const MAX_ACL_ID: i64 = 2_147_483_647;

/// One problem found while validating a proposed ACL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclValidationError {
    /// Index of the offending entry, or `None` for whole-ACL problems.
    pub index: Option<usize>,
    /// Human-readable description.
    pub message: String,
    /// The offending field within the entry, when one can be named.
    pub field: Option<&'static str>,
}

/// The complete report produced by [`validate`].
///
/// A malformed ACL is a normal, fully-reported outcome: every entry is
/// checked and every problem recorded, in entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AclValidation {
    errors: Vec<AclValidationError>,
}

impl AclValidation {
    /// True iff no errors were recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The ordered error list.
    #[must_use]
    pub fn errors(&self) -> &[AclValidationError] {
        &self.errors
    }

    /// Consumes the report and returns the error list.
    #[must_use]
    pub fn into_errors(self) -> Vec<AclValidationError> {
        self.errors
    }

    fn push(&mut self, index: Option<usize>, message: String, field: Option<&'static str>) {
        self.errors.push(AclValidationError {
            index,
            message,
            field,
        });
    }
}

/// Validates a whole proposed ACL against the dialect schema and the
/// dialect's semantic rules.
///
/// `has_extension_flags` marks the presence of a non-default NFSv4.1
/// per-ACL flag block, which is only meaningful for the NFS4 dialect.
///
/// The algorithm, per entry in input order:
///
/// 1. The entry's key set must equal the dialect's required key set
///    exactly. Extra and missing keys each record one error, and either
///    suppresses the semantic checks for that entry.
/// 2. A special-tag NFSv4 entry may not carry a DENY type.
/// 3. A special-tag entry's `id` must be null or negative; a non-special
///    entry's `id` must be present, non-negative, and within range.
#[must_use]
pub fn validate(
    dialect: AclDialect,
    entries: &[RawAce],
    has_extension_flags: bool,
) -> AclValidation {
    let mut report = AclValidation::default();

    if dialect != AclDialect::Nfs4 && has_extension_flags {
        report.push(
            None,
            format!("NFS41 ACL flags are not valid for ACL type [{dialect}]"),
            None,
        );
    }

    let required: BTreeSet<&str> = dialect.required_keys().iter().copied().collect();

    for (idx, entry) in entries.iter().enumerate() {
        let keys: BTreeSet<&str> = entry.keys().map(String::as_str).collect();
        let extra: Vec<&str> = keys.difference(&required).copied().collect();
        let missing: Vec<&str> = required.difference(&keys).copied().collect();

        if !extra.is_empty() {
            report.push(
                Some(idx),
                format!(
                    "ACL entry contains invalid extra key(s): {}",
                    extra.join(", ")
                ),
                None,
            );
        }
        if !missing.is_empty() {
            report.push(
                Some(idx),
                format!(
                    "ACL entry is missing required key(s): {}",
                    missing.join(", ")
                ),
                None,
            );
        }

        // Keys must be exactly right before semantic fields can be trusted.
        if !extra.is_empty() || !missing.is_empty() {
            continue;
        }

        validate_entry(dialect, idx, entry, &mut report);
    }

    report
}

fn validate_entry(dialect: AclDialect, idx: usize, entry: &RawAce, report: &mut AclValidation) {
    let tag = entry.get("tag").and_then(Value::as_str).unwrap_or_default();
    let is_special = dialect.is_special(tag);

    if dialect == AclDialect::Nfs4
        && is_special
        && entry.get("type").and_then(Value::as_str) == Some("DENY")
    {
        report.push(
            Some(idx),
            format!("{tag}: DENY entries for this principal are not permitted."),
            Some("tag"),
        );
    }

    if !id_is_valid(entry.get("id"), is_special) {
        report.push(
            Some(idx),
            "ACL entry has invalid id for tag type.".to_string(),
            Some("id"),
        );
    }
}

fn id_is_valid(id: Option<&Value>, is_special: bool) -> bool {
    let id = match id {
        None | Some(Value::Null) => None,
        Some(value) => match value.as_i64() {
            Some(number) => Some(number),
            // Non-numeric ids never validate.
            None => return false,
        },
    };

    match id {
        None => is_special,
        Some(number) if number < 0 => is_special,
        Some(number) => !is_special && number <= MAX_ACL_ID,
    }
}
