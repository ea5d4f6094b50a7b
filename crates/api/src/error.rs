use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use acl::{EntryParseError, GrantError};
use fsattr::FsAttrError;
use jobs::JobError;

/// One precondition failure, keyed by the dotted schema path of the
/// offending request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Dotted schema path, e.g. `filesystem_acl.dacl.2.id`.
    pub attribute: String,
    /// Human-readable description of the problem.
    pub message: String,
}

/// Accumulated precondition failures for one request.
///
/// Requests are checked completely before any job is created, so a caller
/// sees every problem at once instead of fixing them one at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    /// Records one failure against a schema attribute.
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            attribute: attribute.into(),
            message: message.into(),
        });
    }

    /// The recorded failures, in the order they were found.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// True iff nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Fails with [`CallError::Validation`] if any issue was recorded.
    pub fn check(self) -> Result<(), CallError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CallError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, issue) in self.issues.iter().enumerate() {
            if position > 0 {
                f.write_str("; ")?;
            }
            write!(f, "[{}] {}", issue.attribute, issue.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Error returned by an operation before or instead of a job result.
#[derive(Debug, Error)]
pub enum CallError {
    /// One or more request preconditions failed.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// The target directory holds data and `force` was not given.
    #[error("{}: path contains existing data and parameter 'force' was not specified", path.display())]
    DataPresent {
        /// The refused directory.
        path: PathBuf,
    },

    /// Inspecting the target path failed.
    #[error("failed to inspect '{}': {source}", path.display())]
    Inspect {
        /// The path being inspected.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A validated entry failed to parse into its typed form.
    #[error(transparent)]
    Entry(#[from] EntryParseError),

    /// A grant cannot be expressed in the path's ACL dialect.
    #[error(transparent)]
    Grant(#[from] GrantError),

    /// Reading or probing protection metadata failed.
    #[error(transparent)]
    Attr(#[from] FsAttrError),

    /// The submitted job failed.
    #[error(transparent)]
    Job(#[from] JobError),
}
