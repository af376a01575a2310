//! Release-readiness checks applied to tracker bugs.
use log::*;
use regex::Regex;
use std::{fmt, sync::LazyLock};

use crate::bugzilla::types::BugRecord;

/// Product prefix of bugs that may be fixed on a stabilization branch.
pub const RHEL_PRODUCT_PREFIX: &str = "Red Hat Enterprise Linux";
/// Statuses of bugs ready to ship.
pub const RELEASE_STATUSES: [&str; 2] = ["MODIFIED", "ON_QA"];

static ACK_FLAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^rhel-\d+\.\d+\.\d+").unwrap());

/// Why a bug reference failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    QueryFailed { bug: String },
    NotRhel { bug: String, product: String },
    WrongStatus { bug: String, status: String },
    WrongFixedIn {
        bug: String,
        found: String,
        expected: String,
    },
    MissingAck { bug: String },
    NoBugsReferenced,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueryFailed { bug } => {
                write!(f, "Bugzilla query for {bug} failed")
            }
            Self::NotRhel { bug, product } => {
                write!(f, "Bug {bug} is not a RHEL bug (product: {product})")
            }
            Self::WrongStatus { bug, status } => write!(
                f,
                "Bug {bug} is not in MODIFIED or ON_QA (status: {status})"
            ),
            Self::WrongFixedIn {
                bug,
                found,
                expected,
            } => write!(
                f,
                "Bug {bug} does not have correct Fixed In Version (found: {found:?}, expected: {expected:?})"
            ),
            Self::MissingAck { bug } => write!(f, "Bug {bug} does not have ACK"),
            Self::NoBugsReferenced => write!(f, "No bugs referenced"),
        }
    }
}

/// A finding tied to the commit it was raised for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub commit: String,
    pub summary: String,
    pub finding: Finding,
}

impl Diagnostic {
    pub fn log(&self) {
        error!("*** {}", self.finding);
        error!("***     Commit: {}", self.commit);
        error!("***     {}", self.summary);
    }
}

/// The bug must exist and belong to a RHEL product.
pub fn check_product<'a>(
    id: &str,
    bug: Option<&'a BugRecord>,
) -> Result<&'a BugRecord, Finding> {
    let bug = bug.ok_or_else(|| Finding::QueryFailed { bug: id.into() })?;

    if !bug.product.starts_with(RHEL_PRODUCT_PREFIX) {
        return Err(Finding::NotRhel {
            bug: id.into(),
            product: bug.product.clone(),
        });
    }

    Ok(bug)
}

/// At least one `rhel-X.Y.Z` flag must be granted.
pub fn check_ack(id: &str, bug: &BugRecord, skip_acks: bool) -> Option<Finding> {
    if skip_acks {
        return None;
    }

    let acked = bug
        .flags
        .iter()
        .any(|flag| flag.status == "+" && ACK_FLAG_REGEX.is_match(&flag.name));

    if acked {
        None
    } else {
        Some(Finding::MissingAck { bug: id.into() })
    }
}

/// Status, fixed-in-version and ack checks for a bug the commit resolves.
pub fn check_release(
    id: &str,
    bug: &BugRecord,
    fixed_in: &str,
    skip_acks: bool,
) -> Vec<Finding> {
    let mut findings = vec![];

    if !RELEASE_STATUSES.contains(&bug.status.as_str()) {
        findings.push(Finding::WrongStatus {
            bug: id.into(),
            status: bug.status.clone(),
        });
    }

    if bug.fixed_in != fixed_in {
        findings.push(Finding::WrongFixedIn {
            bug: id.into(),
            found: bug.fixed_in.clone(),
            expected: fixed_in.into(),
        });
    }

    if let Some(finding) = check_ack(id, bug, skip_acks) {
        findings.push(finding);
    }

    findings
}
