//! Version and release identifiers for a bump.
use crate::error::{BumpverError, Result};

/// Increment the last dot-separated numeric component of `version`.
pub fn increment(version: &str) -> Result<String> {
    let mut segments: Vec<&str> = version.split('.').collect();

    let last = segments.pop().unwrap_or_default();

    let next = last
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_add(1))
        .ok_or_else(|| BumpverError::InvalidVersion(version.to_string()))?;

    let next = next.to_string();
    segments.push(&next);

    Ok(segments.join("."))
}

/// Current and next version/release of the package being bumped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTuple {
    pub name: String,
    pub version: String,
    pub release: String,
    pub next_version: String,
    pub next_release: String,
}

impl VersionTuple {
    /// Compute the next version, keeping the current release unless
    /// `new_release` overrides it.
    pub fn new(
        name: &str,
        version: &str,
        release: &str,
        new_release: Option<&str>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            release: release.to_string(),
            next_version: increment(version)?,
            next_release: new_release.unwrap_or(release).to_string(),
        })
    }

    /// Tag of the previous release, the start of the commit range.
    pub fn previous_tag(&self) -> String {
        format!("{}-{}-{}", self.name, self.version, self.release)
    }

    /// Fixed-in-version string bugs must carry to ship in this release.
    pub fn fixed_in(&self) -> String {
        format!("{}-{}-{}", self.name, self.next_version, self.next_release)
    }
}
