//! Credentials and fixed settings for a bump run.
//!
//! Credentials live in a `KEY=value` file in the user's home directory
//! (`~/.rhbzauth`). A missing file is not an error: runs that never talk to
//! the bug tracker or build server don't need it.
use log::*;
use secrecy::SecretString;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::error::Result;

/// Credentials filename in the user's home directory.
pub const CREDENTIALS_FILE: &str = ".rhbzauth";
/// Default Bugzilla XML-RPC endpoint.
pub const DEFAULT_BUGZILLA_URL: &str = "https://bugzilla.redhat.com/xmlrpc.cgi";
/// Default build configuration file.
pub const DEFAULT_CONFIGURE_FILE: &str = "configure.ac";
/// Default translation platform config file.
pub const DEFAULT_ZANATA_FILE: &str = "zanata.xml";
/// Branches starting with this prefix are stabilization branches.
pub const STABILIZATION_BRANCH_PREFIX: &str = "rhel";

/// Values loaded from the credentials file.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    /// Bugzilla login (`RHBZ_USER`).
    pub username: Option<String>,
    /// Bugzilla password (`RHBZ_PASSWORD`).
    pub password: Option<SecretString>,
    /// Bugzilla XML-RPC endpoint override (`RHBZ_URL`).
    pub bugzilla_url: Option<String>,
    /// Jenkins base URL (`JENKINS`).
    pub jenkins_url: Option<String>,
    /// Proxy used to reach Jenkins (`JENKINS_PROXY`).
    pub jenkins_proxy: Option<String>,
}

impl Credentials {
    /// Load `~/.rhbzauth`, or empty credentials when `HOME` is unset or the
    /// file does not exist.
    pub fn load_default() -> Result<Self> {
        match env::var_os("HOME") {
            Some(home) => Self::load(&PathBuf::from(home).join(CREDENTIALS_FILE)),
            None => {
                warn!("HOME is not set: running without credentials");
                Ok(Self::default())
            }
        }
    }

    /// Load credentials from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let mut credentials = Self::default();

        if !path.exists() {
            debug!("credentials file not found: {}", path.display());
            return Ok(credentials);
        }

        let content = fs::read_to_string(path)?;

        // values are literal: no quoting, escapes or $VAR expansion
        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                debug!("ignoring malformed credentials line");
                continue;
            };

            let key = key.trim();
            let value = value.trim().to_string();

            if value.is_empty() {
                continue;
            }

            match key {
                "RHBZ_USER" => credentials.username = Some(value),
                "RHBZ_PASSWORD" => {
                    credentials.password = Some(SecretString::from(value))
                }
                "RHBZ_URL" => credentials.bugzilla_url = Some(value),
                "JENKINS" => credentials.jenkins_url = Some(value),
                "JENKINS_PROXY" => credentials.jenkins_proxy = Some(value),
                other => debug!("ignoring unknown credentials key: {other}"),
            }
        }

        Ok(credentials)
    }

    /// Bugzilla endpoint to use for this run.
    pub fn bugzilla_url(&self) -> &str {
        self.bugzilla_url.as_deref().unwrap_or(DEFAULT_BUGZILLA_URL)
    }
}
