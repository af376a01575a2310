//! Per-run bug lookup with lazy login and one fetch per bug id.
use log::*;
use secrecy::SecretString;
use std::collections::HashMap;

use crate::{
    bugzilla::{traits::BugTracker, types::BugRecord},
    error::{BumpverError, Result},
};

/// Caches bug records for the duration of one run.
///
/// The underlying tracker is logged into before the first fetch. A failed
/// fetch is logged and cached as a missing bug, so no id is ever queried
/// twice.
pub struct BugCache {
    tracker: Box<dyn BugTracker>,
    username: Option<String>,
    password: Option<SecretString>,
    logged_in: bool,
    bugs: HashMap<String, Option<BugRecord>>,
}

impl BugCache {
    pub fn new(
        tracker: Box<dyn BugTracker>,
        username: Option<String>,
        password: Option<SecretString>,
    ) -> Self {
        Self {
            tracker,
            username,
            password,
            logged_in: false,
            bugs: HashMap::new(),
        }
    }

    async fn ensure_login(&mut self) -> Result<()> {
        if self.logged_in {
            return Ok(());
        }

        let (Some(username), Some(password)) = (&self.username, &self.password)
        else {
            return Err(BumpverError::AuthenticationError(
                "RHBZ_USER and RHBZ_PASSWORD must be set to validate bugs".into(),
            ));
        };

        info!("logging in to bug tracker as {username}");
        self.tracker.login(username, password).await?;
        self.logged_in = true;

        Ok(())
    }

    /// Look up bug `id`, querying the tracker only on first reference.
    pub async fn lookup(&mut self, id: &str) -> Result<Option<BugRecord>> {
        if let Some(bug) = self.bugs.get(id) {
            return Ok(bug.clone());
        }

        self.ensure_login().await?;

        let bug = match self.tracker.get_bug(id).await {
            Ok(bug) => bug,
            Err(err) => {
                warn!("bug tracker query for {id} failed: {err}");
                None
            }
        };

        self.bugs.insert(id.to_string(), bug.clone());

        Ok(bug)
    }
}
