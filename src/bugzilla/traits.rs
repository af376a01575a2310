//! Traits related to bug trackers
use async_trait::async_trait;
use secrecy::SecretString;

use crate::{bugzilla::types::BugRecord, error::Result};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BugTracker: Send + Sync {
    /// Authenticate subsequent calls.
    async fn login(&self, username: &str, password: &SecretString) -> Result<()>;
    /// Fetch a bug with its flags. `None` when the bug does not exist or is
    /// not accessible.
    async fn get_bug(&self, id: &str) -> Result<Option<BugRecord>>;
}
