//! Implements the BugTracker trait for Bugzilla's XML-RPC API
use async_trait::async_trait;
use log::*;
use reqwest::{Client, Url, header::CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;

use crate::{
    bugzilla::{traits::BugTracker, types::BugRecord, xmlrpc, xmlrpc::Value},
    error::{BumpverError, Result},
};

/// Fault code for a bug id that does not exist.
const FAULT_INVALID_BUG_ID: i64 = 101;
/// Fault code for a bug the user may not see.
const FAULT_BUG_ACCESS_DENIED: i64 = 102;

/// Bugzilla client speaking XML-RPC over reqwest.
pub struct Bugzilla {
    client: Client,
    url: Url,
    token: Mutex<Option<String>>,
}

impl Bugzilla {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| BumpverError::invalid_args(format!("invalid bugzilla url {url}: {e}")))?;

        let client = Client::builder().build()?;

        Ok(Self {
            client,
            url,
            token: Mutex::new(None),
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        debug!("bugzilla: calling {method}");

        let body = xmlrpc::encode_call(method, &[params])?;

        let request = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .build()?;

        let response = self.client.execute(request).await?;
        let result = response.error_for_status()?;
        let text = result.text().await?;

        xmlrpc::decode_response(&text)
    }
}

#[async_trait]
impl BugTracker for Bugzilla {
    async fn login(&self, username: &str, password: &SecretString) -> Result<()> {
        let params = Value::structure([
            ("login", Value::from(username)),
            ("password", Value::from(password.expose_secret())),
        ]);

        let result = match self.call("User.login", params).await {
            Ok(result) => result,
            Err(BumpverError::Fault { message, .. }) => {
                return Err(BumpverError::AuthenticationError(message));
            }
            Err(err) => return Err(err),
        };

        match result.get("token").and_then(Value::as_str) {
            Some(token) => *self.token.lock().await = Some(token.to_string()),
            None => warn!("bugzilla login returned no token"),
        }

        Ok(())
    }

    async fn get_bug(&self, id: &str) -> Result<Option<BugRecord>> {
        let bug_id = match id.parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::from(id),
        };

        let mut params = vec![
            ("ids", Value::Array(vec![bug_id])),
            (
                "include_fields",
                Value::Array(vec![Value::from("_default"), Value::from("flags")]),
            ),
        ];

        if let Some(token) = self.token.lock().await.as_deref() {
            params.push(("Bugzilla_token", Value::from(token)));
        }

        let result = match self.call("Bug.get", Value::structure(params)).await {
            Ok(result) => result,
            Err(BumpverError::Fault { code, message })
                if code == FAULT_INVALID_BUG_ID || code == FAULT_BUG_ACCESS_DENIED =>
            {
                debug!("bugzilla: bug {id} unavailable: {message}");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let bug = result
            .get("bugs")
            .and_then(Value::as_array)
            .and_then(|bugs| bugs.first())
            .map(BugRecord::from_value)
            .transpose()?;

        Ok(bug)
    }
}
