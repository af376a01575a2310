//! Advisory build status check against Jenkins.
//!
//! The result is only ever logged. An unreachable server or a missing job
//! never stops a bump.
use log::*;
use reqwest::{Client, Proxy};
use serde::Deserialize;
use std::fmt;

use crate::error::Result;

#[derive(Debug, Deserialize)]
struct JobList {
    #[serde(default)]
    jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
struct Job {
    name: String,
    #[serde(default)]
    color: String,
}

/// Build state decoded from a Jenkins ball color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Passing,
    Failing,
    Unstable,
    Building,
    Other(String),
}

impl BuildStatus {
    pub fn from_color(color: &str) -> Self {
        if color.ends_with("_anime") {
            return Self::Building;
        }

        match color {
            "blue" => Self::Passing,
            "red" => Self::Failing,
            "yellow" => Self::Unstable,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passing => write!(f, "passing"),
            Self::Failing => write!(f, "failing"),
            Self::Unstable => write!(f, "unstable"),
            Self::Building => write!(f, "building"),
            Self::Other(color) => write!(f, "unknown ({color})"),
        }
    }
}

/// Job that builds `name` on `branch`.
pub fn job_name(name: &str, branch: &str) -> String {
    let branch = branch.strip_suffix("-branch").unwrap_or(branch);
    format!("{name}-{branch}")
}

/// Jenkins API client.
pub struct Jenkins {
    client: Client,
    base_url: String,
}

impl Jenkins {
    pub fn new(base_url: &str, proxy: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder();

        if let Some(proxy) = proxy {
            builder = builder.proxy(Proxy::all(proxy)?);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Status of `job`, or `None` when the server does not know it.
    pub async fn job_status(&self, job: &str) -> Result<Option<BuildStatus>> {
        let url = format!("{}/api/json", self.base_url);
        debug!("jenkins: fetching {url}");

        let request = self.client.get(&url).build()?;
        let response = self.client.execute(request).await?;
        let result = response.error_for_status()?;
        let list: JobList = serde_json::from_str(&result.text().await?)?;

        Ok(list
            .jobs
            .into_iter()
            .find(|j| j.name == job)
            .map(|j| BuildStatus::from_color(&j.color)))
    }

    /// Log the status of the job for `name` on `branch`.
    pub async fn check(&self, name: &str, branch: &str) {
        let job = job_name(name, branch);

        match self.job_status(&job).await {
            Ok(Some(BuildStatus::Passing)) => info!("jenkins job {job} is passing"),
            Ok(Some(status)) => warn!("jenkins job {job} is {status}"),
            Ok(None) => warn!("jenkins job {job} not found"),
            Err(err) => warn!("unable to check jenkins job {job}: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    use super::*;

    async fn server_with_jobs() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jobs": [
                    { "name": "anaconda-master", "color": "blue" },
                    { "name": "anaconda-rhel-8", "color": "red_anime" },
                    { "name": "anaconda-f38", "color": "yellow" },
                ]
            })))
            .mount(&server)
            .await;

        server
    }

    #[test]
    fn job_name_strips_branch_suffix() {
        assert_eq!(job_name("anaconda", "master"), "anaconda-master");
        assert_eq!(job_name("anaconda", "f38-branch"), "anaconda-f38");
        assert_eq!(job_name("anaconda", "rhel-8"), "anaconda-rhel-8");
    }

    #[test]
    fn decodes_colors() {
        assert_eq!(BuildStatus::from_color("blue"), BuildStatus::Passing);
        assert_eq!(BuildStatus::from_color("red"), BuildStatus::Failing);
        assert_eq!(BuildStatus::from_color("yellow"), BuildStatus::Unstable);
        assert_eq!(BuildStatus::from_color("blue_anime"), BuildStatus::Building);
        assert_eq!(
            BuildStatus::from_color("notbuilt"),
            BuildStatus::Other("notbuilt".into())
        );
    }

    #[tokio::test]
    async fn finds_job_status() {
        let server = server_with_jobs().await;
        let jenkins = Jenkins::new(&format!("{}/", server.uri()), None).unwrap();

        assert_eq!(
            jenkins.job_status("anaconda-master").await.unwrap(),
            Some(BuildStatus::Passing)
        );
        assert_eq!(
            jenkins.job_status("anaconda-rhel-8").await.unwrap(),
            Some(BuildStatus::Building)
        );
        assert_eq!(jenkins.job_status("anaconda-f99").await.unwrap(), None);
    }

    #[tokio::test]
    async fn undecodable_listing_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html/>"))
            .mount(&server)
            .await;

        let jenkins = Jenkins::new(&server.uri(), None).unwrap();
        assert!(matches!(
            jenkins.job_status("anaconda-master").await.unwrap_err(),
            crate::error::BumpverError::JsonParseError(_)
        ));
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let jenkins = Jenkins::new(&server.uri(), None).unwrap();
        assert!(jenkins.job_status("anaconda-master").await.is_err());
    }

    #[test_log::test(tokio::test)]
    async fn check_never_fails() {
        // nothing listens here
        let jenkins = Jenkins::new("http://127.0.0.1:9", None).unwrap();
        jenkins.check("anaconda", "master").await;

        let server = server_with_jobs().await;
        let jenkins = Jenkins::new(&server.uri(), None).unwrap();
        jenkins.check("anaconda", "f38-branch").await;
    }

    #[test]
    fn accepts_proxy() {
        assert!(Jenkins::new("https://jenkins.example.com", Some("http://proxy:3128")).is_ok());
    }
}
