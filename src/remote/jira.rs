use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::IssueSource;
use crate::model::global_error::RemoteError;
use crate::model::jira::{IssuePayload, WorklogListing, WorklogPayload};

const API_PREFIX: &str = "/rest/api/3";

#[derive(Clone)]
pub struct JiraConfig {
    pub base_url: String,
    pub email: String,
    pub token: String,
    pub timeout: Duration,
}

impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("token", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Basic-auth client for the Jira Cloud REST API (account email + API token).
pub struct JiraClient {
    http: Client,
    base_url: String,
    email: String,
    token: String,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::Unavailable(format!("http client setup failed: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            email: config.email,
            token: config.token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<T, RemoteError> {
        let url = self.url(path);
        debug!(%url, "GET");

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.email, Some(&self.token))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| RemoteError::Unavailable(format!("GET {url}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(key.to_string()));
        }
        if !status.is_success() {
            return Err(RemoteError::Unavailable(format!("GET {url} returned {status}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Unavailable(format!("reading body of {url}: {e}")))?;

        serde_json::from_slice(&body).map_err(|e| RemoteError::Malformed(format!("{key}: {e}")))
    }
}

#[async_trait]
impl IssueSource for JiraClient {
    #[instrument(skip(self))]
    async fn fetch_issue(&self, key: &str) -> Result<IssuePayload, RemoteError> {
        self.get_json(&format!("/issue/{key}"), key).await
    }

    #[instrument(skip(self))]
    async fn fetch_worklogs(&self, key: &str) -> Result<Vec<WorklogPayload>, RemoteError> {
        let listing: WorklogListing = self.get_json(&format!("/issue/{key}/worklog"), key).await?;
        let worklogs = listing.worklogs.unwrap_or_default();
        debug!(count = worklogs.len(), "worklogs from response");
        Ok(worklogs)
    }
}
