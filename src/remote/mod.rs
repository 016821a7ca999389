pub mod jira;

use async_trait::async_trait;

use crate::model::global_error::RemoteError;
use crate::model::jira::{IssuePayload, WorklogPayload};

pub use jira::{JiraClient, JiraConfig};

/// Read side of the remote tracker.
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn fetch_issue(&self, key: &str) -> Result<IssuePayload, RemoteError>;

    /// Empty when nothing was logged against the issue.
    async fn fetch_worklogs(&self, key: &str) -> Result<Vec<WorklogPayload>, RemoteError>;
}

#[async_trait]
impl<T: IssueSource + ?Sized> IssueSource for &T {
    async fn fetch_issue(&self, key: &str) -> Result<IssuePayload, RemoteError> {
        (**self).fetch_issue(key).await
    }

    async fn fetch_worklogs(&self, key: &str) -> Result<Vec<WorklogPayload>, RemoteError> {
        (**self).fetch_worklogs(key).await
    }
}
