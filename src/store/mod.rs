//! Persistence gateway for issues, users and worklogs.
//!
//! Every write runs in its own short transaction and reports failures as
//! [`PersistenceError`]; callers decide whether a failure stops the run.

pub mod database;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::entity::{WorkDuration, issue, user, worklog};
use crate::model::global_error::PersistenceError;

pub use database::SeaOrmStore;

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_issue_by_key(&self, key: &str) -> Result<Option<issue::Model>, PersistenceError>;

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<user::Model>, PersistenceError>;

    async fn find_worklog_by_id(&self, id: i64) -> Result<Option<worklog::Model>, PersistenceError>;

    async fn list_worklogs_for_issue(
        &self,
        issue_id: i64,
    ) -> Result<Vec<worklog::Model>, PersistenceError>;

    async fn list_worklog_ids_for_issue(
        &self,
        issue_id: i64,
    ) -> Result<Vec<i64>, PersistenceError> {
        Ok(self
            .list_worklogs_for_issue(issue_id)
            .await?
            .into_iter()
            .map(|row| row.id)
            .collect())
    }

    async fn insert_issue(&self, issue: &issue::Model) -> Result<(), PersistenceError>;

    async fn update_issue_parent(
        &self,
        issue_id: i64,
        parent_issue_id: Option<i64>,
    ) -> Result<(), PersistenceError>;

    /// All rows in one statement; either every row lands or none does.
    async fn insert_worklogs_batch(&self, rows: &[worklog::Model]) -> Result<u64, PersistenceError>;

    async fn insert_worklog(&self, row: &worklog::Model) -> Result<(), PersistenceError>;

    async fn update_worklog(
        &self,
        id: i64,
        date_created: NaiveDate,
        hour: WorkDuration,
    ) -> Result<(), PersistenceError>;
}

#[async_trait]
impl<T: Store + ?Sized> Store for &T {
    async fn find_issue_by_key(&self, key: &str) -> Result<Option<issue::Model>, PersistenceError> {
        (**self).find_issue_by_key(key).await
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<user::Model>, PersistenceError> {
        (**self).find_user_by_email(email).await
    }

    async fn find_worklog_by_id(
        &self,
        id: i64,
    ) -> Result<Option<worklog::Model>, PersistenceError> {
        (**self).find_worklog_by_id(id).await
    }

    async fn list_worklogs_for_issue(
        &self,
        issue_id: i64,
    ) -> Result<Vec<worklog::Model>, PersistenceError> {
        (**self).list_worklogs_for_issue(issue_id).await
    }

    async fn list_worklog_ids_for_issue(
        &self,
        issue_id: i64,
    ) -> Result<Vec<i64>, PersistenceError> {
        (**self).list_worklog_ids_for_issue(issue_id).await
    }

    async fn insert_issue(&self, issue: &issue::Model) -> Result<(), PersistenceError> {
        (**self).insert_issue(issue).await
    }

    async fn update_issue_parent(
        &self,
        issue_id: i64,
        parent_issue_id: Option<i64>,
    ) -> Result<(), PersistenceError> {
        (**self).update_issue_parent(issue_id, parent_issue_id).await
    }

    async fn insert_worklogs_batch(
        &self,
        rows: &[worklog::Model],
    ) -> Result<u64, PersistenceError> {
        (**self).insert_worklogs_batch(rows).await
    }

    async fn insert_worklog(&self, row: &worklog::Model) -> Result<(), PersistenceError> {
        (**self).insert_worklog(row).await
    }

    async fn update_worklog(
        &self,
        id: i64,
        date_created: NaiveDate,
        hour: WorkDuration,
    ) -> Result<(), PersistenceError> {
        (**self).update_worklog(id, date_created, hour).await
    }
}
