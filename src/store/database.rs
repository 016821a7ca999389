use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    TransactionTrait,
};
use tracing::{debug, instrument};

use super::Store;
use crate::entity::WorkDuration;
use crate::entity::issue::{self, Entity as IssueEntity};
use crate::entity::user::{self, Entity as UserEntity};
use crate::entity::worklog::{self, Entity as WorklogEntity};
use crate::model::global_error::PersistenceError;

/// [`Store`] backed by a sea-orm connection pool.
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Worklog rows with `hour` read back as interval text under its own name.
pub fn select_worklogs() -> Select<WorklogEntity> {
    WorklogEntity::find()
        .select_only()
        .columns([
            worklog::Column::Id,
            worklog::Column::IssueId,
            worklog::Column::UserId,
            worklog::Column::DateCreated,
        ])
        .column_as(Expr::col((WorklogEntity, worklog::Column::Hour)).cast_as("text"), "hour")
}

#[async_trait]
impl Store for SeaOrmStore {
    async fn find_issue_by_key(
        &self,
        key: &str,
    ) -> Result<Option<issue::Model>, PersistenceError> {
        let issue = IssueEntity::find()
            .filter(issue::Column::Key.eq(key))
            .one(&self.db)
            .await?;
        Ok(issue)
    }

    async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<user::Model>, PersistenceError> {
        let user = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(user)
    }

    async fn find_worklog_by_id(
        &self,
        id: i64,
    ) -> Result<Option<worklog::Model>, PersistenceError> {
        let row = select_worklogs()
            .filter(worklog::Column::Id.eq(id))
            .one(&self.db)
            .await?;
        Ok(row)
    }

    async fn list_worklogs_for_issue(
        &self,
        issue_id: i64,
    ) -> Result<Vec<worklog::Model>, PersistenceError> {
        let rows = select_worklogs()
            .filter(worklog::Column::IssueId.eq(issue_id))
            .order_by_asc(worklog::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self, issue), fields(issue_id = issue.id, issue_key = %issue.key))]
    async fn insert_issue(&self, issue: &issue::Model) -> Result<(), PersistenceError> {
        let txn = self.db.begin().await?;
        IssueEntity::insert(issue::ActiveModel::for_insert(issue))
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;
        debug!("issue inserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_issue_parent(
        &self,
        issue_id: i64,
        parent_issue_id: Option<i64>,
    ) -> Result<(), PersistenceError> {
        let txn = self.db.begin().await?;
        let result = IssueEntity::update_many()
            .col_expr(issue::Column::ParentIssueId, Expr::value(parent_issue_id))
            .filter(issue::Column::Id.eq(issue_id))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        debug!(rows = result.rows_affected, "issue parent updated");
        Ok(())
    }

    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn insert_worklogs_batch(
        &self,
        rows: &[worklog::Model],
    ) -> Result<u64, PersistenceError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let txn = self.db.begin().await?;
        let inserted = WorklogEntity::insert_many(rows.iter().map(worklog::ActiveModel::for_insert))
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;
        Ok(inserted)
    }

    #[instrument(skip(self, row), fields(worklog_id = row.id))]
    async fn insert_worklog(&self, row: &worklog::Model) -> Result<(), PersistenceError> {
        let txn = self.db.begin().await?;
        WorklogEntity::insert(worklog::ActiveModel::for_insert(row))
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_worklog(
        &self,
        id: i64,
        date_created: NaiveDate,
        hour: WorkDuration,
    ) -> Result<(), PersistenceError> {
        let txn = self.db.begin().await?;
        WorklogEntity::update_many()
            .col_expr(worklog::Column::Hour, worklog::Column::Hour.save_as(Expr::val(hour)))
            .col_expr(worklog::Column::DateCreated, Expr::value(date_created))
            .filter(worklog::Column::Id.eq(id))
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }
}
