#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, EntityTrait, Set};
use serde_json::{Value, json};

use jira_worklog_sync::db::create_schema;
use jira_worklog_sync::entity::{UserRole, issue, project, user, worklog};
use jira_worklog_sync::model::global_error::RemoteError;
use jira_worklog_sync::model::jira::{IssuePayload, WorklogListing, WorklogPayload};
use jira_worklog_sync::remote::IssueSource;
use jira_worklog_sync::store::SeaOrmStore;
use jira_worklog_sync::store::database::select_worklogs;

pub const PROJECT_ID: i16 = 5;

/// Fresh in-memory SQLite store with one project and no users.
pub async fn test_store() -> SeaOrmStore {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    create_schema(&db).await.unwrap();

    project::ActiveModel {
        id: Set(PROJECT_ID),
        key: Set("PROJ".to_string()),
        name: Set("Project".to_string()),
        is_active: Set(true),
        priority: Set(1),
    }
    .insert(&db)
    .await
    .unwrap();

    SeaOrmStore::new(db)
}

pub async fn seed_user(store: &SeaOrmStore, id: i16, email: &str) {
    user::ActiveModel {
        id: Set(id),
        email: Set(email.to_string()),
        first_name: Set("Test".to_string()),
        last_name: Set(format!("User{id}")),
        role: Set(UserRole::User),
        position_id: Set(1),
        grade_id: Set(None),
        photo: Set(None),
        telegram_id: Set(1000 + i64::from(id)),
        tg_first_name: Set(None),
        tg_last_name: Set(None),
        tg_username: Set(None),
        is_new: Set(false),
    }
    .insert(store.connection())
    .await
    .unwrap();
}

pub async fn all_issues(store: &SeaOrmStore) -> Vec<issue::Model> {
    issue::Entity::find().all(store.connection()).await.unwrap()
}

pub async fn all_worklogs(store: &SeaOrmStore) -> Vec<worklog::Model> {
    let mut rows = select_worklogs().all(store.connection()).await.unwrap();
    rows.sort_by_key(|row| row.id);
    rows
}

pub fn issue_json(id: i64, key: &str) -> Value {
    json!({
        "id": id.to_string(),
        "key": key,
        "fields": {
            "summary": format!("Summary of {key}"),
            "issuetype": { "name": "Задача" },
            "priority": { "name": "High" },
            "status": { "name": "In Progress" },
            "created": "2024-01-01T00:00:00.000+0000",
            "project": { "id": PROJECT_ID.to_string() },
            "assignee": null,
            "duedate": null
        }
    })
}

pub fn worklog_json(
    id: i64,
    issue_id: i64,
    email: Option<&str>,
    seconds: i64,
    started: &str,
) -> Value {
    let author = match email {
        Some(email) => json!({ "emailAddress": email }),
        None => json!({ "displayName": "Deleted user" }),
    };
    json!({
        "id": id.to_string(),
        "issueId": issue_id.to_string(),
        "author": author,
        "timeSpentSeconds": seconds,
        "started": started
    })
}

/// In-memory stand-in for the remote tracker. Keys without a scripted issue
/// answer `NotFound`; keys without scripted worklogs answer an empty list.
#[derive(Default)]
pub struct ScriptedSource {
    issues: Mutex<HashMap<String, Result<IssuePayload, RemoteError>>>,
    worklogs: Mutex<HashMap<String, Result<Vec<WorklogPayload>, RemoteError>>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_issue(&self, key: &str, payload: Value) {
        let payload: IssuePayload = serde_json::from_value(payload).unwrap();
        self.issues.lock().unwrap().insert(key.to_string(), Ok(payload));
    }

    pub fn fail_issue(&self, key: &str, err: RemoteError) {
        self.issues.lock().unwrap().insert(key.to_string(), Err(err));
    }

    pub fn set_worklogs(&self, key: &str, entries: Vec<Value>) {
        let listing: WorklogListing =
            serde_json::from_value(json!({ "worklogs": entries })).unwrap();
        self.worklogs
            .lock()
            .unwrap()
            .insert(key.to_string(), Ok(listing.worklogs.unwrap_or_default()));
    }

    pub fn fail_worklogs(&self, key: &str, err: RemoteError) {
        self.worklogs.lock().unwrap().insert(key.to_string(), Err(err));
    }
}

#[async_trait]
impl IssueSource for ScriptedSource {
    async fn fetch_issue(&self, key: &str) -> Result<IssuePayload, RemoteError> {
        self.issues
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_else(|| Err(RemoteError::NotFound(key.to_string())))
    }

    async fn fetch_worklogs(&self, key: &str) -> Result<Vec<WorklogPayload>, RemoteError> {
        self.worklogs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
