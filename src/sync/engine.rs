use std::collections::{HashMap, HashSet};

use tracing::{debug, info, instrument, warn};

use crate::entity::{WorkDuration, issue, worklog};
use crate::model::global_error::{PersistenceError, RemoteError, SyncError};
use crate::model::jira::{IssuePayload, WorklogPayload};
use crate::model::report::{IssueOutcome, Stage, SyncPath, SyncReport};
use crate::remote::IssueSource;
use crate::store::Store;
use crate::util::normalize::{
    classify_issue_type, normalize_author_email, normalize_priority, normalize_status,
    resolve_parent_id,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Stop the run on the first persistence failure instead of recording it and moving on.
    pub abort_on_database_error: bool,
}

/// Per-issue reconciliation between the remote tracker and the local store.
///
/// Issues are handled one at a time: look the key up locally, fetch the
/// remote issue, insert it (new key) or rewrite its parent link (known key),
/// then diff its worklogs. Each write is its own transaction, so a failed
/// write only costs that write.
pub struct SyncEngine<S, G> {
    source: S,
    store: G,
    options: SyncOptions,
}

impl<S: IssueSource, G: Store> SyncEngine<S, G> {
    pub fn new(source: S, store: G, options: SyncOptions) -> Self {
        Self { source, store, options }
    }

    pub async fn run(&self, keys: &[String]) -> Result<SyncReport, SyncError> {
        info!(issues = keys.len(), "issues count");
        let mut report = SyncReport::default();
        let mut remaining = keys.len();

        for key in keys {
            let outcome = self.reconcile_issue(key).await?;
            remaining -= 1;
            info!(
                issue_key = %key,
                path = ?outcome.path,
                inserted = outcome.worklogs.inserted,
                updated = outcome.worklogs.updated,
                failures = outcome.failures.len(),
                remaining,
                "issue processed"
            );
            report.record(outcome);
        }

        Ok(report)
    }

    #[instrument(skip(self))]
    pub async fn reconcile_issue(&self, key: &str) -> Result<IssueOutcome, SyncError> {
        let mut outcome = IssueOutcome::new(key);

        let existing = match self.store.find_issue_by_key(key).await {
            Ok(existing) => existing,
            Err(err) => {
                let err = self.escalate(key, err)?;
                outcome.fail(Stage::LookupIssue, &err);
                return Ok(outcome);
            }
        };

        let payload = match self.source.fetch_issue(key).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "issue fetch failed, skipping");
                outcome.fail(Stage::FetchIssue, &err);
                return Ok(outcome);
            }
        };
        let parent_issue_id = resolve_parent_id(&payload);

        let issue_id = match existing {
            None => {
                outcome.path = Some(SyncPath::Create);
                self.create_issue(&payload, parent_issue_id, &mut outcome).await?;
                payload.id
            }
            Some(local) => {
                outcome.path = Some(SyncPath::Update);
                if local.id != payload.id {
                    warn!(
                        local_id = local.id,
                        remote_id = payload.id,
                        "local and remote issue ids differ"
                    );
                }
                self.link_parent(&local, parent_issue_id, &mut outcome).await?;
                local.id
            }
        };

        self.reconcile_worklogs(key, issue_id, &mut outcome).await?;
        Ok(outcome)
    }

    async fn create_issue(
        &self,
        payload: &IssuePayload,
        parent_issue_id: Option<i64>,
        outcome: &mut IssueOutcome,
    ) -> Result<(), SyncError> {
        let key = outcome.issue_key.clone();
        let fields = &payload.fields;

        let Some(priority) = normalize_priority(&fields.priority.name) else {
            let err =
                RemoteError::Malformed(format!("unknown priority {:?}", fields.priority.name));
            warn!(error = %err, "issue not inserted");
            outcome.fail(Stage::InsertIssue, &err);
            return Ok(());
        };

        let Ok(project_id) = i16::try_from(fields.project.id) else {
            let err =
                RemoteError::Malformed(format!("project id {} out of range", fields.project.id));
            warn!(error = %err, "issue not inserted");
            outcome.fail(Stage::InsertIssue, &err);
            return Ok(());
        };

        let developer_id = match normalize_author_email(fields.assignee_email()) {
            None => None,
            Some(email) => match self.store.find_user_by_email(&email).await {
                Ok(user) => {
                    if user.is_none() {
                        debug!(%email, "assignee has no local user, developer left empty");
                    }
                    user.map(|user| user.id)
                }
                Err(err) => {
                    let err = self.escalate(&key, err)?;
                    outcome.fail(Stage::ResolveUser, &err);
                    None
                }
            },
        };

        let record = issue::Model {
            id: payload.id,
            name: fields.summary.clone(),
            key: payload.key.clone(),
            issue_type: classify_issue_type(&fields.issuetype.name),
            priority,
            developer_id,
            reviewer_id: None,
            qa_id: None,
            status: normalize_status(&fields.status.name),
            start_date: fields.created,
            end_date: fields.duedate,
            project_id,
            parent_issue_id,
        };

        match self.store.insert_issue(&record).await {
            Ok(()) => {
                outcome.issue_written = true;
                info!(issue_id = record.id, "issue inserted");
            }
            Err(err) => {
                let err = self.escalate(&key, err)?;
                warn!(error = %err, "issue insert failed");
                outcome.fail(Stage::InsertIssue, &err);
            }
        }
        Ok(())
    }

    /// Rewrites the parent link every time, even when it did not change.
    async fn link_parent(
        &self,
        local: &issue::Model,
        parent_issue_id: Option<i64>,
        outcome: &mut IssueOutcome,
    ) -> Result<(), SyncError> {
        match self.store.update_issue_parent(local.id, parent_issue_id).await {
            Ok(()) => {
                outcome.issue_written = true;
                debug!(issue_id = local.id, ?parent_issue_id, "parent link written");
            }
            Err(err) => {
                let err = self.escalate(&outcome.issue_key, err)?;
                warn!(error = %err, "parent link update failed");
                outcome.fail(Stage::LinkParent, &err);
            }
        }
        Ok(())
    }

    /// Same procedure for new and known issues: rows missing locally are
    /// queued for one batch insert, rows whose date or duration drifted are
    /// updated in place, matching rows are left alone.
    async fn reconcile_worklogs(
        &self,
        key: &str,
        issue_id: i64,
        outcome: &mut IssueOutcome,
    ) -> Result<(), SyncError> {
        let entries = match self.source.fetch_worklogs(key).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "worklog fetch failed");
                outcome.fail(Stage::FetchWorklogs, &err);
                return Ok(());
            }
        };
        if entries.is_empty() {
            return Ok(());
        }

        let stored: HashMap<i64, worklog::Model> =
            match self.store.list_worklogs_for_issue(issue_id).await {
                Ok(rows) => rows.into_iter().map(|row| (row.id, row)).collect(),
                Err(err) => {
                    let err = self.escalate(key, err)?;
                    outcome.fail(Stage::LookupWorklogs, &err);
                    return Ok(());
                }
            };

        let mut users: HashMap<String, Option<i16>> = HashMap::new();
        let mut seen = HashSet::new();
        let mut pending = Vec::new();

        for entry in &entries {
            if !seen.insert(entry.id) {
                outcome.worklogs.skipped_duplicate += 1;
                continue;
            }
            let Some(email) = normalize_author_email(entry.author_email()) else {
                outcome.worklogs.skipped_no_author += 1;
                debug!(worklog_id = entry.id, "worklog has no author email");
                continue;
            };
            if entry.seconds() <= 0 {
                outcome.worklogs.skipped_no_time += 1;
                debug!(worklog_id = entry.id, "worklog has no time spent");
                continue;
            }

            let user_id = match self.resolve_user(key, &email, &mut users, outcome).await? {
                Some(user_id) => user_id,
                None => continue,
            };
            let desired = desired_row(entry, user_id);

            let current = match stored.get(&entry.id) {
                Some(row) => Some(row.clone()),
                // The id may already be stored under another issue.
                None => match self.store.find_worklog_by_id(entry.id).await {
                    Ok(row) => row,
                    Err(err) => {
                        let err = self.escalate(key, err)?;
                        outcome.worklogs.failed += 1;
                        outcome.fail(Stage::LookupWorklogs, &err);
                        continue;
                    }
                },
            };

            match current {
                None => pending.push(desired),
                Some(row) if row.matches(desired.date_created, desired.hour) => {
                    outcome.worklogs.unchanged += 1;
                    debug!(worklog_id = row.id, "worklog already exists");
                }
                Some(row) => {
                    match self
                        .store
                        .update_worklog(row.id, desired.date_created, desired.hour)
                        .await
                    {
                        Ok(()) => {
                            outcome.worklogs.updated += 1;
                            info!(
                                worklog_id = row.id,
                                from_date = %row.date_created,
                                to_date = %desired.date_created,
                                from_hour = %row.hour,
                                to_hour = %desired.hour,
                                "worklog updated"
                            );
                        }
                        Err(err) => {
                            let err = self.escalate(key, err)?;
                            outcome.worklogs.failed += 1;
                            outcome.fail(Stage::UpdateWorklog, &err);
                        }
                    }
                }
            }
        }

        self.flush_pending(key, pending, outcome).await
    }

    /// Email lookups are cached per issue; one author usually logs many entries.
    async fn resolve_user(
        &self,
        key: &str,
        email: &str,
        cache: &mut HashMap<String, Option<i16>>,
        outcome: &mut IssueOutcome,
    ) -> Result<Option<i16>, SyncError> {
        let user_id = match cache.get(email) {
            Some(cached) => *cached,
            None => match self.store.find_user_by_email(email).await {
                Ok(user) => {
                    let user_id = user.map(|user| user.id);
                    cache.insert(email.to_string(), user_id);
                    user_id
                }
                Err(err) => {
                    let err = self.escalate(key, err)?;
                    outcome.worklogs.failed += 1;
                    outcome.fail(Stage::ResolveUser, &err);
                    return Ok(None);
                }
            },
        };

        if user_id.is_none() {
            outcome.worklogs.skipped_unknown_user += 1;
            debug!(%email, "worklog author has no local user");
        }
        Ok(user_id)
    }

    /// One batch statement per issue. If the batch is rejected the rows are
    /// retried one at a time so only the offending rows are lost.
    async fn flush_pending(
        &self,
        key: &str,
        pending: Vec<worklog::Model>,
        outcome: &mut IssueOutcome,
    ) -> Result<(), SyncError> {
        if pending.is_empty() {
            return Ok(());
        }

        match self.store.insert_worklogs_batch(&pending).await {
            Ok(_) => {
                outcome.worklogs.inserted += pending.len();
                info!(count = pending.len(), "worklogs inserted");
                return Ok(());
            }
            Err(err) => {
                let err = self.escalate(key, err)?;
                warn!(
                    error = %err,
                    count = pending.len(),
                    "worklog batch rejected, inserting rows one by one"
                );
            }
        }

        for row in &pending {
            match self.store.insert_worklog(row).await {
                Ok(()) => outcome.worklogs.inserted += 1,
                Err(err) => {
                    let err = self.escalate(key, err)?;
                    warn!(worklog_id = row.id, error = %err, "worklog insert failed");
                    outcome.worklogs.failed += 1;
                    outcome.fail(Stage::InsertWorklogs, &err);
                }
            }
        }
        Ok(())
    }

    /// Hands the error back when the run may continue past it.
    fn escalate(&self, key: &str, err: PersistenceError) -> Result<PersistenceError, SyncError> {
        match err {
            PersistenceError::Unavailable(_) => Err(SyncError::StoreUnavailable {
                issue_key: key.to_string(),
                source: err,
            }),
            _ if self.options.abort_on_database_error => Err(SyncError::Aborted {
                issue_key: key.to_string(),
                source: err,
            }),
            _ => Ok(err),
        }
    }
}

fn desired_row(entry: &WorklogPayload, user_id: i16) -> worklog::Model {
    worklog::Model {
        id: entry.id,
        issue_id: entry.issue_id,
        user_id,
        hour: WorkDuration::from_seconds(entry.seconds()),
        date_created: entry.started,
    }
}
