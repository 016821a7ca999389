use serde::Serialize;

use crate::model::global_error::ErrorKind;

/// Which branch an issue took: no local row yet, or an existing row to relink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPath {
    Create,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    LookupIssue,
    FetchIssue,
    InsertIssue,
    LinkParent,
    FetchWorklogs,
    LookupWorklogs,
    ResolveUser,
    InsertWorklogs,
    UpdateWorklog,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub issue_key: String,
    pub stage: Stage,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorklogTally {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped_no_author: usize,
    pub skipped_no_time: usize,
    pub skipped_unknown_user: usize,
    pub skipped_duplicate: usize,
    pub failed: usize,
}

impl WorklogTally {
    /// Rows actually written (inserted or updated).
    pub fn writes(&self) -> usize {
        self.inserted + self.updated
    }

    pub fn skipped(&self) -> usize {
        self.skipped_no_author
            + self.skipped_no_time
            + self.skipped_unknown_user
            + self.skipped_duplicate
    }

    fn absorb(&mut self, other: &WorklogTally) {
        self.inserted += other.inserted;
        self.updated += other.updated;
        self.unchanged += other.unchanged;
        self.skipped_no_author += other.skipped_no_author;
        self.skipped_no_time += other.skipped_no_time;
        self.skipped_unknown_user += other.skipped_unknown_user;
        self.skipped_duplicate += other.skipped_duplicate;
        self.failed += other.failed;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueOutcome {
    pub issue_key: String,
    pub path: Option<SyncPath>,
    /// The issue row was inserted (create) or its parent link written (update).
    pub issue_written: bool,
    pub worklogs: WorklogTally,
    pub failures: Vec<Failure>,
}

impl IssueOutcome {
    pub fn new(issue_key: &str) -> Self {
        Self {
            issue_key: issue_key.to_string(),
            path: None,
            issue_written: false,
            worklogs: WorklogTally::default(),
            failures: Vec::new(),
        }
    }

    pub fn fail<E: ErrorKind + std::fmt::Display>(&mut self, stage: Stage, err: &E) {
        self.failures.push(Failure {
            issue_key: self.issue_key.clone(),
            stage,
            kind: err.kind(),
            message: err.to_string(),
        });
    }

    pub fn failed_at(&self, stage: Stage) -> bool {
        self.failures.iter().any(|failure| failure.stage == stage)
    }
}

/// End-of-run summary.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub issues_total: usize,
    pub issues_created: usize,
    pub issues_linked: usize,
    pub issues_failed: usize,
    pub worklogs: WorklogTally,
    pub failures: Vec<Failure>,
}

impl SyncReport {
    pub fn record(&mut self, outcome: IssueOutcome) {
        self.issues_total += 1;
        match (outcome.path, outcome.issue_written) {
            (Some(SyncPath::Create), true) => self.issues_created += 1,
            (Some(SyncPath::Update), true) => self.issues_linked += 1,
            _ => self.issues_failed += 1,
        }
        self.worklogs.absorb(&outcome.worklogs);
        self.failures.extend(outcome.failures);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
