pub mod global_error;
pub mod input;
pub mod jira;
pub mod report;

pub use global_error::{ErrorKind, InputError, PersistenceError, RemoteError, SyncError};
pub use jira::{IssuePayload, WorklogPayload};
pub use report::{IssueOutcome, Stage, SyncPath, SyncReport, WorklogTally};
