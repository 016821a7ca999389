pub mod duration;
pub mod enums;
pub mod issue;
pub mod project;
pub mod user;
pub mod worklog;

pub use duration::WorkDuration;
pub use enums::{IssuePriority, IssueStatus, IssueType, UserRole};
