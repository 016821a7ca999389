use sea_orm::ActiveEnum;

use crate::entity::{IssuePriority, IssueStatus, IssueType};
use crate::model::jira::IssuePayload;

/// Domains that were retired in favour of `CANONICAL_EMAIL_DOMAIN`.
/// Remote accounts created before the rename still carry them.
pub const LEGACY_EMAIL_DOMAINS: &[&str] = &["enigma.global"];
pub const CANONICAL_EMAIL_DOMAIN: &str = "atomgroup.io";

pub const DEFAULT_STATUS: IssueStatus = IssueStatus::InProgress;

const TASK_SYNONYMS: &[&str] = &["TASK", "ЗАДАЧА"];

/// `"To Do"` becomes `TO_DO`. Unknown statuses fall back to `IN_PROGRESS`;
/// the mapping is lossy on purpose.
pub fn normalize_status(raw: &str) -> IssueStatus {
    let candidate = raw.trim().to_uppercase().replace(' ', "_");
    IssueStatus::try_from_value(&candidate).unwrap_or(DEFAULT_STATUS)
}

pub fn normalize_priority(raw: &str) -> Option<IssuePriority> {
    IssuePriority::try_from_value(&raw.trim().to_uppercase()).ok()
}

pub fn classify_issue_type(raw_name: &str) -> IssueType {
    let upper = raw_name.trim().to_uppercase();
    if TASK_SYNONYMS.contains(&upper.as_str()) {
        IssueType::Task
    } else {
        IssueType::Bug
    }
}

/// Rewrites legacy domains to the canonical one, keeping the local part.
/// `None` means there is nobody to attribute the record to.
pub fn normalize_author_email(raw: Option<&str>) -> Option<String> {
    let email = raw.map(str::trim).filter(|email| !email.is_empty())?;

    match email.rsplit_once('@') {
        Some((local, domain))
            if LEGACY_EMAIL_DOMAINS
                .iter()
                .any(|legacy| legacy.eq_ignore_ascii_case(domain)) =>
        {
            Some(format!("{local}@{CANONICAL_EMAIL_DOMAIN}"))
        }
        _ => Some(email.to_string()),
    }
}

/// Parent link is propagated whenever the payload names a parent id,
/// whatever the parent's own issue type is.
pub fn resolve_parent_id(payload: &IssuePayload) -> Option<i64> {
    payload.fields.parent.as_ref().and_then(|parent| parent.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_upper_snake_cased() {
        assert_eq!(normalize_status("To Do"), IssueStatus::ToDo);
        assert_eq!(normalize_status("Code Review"), IssueStatus::CodeReview);
        assert_eq!(normalize_status("done"), IssueStatus::Done);
        assert_eq!(
            normalize_status("Returned from code review"),
            IssueStatus::ReturnedFromCodeReview
        );
    }

    #[test]
    fn unknown_status_falls_back_to_in_progress() {
        assert_eq!(normalize_status("Blocked"), IssueStatus::InProgress);
        assert_eq!(normalize_status(""), IssueStatus::InProgress);
    }

    #[test]
    fn legacy_domain_is_rewritten() {
        assert_eq!(
            normalize_author_email(Some("user@enigma.global")).as_deref(),
            Some("user@atomgroup.io")
        );
        assert_eq!(
            normalize_author_email(Some("User.Name@Enigma.Global")).as_deref(),
            Some("User.Name@atomgroup.io")
        );
    }

    #[test]
    fn other_domains_pass_through() {
        assert_eq!(
            normalize_author_email(Some("user@other.com")).as_deref(),
            Some("user@other.com")
        );
        assert_eq!(
            normalize_author_email(Some("user@enigma.global.example")).as_deref(),
            Some("user@enigma.global.example")
        );
    }

    #[test]
    fn missing_email_yields_none() {
        assert_eq!(normalize_author_email(None), None);
        assert_eq!(normalize_author_email(Some("  ")), None);
    }

    #[test]
    fn task_synonyms() {
        assert_eq!(classify_issue_type("Задача"), IssueType::Task);
        assert_eq!(classify_issue_type("task"), IssueType::Task);
        assert_eq!(classify_issue_type("Bug"), IssueType::Bug);
        assert_eq!(classify_issue_type("Story"), IssueType::Bug);
    }

    #[test]
    fn priorities() {
        assert_eq!(normalize_priority("High"), Some(IssuePriority::High));
        assert_eq!(normalize_priority("lowest"), Some(IssuePriority::Lowest));
        assert_eq!(normalize_priority("Critical"), None);
    }
}
