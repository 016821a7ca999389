use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::model::global_error::InputError;

/// One row of the exported issue list. Only `Key` is read; other columns of the export are ignored.
#[derive(Debug, Deserialize)]
pub struct IssueRow {
    #[serde(rename = "Key")]
    pub key: String,
}

pub fn load_issue_keys(path: &Path) -> Result<Vec<String>, InputError> {
    let raw = std::fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let keys = parse_issue_keys(&raw)?;
    info!(path = %path.display(), issues = keys.len(), "issue list loaded");
    Ok(keys)
}

/// Keys in first-seen order; repeated keys are kept once.
pub fn parse_issue_keys(raw: &str) -> Result<Vec<String>, InputError> {
    let rows: Vec<IssueRow> = serde_json::from_str(raw)?;
    let mut seen = HashSet::new();
    let mut keys = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let key = row.key.trim();
        if key.is_empty() {
            return Err(InputError::BlankKey(index));
        }
        if seen.insert(key.to_string()) {
            keys.push(key.to_string());
        } else {
            warn!(issue_key = key, "duplicate key in issue list, skipping");
        }
    }

    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_keys_and_ignores_other_columns() {
        let keys =
            parse_issue_keys(r#"[{"Key": "PROJ-1", "Summary": "x"}, {"Key": "PROJ-2"}]"#).unwrap();
        assert_eq!(keys, vec!["PROJ-1", "PROJ-2"]);
    }

    #[test]
    fn duplicates_are_dropped_in_order() {
        let keys = parse_issue_keys(r#"[{"Key": "B-1"}, {"Key": "A-1"}, {"Key": "B-1"}]"#).unwrap();
        assert_eq!(keys, vec!["B-1", "A-1"]);
    }

    #[test]
    fn blank_key_is_rejected() {
        let err = parse_issue_keys(r#"[{"Key": "A-1"}, {"Key": " "}]"#).unwrap_err();
        assert!(matches!(err, InputError::BlankKey(1)));
    }

    #[test]
    fn rows_without_key_are_a_parse_error() {
        assert!(matches!(parse_issue_keys(r#"[{"Summary": "x"}]"#), Err(InputError::Parse(_))));
        assert!(matches!(parse_issue_keys(r#"{"Key": "A-1"}"#), Err(InputError::Parse(_))));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"Key": "PROJ-7"}}]"#).unwrap();

        let keys = load_issue_keys(file.path()).unwrap();
        assert_eq!(keys, vec!["PROJ-7"]);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_issue_keys(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, InputError::Read { .. }));
    }
}
