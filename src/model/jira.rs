use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, de};

use crate::util::time::parse_jira_date;

#[derive(Debug, Clone, Deserialize)]
pub struct IssuePayload {
    #[serde(deserialize_with = "de_id")]
    pub id: i64,
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueFields {
    pub summary: String,
    pub issuetype: NamedRef,
    pub priority: NamedRef,
    pub status: NamedRef,
    #[serde(deserialize_with = "de_date")]
    pub created: NaiveDate,
    pub project: ProjectRef,
    #[serde(default)]
    pub assignee: Option<JiraUser>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub duedate: Option<NaiveDate>,
    #[serde(default)]
    pub parent: Option<ParentRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRef {
    #[serde(deserialize_with = "de_id")]
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    #[serde(default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParentRef {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorklogListing {
    #[serde(default)]
    pub worklogs: Option<Vec<WorklogPayload>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPayload {
    #[serde(deserialize_with = "de_id")]
    pub id: i64,
    #[serde(deserialize_with = "de_id")]
    pub issue_id: i64,
    #[serde(default)]
    pub author: Option<JiraUser>,
    #[serde(default)]
    pub time_spent_seconds: Option<i64>,
    #[serde(deserialize_with = "de_date")]
    pub started: NaiveDate,
}

impl IssueFields {
    pub fn assignee_email(&self) -> Option<&str> {
        self.assignee.as_ref().and_then(|user| user.email_address.as_deref())
    }
}

impl WorklogPayload {
    pub fn author_email(&self) -> Option<&str> {
        self.author.as_ref().and_then(|user| user.email_address.as_deref())
    }

    /// Missing time counts as zero.
    pub fn seconds(&self) -> i64 {
        self.time_spent_seconds.unwrap_or(0)
    }
}

// Jira sends numeric ids as JSON strings; fixtures and older endpoints use numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl RawId {
    fn into_id<E: de::Error>(self) -> Result<i64, E> {
        match self {
            RawId::Number(n) => Ok(n),
            RawId::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid numeric id {text:?}"))),
        }
    }
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    RawId::deserialize(deserializer)?.into_id()
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    Option::<RawId>::deserialize(deserializer)?
        .map(RawId::into_id)
        .transpose()
}

fn de_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_jira_date(&raw)
        .ok_or_else(|| de::Error::custom(format!("unrecognised timestamp {raw:?}")))
}

fn de_opt_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_jira_date(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unrecognised date {raw:?}"))),
    }
}
