use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;

use crate::remote::JiraConfig;
use crate::sync::SyncOptions;

/// String that never shows up in Debug output or logs.
#[derive(Clone)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Secret(value)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "jira-worklog-sync",
    version,
    about = "Sync Jira issues and worklogs into the tracking database"
)]
pub struct Settings {
    /// JSON array of objects with a `Key` field
    #[arg(default_value = "issues.json")]
    pub input: PathBuf,

    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Secret,

    /// Base URL of the Jira site, e.g. https://example.atlassian.net
    #[arg(long, env = "JIRA_DOMAIN")]
    pub jira_domain: String,

    #[arg(long, env = "JIRA_EMAIL")]
    pub jira_email: String,

    #[arg(long, env = "JIRA_TOKEN", hide_env_values = true)]
    pub jira_token: Secret,

    #[arg(long, env = "JIRA_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Used when RUST_LOG is not set
    #[arg(long, default_value = "info,sqlx=warn")]
    pub log_filter: String,

    /// Stop at the first database error instead of recording it and continuing
    #[arg(long)]
    pub abort_on_database_error: bool,
}

impl Settings {
    pub fn jira(&self) -> JiraConfig {
        JiraConfig {
            base_url: self.jira_domain.clone(),
            email: self.jira_email.clone(),
            token: self.jira_token.expose().to_string(),
            timeout: Duration::from_secs(self.http_timeout_secs),
        }
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            abort_on_database_error: self.abort_on_database_error,
        }
    }
}

/// Loads `.env` if present, then parses flags with environment fallbacks.
pub fn get_configuration() -> Settings {
    dotenv().ok();
    Settings::parse()
}
