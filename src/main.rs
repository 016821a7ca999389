use tracing::{error, info};

use jira_worklog_sync::configuration::get_configuration;
use jira_worklog_sync::db::init_db;
use jira_worklog_sync::model::input::load_issue_keys;
use jira_worklog_sync::remote::JiraClient;
use jira_worklog_sync::store::SeaOrmStore;
use jira_worklog_sync::sync::SyncEngine;
use jira_worklog_sync::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = get_configuration();

    let subscriber = get_subscriber(
        "jira_worklog_sync".into(),
        settings.log_filter.clone(),
        std::io::stdout,
    );
    init_subscriber(subscriber)?;

    let keys = load_issue_keys(&settings.input)?;
    let db = init_db(settings.database_url.expose()).await?;
    let client = JiraClient::new(settings.jira())?;

    let engine = SyncEngine::new(client, SeaOrmStore::new(db), settings.sync_options());
    let report = match engine.run(&keys).await {
        Ok(report) => report,
        Err(err) => {
            error!(error = %err, "sync aborted");
            return Err(err.into());
        }
    };

    info!(
        issues = report.issues_total,
        created = report.issues_created,
        linked = report.issues_linked,
        failed = report.issues_failed,
        worklogs_inserted = report.worklogs.inserted,
        worklogs_updated = report.worklogs.updated,
        worklogs_unchanged = report.worklogs.unchanged,
        worklogs_skipped = report.worklogs.skipped(),
        worklogs_failed = report.worklogs.failed,
        "sync finished"
    );
    if !report.is_clean() {
        info!(failures = %serde_json::to_string(&report.failures)?, "failures");
    }

    Ok(())
}
