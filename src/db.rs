use std::time::Duration;

use sea_orm::sea_query::{Alias, ColumnDef, Expr, ForeignKey, Table, TableCreateStatement};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr,
    ForeignKeyAction, Schema,
};
use tracing::{debug, info, instrument};
use tracing_log::log::LevelFilter;

use crate::entity::{issue, project, user, worklog};

#[instrument(skip(database_url))]
pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    info!("configuring database connection");

    let mut options = ConnectOptions::new(database_url);
    options
        .max_connections(5)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(60))
        .sqlx_logging(true)
        .sqlx_logging_level(LevelFilter::Debug);

    let db = Database::connect(options).await?;
    info!("database connected");

    Ok(db)
}

/// Creates the four tables the sync touches, in foreign key order.
///
/// Meant for SQLite scratch databases and tests; the production Postgres
/// schema, including its enum types, is owned by the tracker's own migrations.
/// `worklog` is spelled out by hand because its `hour INTERVAL` column has no
/// SQLite column type to derive from.
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let statements = [
        schema
            .create_table_from_entity(project::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(user::Entity)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(issue::Entity)
            .if_not_exists()
            .to_owned(),
        worklog_table(backend),
    ];

    for statement in &statements {
        db.execute(backend.build(statement)).await?;
    }
    debug!(tables = statements.len(), "schema created");

    Ok(())
}

fn worklog_table(backend: DbBackend) -> TableCreateStatement {
    let non_negative = match backend {
        DbBackend::Postgres => Expr::cust("EXTRACT(EPOCH FROM hour) >= 0"),
        _ => Expr::col(worklog::Column::Hour).gte(0),
    };

    Table::create()
        .table(worklog::Entity)
        .if_not_exists()
        .col(
            ColumnDef::new(worklog::Column::Id)
                .big_integer()
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(worklog::Column::IssueId)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(worklog::Column::UserId)
                .small_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(worklog::Column::Hour)
                .custom(Alias::new("interval"))
                .not_null()
                .check(non_negative),
        )
        .col(
            ColumnDef::new(worklog::Column::DateCreated)
                .date()
                .not_null(),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_worklog_issue")
                .from(worklog::Entity, worklog::Column::IssueId)
                .to(issue::Entity, issue::Column::Id)
                .on_update(ForeignKeyAction::Cascade)
                .on_delete(ForeignKeyAction::Restrict),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_worklog_user")
                .from(worklog::Entity, worklog::Column::UserId)
                .to(user::Entity, user::Column::Id)
                .on_update(ForeignKeyAction::Cascade)
                .on_delete(ForeignKeyAction::Restrict),
        )
        .to_owned()
}
