use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;

use crate::migration::Migrator;

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .max_connections(20)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Apply every pending schema migration.
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    Migrator::up(conn, None).await?;
    Ok(())
}

/// Timestamps are stored normalized to UTC so they order consistently on every backend.
pub fn db_time<Tz: TimeZone>(at: &DateTime<Tz>) -> DateTimeWithTimeZone {
    at.with_timezone(&Utc).fixed_offset()
}

pub fn now() -> DateTimeWithTimeZone {
    Utc::now().fixed_offset()
}
