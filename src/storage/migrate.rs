//! Schema migrations.
//!
//! SQL files live in `migrations/<backend>/` and are embedded at compile
//! time. Applied versions are tracked in sqlx's `_sqlx_migrations` table.

use serde::Serialize;
use sqlx::migrate::Migrator;
use sqlx::Row;
use tracing::info;

use super::{DatabasePool, Result, StorageError};

#[cfg(feature = "sqlite")]
static SQLITE_MIGRATOR: Migrator = sqlx::migrate!("./migrations/sqlite");

#[cfg(feature = "postgres")]
static POSTGRES_MIGRATOR: Migrator = sqlx::migrate!("./migrations/postgres");

const APPLIED_VERSIONS: &str = "SELECT version FROM _sqlx_migrations WHERE success = TRUE";

/// One known migration and whether it has been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub version: i64,
    pub description: String,
    pub applied: bool,
}

fn migrator_for(pool: &DatabasePool) -> &'static Migrator {
    match pool {
        #[cfg(feature = "sqlite")]
        DatabasePool::Sqlite(_) => &SQLITE_MIGRATOR,
        #[cfg(feature = "postgres")]
        DatabasePool::Postgres(_) => &POSTGRES_MIGRATOR,
    }
}

/// Apply every pending migration.
pub async fn run(pool: &DatabasePool) -> Result<()> {
    let migrator = migrator_for(pool);
    match pool {
        #[cfg(feature = "sqlite")]
        DatabasePool::Sqlite(pool) => migrator.run(pool).await?,
        #[cfg(feature = "postgres")]
        DatabasePool::Postgres(pool) => migrator.run(pool).await?,
    }
    info!(known = migrator.iter().count(), "Migrations applied");
    Ok(())
}

/// Known migrations with their applied state, in version order.
pub async fn status(pool: &DatabasePool) -> Result<Vec<MigrationStatus>> {
    let applied = applied_versions(pool).await?;
    Ok(migrator_for(pool)
        .iter()
        .map(|m| MigrationStatus {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect())
}

fn collect_versions<R: Row>(rows: Vec<R>) -> std::result::Result<Vec<i64>, sqlx::Error>
where
    i64: for<'r> sqlx::Decode<'r, R::Database> + sqlx::Type<R::Database>,
    for<'c> &'c str: sqlx::ColumnIndex<R>,
{
    rows.iter().map(|r| r.try_get::<i64, _>("version")).collect()
}

async fn applied_versions(pool: &DatabasePool) -> Result<Vec<i64>> {
    let rows = match pool {
        #[cfg(feature = "sqlite")]
        DatabasePool::Sqlite(pool) => sqlx::query(APPLIED_VERSIONS)
            .fetch_all(pool)
            .await
            .map(collect_versions),
        #[cfg(feature = "postgres")]
        DatabasePool::Postgres(pool) => sqlx::query(APPLIED_VERSIONS)
            .fetch_all(pool)
            .await
            .map(collect_versions),
    };

    match rows {
        Ok(versions) => versions.map_err(StorageError::from),
        // No tracking table yet means nothing has been applied.
        Err(sqlx::Error::Database(_)) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}
