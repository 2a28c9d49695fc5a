//! Storage implementations.
//!
//! `Storage` bundles one trait object per store so handlers stay agnostic of
//! the backend. SQL stores share a single pool per process.

use std::sync::Arc;

use backon::Retryable;
use tracing::{info, warn};

use crate::config::{StorageConfig, StorageType};
use crate::utils::retry::{connection_backoff, is_retryable_connect_error};

pub mod helpers;
pub mod migrate;
pub mod mock;
pub mod schema;
pub mod sql;

pub use crate::interfaces::{
    CustomerStore, DashboardStore, InvoiceStore, ProductStore, Result, StorageError, UserStore,
};
pub use mock::MockStore;

/// A connected database pool for the configured backend.
#[derive(Clone)]
pub enum DatabasePool {
    #[cfg(feature = "sqlite")]
    Sqlite(sqlx::SqlitePool),
    #[cfg(feature = "postgres")]
    Postgres(sqlx::PgPool),
}

impl DatabasePool {
    /// Connect to the configured database, retrying transient failures.
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        info!(
            storage_type = %config.storage_type,
            max_connections = config.max_connections,
            "Connecting to storage"
        );

        (|| async { Self::connect_once(config).await })
            .retry(connection_backoff())
            .when(is_retryable_connect_error)
            .notify(|err: &StorageError, dur: std::time::Duration| {
                warn!(error = %err, delay = ?dur, "Storage connection failed, retrying");
            })
            .await
    }

    async fn connect_once(config: &StorageConfig) -> Result<Self> {
        match config.storage_type {
            #[cfg(feature = "sqlite")]
            StorageType::Sqlite => {
                use std::str::FromStr;

                use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

                let path = config.sqlite.path.as_str();
                let in_memory = path == ":memory:";
                let url = if in_memory {
                    "sqlite::memory:".to_string()
                } else {
                    if let Some(parent) = std::path::Path::new(path).parent() {
                        if !parent.as_os_str().is_empty() {
                            std::fs::create_dir_all(parent).map_err(|e| {
                                StorageError::Unavailable(format!(
                                    "cannot create {}: {}",
                                    parent.display(),
                                    e
                                ))
                            })?;
                        }
                    }
                    format!("sqlite:{}", path)
                };

                let options = SqliteConnectOptions::from_str(&url)?
                    .create_if_missing(true)
                    .foreign_keys(true)
                    .with_regexp();

                // Every connection to :memory: is a separate database.
                let pool_options = if in_memory {
                    SqlitePoolOptions::new()
                        .max_connections(1)
                        .idle_timeout(None)
                        .max_lifetime(None)
                } else {
                    SqlitePoolOptions::new().max_connections(config.max_connections.max(1))
                };

                Ok(DatabasePool::Sqlite(pool_options.connect_with(options).await?))
            }
            #[cfg(not(feature = "sqlite"))]
            StorageType::Sqlite => Err(StorageError::Unavailable(
                "SQLite storage requested but 'sqlite' feature is not enabled".into(),
            )),
            #[cfg(feature = "postgres")]
            StorageType::Postgres => {
                use sqlx::postgres::PgPoolOptions;

                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections.max(1))
                    .connect(&config.postgres.uri)
                    .await?;
                Ok(DatabasePool::Postgres(pool))
            }
            #[cfg(not(feature = "postgres"))]
            StorageType::Postgres => Err(StorageError::Unavailable(
                "PostgreSQL storage requested but 'postgres' feature is not enabled".into(),
            )),
        }
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        match self {
            #[cfg(feature = "sqlite")]
            DatabasePool::Sqlite(pool) => pool.close().await,
            #[cfg(feature = "postgres")]
            DatabasePool::Postgres(pool) => pool.close().await,
        }
    }
}

/// All stores the application uses.
#[derive(Clone)]
pub struct Storage {
    pub customers: Arc<dyn CustomerStore>,
    pub invoices: Arc<dyn InvoiceStore>,
    pub dashboard: Arc<dyn DashboardStore>,
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
}

impl Storage {
    /// SQL stores sharing `pool`.
    pub fn from_pool(pool: &DatabasePool) -> Self {
        match pool {
            #[cfg(feature = "sqlite")]
            DatabasePool::Sqlite(pool) => {
                use sql::sqlite::*;

                Self {
                    customers: Arc::new(SqliteCustomerStore::new(pool.clone())),
                    invoices: Arc::new(SqliteInvoiceStore::new(pool.clone())),
                    dashboard: Arc::new(SqliteDashboardStore::new(pool.clone())),
                    users: Arc::new(SqliteUserStore::new(pool.clone())),
                    products: Arc::new(SqliteProductStore::new(pool.clone())),
                }
            }
            #[cfg(feature = "postgres")]
            DatabasePool::Postgres(pool) => {
                use sql::postgres::*;

                Self {
                    customers: Arc::new(PostgresCustomerStore::new(pool.clone())),
                    invoices: Arc::new(PostgresInvoiceStore::new(pool.clone())),
                    dashboard: Arc::new(PostgresDashboardStore::new(pool.clone())),
                    users: Arc::new(PostgresUserStore::new(pool.clone())),
                    products: Arc::new(PostgresProductStore::new(pool.clone())),
                }
            }
        }
    }

    /// Every store backed by the same in-memory tables.
    pub fn mock(store: Arc<MockStore>) -> Self {
        Self {
            customers: store.clone(),
            invoices: store.clone(),
            dashboard: store.clone(),
            users: store.clone(),
            products: store,
        }
    }
}

/// Initialize storage based on configuration.
///
/// Connects (with retry), applies migrations when `migrate_on_start` is
/// set, and returns the store bundle plus the pool for shutdown.
pub async fn init_storage(config: &StorageConfig) -> Result<(Storage, DatabasePool)> {
    let pool = DatabasePool::connect(config).await?;
    if config.migrate_on_start {
        migrate::run(&pool).await?;
    }
    Ok((Storage::from_pool(&pool), pool))
}
