//! Storage configuration types.

use serde::Deserialize;

/// Storage type discriminator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    Sqlite,
    Postgres,
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageType::Sqlite => f.write_str("sqlite"),
            StorageType::Postgres => f.write_str("postgres"),
        }
    }
}

/// Storage configuration (discriminated union).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type discriminator.
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// SQLite-specific configuration.
    pub sqlite: SqliteConfig,
    /// PostgreSQL-specific configuration.
    pub postgres: PostgresConfig,
    /// Maximum pooled connections.
    pub max_connections: u32,
    /// Run pending migrations when the server starts.
    pub migrate_on_start: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Sqlite,
            sqlite: SqliteConfig::default(),
            postgres: PostgresConfig::default(),
            max_connections: 5,
            migrate_on_start: true,
        }
    }
}

impl StorageConfig {
    /// Point the configuration at `url`, switching backend by scheme.
    pub fn apply_database_url(&mut self, url: &str) {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            self.storage_type = StorageType::Postgres;
            self.postgres.uri = url.to_string();
        } else {
            self.storage_type = StorageType::Sqlite;
            self.sqlite.path = url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:")
                .to_string();
        }
    }

    /// Config for an in-memory SQLite database.
    pub fn sqlite_memory() -> Self {
        Self {
            storage_type: StorageType::Sqlite,
            sqlite: SqliteConfig {
                path: ":memory:".to_string(),
            },
            max_connections: 1,
            migrate_on_start: true,
            ..Self::default()
        }
    }
}

/// SQLite-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SqliteConfig {
    /// Database file path, or `:memory:`.
    pub path: String,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: "data/dashboard.db".to_string(),
        }
    }
}

/// PostgreSQL-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PostgresConfig {
    /// PostgreSQL connection URI.
    pub uri: String,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            uri: "postgres://localhost:5432/dashboard".to_string(),
        }
    }
}
