//! Provider definitions and store configuration.
//!
//! This module contains:
//! - `Provider` - Enum of supported storage backends
//! - `StoreConfig` - Provider, connection string and optional database name
//! - `validate_collection_name` - Allow-list check applied before any backend call

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

/// Environment variable holding the provider name
pub const ENV_PROVIDER: &str = "OPENSCHEMA_PROVIDER";
/// Environment variable holding the connection string
pub const ENV_CONNECTION: &str = "OPENSCHEMA_CONNECTION";
/// Environment variable holding the database name (MongoDB only)
pub const ENV_DATABASE: &str = "OPENSCHEMA_DATABASE";

/// Longest accepted collection name (PostgreSQL truncates identifiers past 63 bytes).
pub const MAX_COLLECTION_NAME_LEN: usize = 63;

/// Supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Embedded document store backed by a redb file
    #[serde(alias = "embedded", alias = "docstore", alias = "litedb")]
    Redb,
    /// Managed MongoDB deployment
    #[serde(alias = "mongo")]
    MongoDb,
    /// Redis key/value server
    #[serde(alias = "redisdb")]
    Redis,
    /// PostgreSQL with a JSONB data column
    #[serde(alias = "postgresql", alias = "postgresqldb", alias = "pg")]
    Postgres,
    /// Embedded SQLite with a JSON text column
    #[serde(alias = "sqlite3", alias = "sqlitedb")]
    Sqlite,
}

impl Provider {
    /// Get the display name for this provider
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Redb => "redb",
            Self::MongoDb => "MongoDB",
            Self::Redis => "Redis",
            Self::Postgres => "PostgreSQL",
            Self::Sqlite => "SQLite",
        }
    }

    /// Check if the backend lives in a local file (redb, SQLite)
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Redb | Self::Sqlite)
    }

    /// Check if the provider uses the secondary database-name parameter
    pub fn uses_database_name(&self) -> bool {
        matches!(self, Self::MongoDb)
    }

    /// Get all available providers
    pub fn all() -> Vec<Provider> {
        vec![
            Self::Redb,
            Self::MongoDb,
            Self::Redis,
            Self::Postgres,
            Self::Sqlite,
        ]
    }

    /// Parse a provider name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "redb" | "embedded" | "docstore" | "litedb" => Some(Self::Redb),
            "mongodb" | "mongo" => Some(Self::MongoDb),
            "redis" | "redisdb" => Some(Self::Redis),
            "postgres" | "postgresql" | "postgresqldb" | "pg" => Some(Self::Postgres),
            "sqlite" | "sqlite3" | "sqlitedb" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Canonical provider token
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redb => "redb",
            Self::MongoDb => "mongodb",
            Self::Redis => "redis",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Everything the factory needs to open a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which backend to open
    pub provider: Provider,
    /// Connection string, URL or file path
    pub connection: String,
    /// Database name (MongoDB only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl StoreConfig {
    /// Create a new store configuration
    pub fn new(provider: Provider, connection: impl Into<String>) -> Self {
        Self {
            provider,
            connection: connection.into(),
            database: None,
        }
    }

    /// Set the database name
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Load the configuration from `OPENSCHEMA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration from any source keyed by the `OPENSCHEMA_*` names.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider_name = read(ENV_PROVIDER).ok_or_else(|| anyhow!("{} is not set", ENV_PROVIDER))?;
        let provider = Provider::from_str(&provider_name)
            .ok_or_else(|| anyhow!("Unsupported provider: {}", provider_name))?;
        let connection =
            read(ENV_CONNECTION).ok_or_else(|| anyhow!("{} is not set", ENV_CONNECTION))?;

        let config = Self {
            provider,
            connection,
            database: read(ENV_DATABASE),
        };
        config.validate().map_err(|e| anyhow!(e))?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.connection.trim().is_empty() {
            return Err(format!(
                "{} requires a connection string",
                self.provider.display_name()
            ));
        }
        if let Some(database) = &self.database {
            if database.trim().is_empty() {
                return Err("Database name must not be empty".to_string());
            }
        }
        Ok(())
    }
}

/// Check a collection name against the allow-list `[A-Za-z0-9_]{1,63}`.
///
/// Collection names end up as table names in DDL and as key prefixes in
/// Redis glob patterns, so nothing outside the allow-list gets through.
pub fn validate_collection_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        bail!("Collection name must not be empty");
    }
    if name.len() > MAX_COLLECTION_NAME_LEN {
        bail!(
            "Collection name '{}' exceeds {} characters",
            name,
            MAX_COLLECTION_NAME_LEN
        );
    }
    if let Some(bad) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
    {
        bail!(
            "Collection name '{}' contains invalid character {:?}",
            name,
            bad
        );
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!(Provider::from_str("redb"), Some(Provider::Redb));
        assert_eq!(Provider::from_str("LiteDb"), Some(Provider::Redb));
        assert_eq!(Provider::from_str("MongoDB"), Some(Provider::MongoDb));
        assert_eq!(Provider::from_str("RedisDb"), Some(Provider::Redis));
        assert_eq!(Provider::from_str("postgresqldb"), Some(Provider::Postgres));
        assert_eq!(Provider::from_str("PG"), Some(Provider::Postgres));
        assert_eq!(Provider::from_str(" sqlitedb "), Some(Provider::Sqlite));
        assert_eq!(Provider::from_str("mysql"), None);
        assert_eq!(Provider::from_str(""), None);
    }

    #[test]
    fn test_provider_round_trips_through_canonical_token() {
        for provider in Provider::all() {
            assert_eq!(Provider::from_str(provider.as_str()), Some(provider));
        }
    }

    #[test]
    fn test_provider_flags() {
        assert!(Provider::Redb.is_embedded());
        assert!(Provider::Sqlite.is_embedded());
        assert!(!Provider::Postgres.is_embedded());
        assert!(Provider::MongoDb.uses_database_name());
        assert!(!Provider::Redis.uses_database_name());
    }

    #[test]
    fn test_collection_name_validation() {
        assert!(validate_collection_name("T").is_ok());
        assert!(validate_collection_name("Test_Collection_2").is_ok());
        assert!(validate_collection_name("").is_err());
        assert!(validate_collection_name("users; DROP TABLE x").is_err());
        assert!(validate_collection_name("a\"b").is_err());
        assert!(validate_collection_name("keys:*").is_err());
        assert!(validate_collection_name(&"x".repeat(64)).is_err());
        assert!(validate_collection_name(&"x".repeat(63)).is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(StoreConfig::new(Provider::Sqlite, ":memory:").validate().is_ok());
        assert!(StoreConfig::new(Provider::Redis, "  ").validate().is_err());
        assert!(
            StoreConfig::new(Provider::MongoDb, "mongodb://localhost")
                .with_database("")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_config_deserializes_provider_aliases() {
        let config: StoreConfig = serde_json::from_str(
            r#"{"provider": "postgresqldb", "connection": "postgres://localhost/db"}"#,
        )
        .unwrap();
        assert_eq!(config.provider, Provider::Postgres);
        assert_eq!(config.database, None);

        let config: StoreConfig = serde_json::from_str(
            r#"{"provider": "mongo", "connection": "mongodb://localhost", "database": "app"}"#,
        )
        .unwrap();
        assert_eq!(config.provider, Provider::MongoDb);
        assert_eq!(config.database.as_deref(), Some("app"));
    }

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_config_from_lookup() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (ENV_PROVIDER, "mongo"),
            (ENV_CONNECTION, "mongodb://localhost:27017"),
            (ENV_DATABASE, "app"),
        ]))
        .unwrap();
        assert_eq!(
            config,
            StoreConfig::new(Provider::MongoDb, "mongodb://localhost:27017").with_database("app")
        );

        let config = StoreConfig::from_lookup(lookup_from(&[
            (ENV_PROVIDER, "litedb"),
            (ENV_CONNECTION, "data.redb"),
            (ENV_DATABASE, ""),
        ]))
        .unwrap();
        assert_eq!(config.provider, Provider::Redb);
        assert_eq!(config.database, None);
    }

    #[test]
    fn test_config_from_lookup_errors() {
        let err = StoreConfig::from_lookup(lookup_from(&[(ENV_CONNECTION, "x")])).unwrap_err();
        assert_eq!(err.to_string(), "OPENSCHEMA_PROVIDER is not set");

        let err = StoreConfig::from_lookup(lookup_from(&[(ENV_PROVIDER, "sqlite")])).unwrap_err();
        assert_eq!(err.to_string(), "OPENSCHEMA_CONNECTION is not set");

        let err = StoreConfig::from_lookup(lookup_from(&[
            (ENV_PROVIDER, "cassandra"),
            (ENV_CONNECTION, "x"),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported provider: cassandra");
    }
}
