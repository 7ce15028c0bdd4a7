//! Store factory for opening backend stores.
//!
//! The factory picks the driver from a provider name or `Provider` value
//! and hands back a boxed `DocumentStore`.

use anyhow::{anyhow, Result};

use super::mongodb::MongoStore;
use super::postgres::PostgresStore;
use super::redb::RedbStore;
use super::redis::RedisStore;
use super::sqlite::SqliteStore;
use crate::services::store::traits::{BoxedStore, Provider, StoreConfig};

/// Factory for creating stores based on a provider name.
///
/// # Example
///
/// ```ignore
/// use openschema::StoreFactory;
///
/// let store = StoreFactory::open("SQLite", "Data Source=app.db", None).await?;
/// let people = store.get_all("People").await?;
/// ```
pub struct StoreFactory;

impl StoreFactory {
    /// Open a store for a case-insensitive provider name.
    ///
    /// `database` is only read by MongoDB.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The provider name is not recognised
    /// - The backend cannot be reached or opened
    pub async fn open(
        provider: &str,
        connection: &str,
        database: Option<&str>,
    ) -> Result<BoxedStore> {
        let provider = Provider::from_str(provider)
            .ok_or_else(|| anyhow!("Unsupported provider: {}", provider))?;
        Self::open_provider(provider, connection, database).await
    }

    /// Open a store for an already resolved provider.
    pub async fn open_provider(
        provider: Provider,
        connection: &str,
        database: Option<&str>,
    ) -> Result<BoxedStore> {
        // Server connection strings may carry credentials; only file paths are logged.
        if provider.is_embedded() {
            tracing::debug!("Opening {} store at {}", provider.display_name(), connection);
        } else {
            tracing::debug!("Opening {} store", provider.display_name());
        }
        if database.is_some() && !provider.uses_database_name() {
            tracing::warn!(
                "{} ignores the database name; select it in the connection string",
                provider.display_name()
            );
        }

        match provider {
            Provider::Redb => RedbStore::boxed(connection).await,
            Provider::MongoDb => MongoStore::boxed(connection, database).await,
            Provider::Redis => RedisStore::boxed(connection).await,
            Provider::Postgres => PostgresStore::boxed(connection).await,
            Provider::Sqlite => SqliteStore::boxed(connection).await,
        }
    }

    /// Open a store from a validated configuration.
    pub async fn from_config(config: &StoreConfig) -> Result<BoxedStore> {
        config.validate().map_err(|e| anyhow!(e))?;
        Self::open_provider(
            config.provider,
            &config.connection,
            config.database.as_deref(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::services::store::testing;

    #[test]
    fn test_unsupported_provider() {
        let err = smol::block_on(StoreFactory::open("cassandra", "localhost", None))
            .err()
            .expect("unknown provider must fail");
        assert_eq!(err.to_string(), "Unsupported provider: cassandra");
    }

    #[test]
    fn test_provider_name_is_case_insensitive() {
        smol::block_on(async {
            let store = StoreFactory::open("SQLITEDB", ":memory:", None).await.unwrap();
            assert_eq!(store.provider(), Provider::Sqlite);

            store
                .insert("T", testing::record(json!({"Id": "1", "Name": "Alice"})))
                .await
                .unwrap();
            assert_eq!(store.get_all("T").await.unwrap().len(), 1);
            store.close().await.unwrap();
        });
    }

    #[test]
    fn test_opens_embedded_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("factory.redb");

        smol::block_on(async {
            let store = StoreFactory::open("docstore", path.to_str().unwrap(), None)
                .await
                .unwrap();
            assert_eq!(store.provider(), Provider::Redb);
            testing::crud_scenario(store.as_ref(), "T").await;
            store.close().await.unwrap();
        });
    }

    #[test]
    fn test_litedb_token_opens_embedded_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lite.redb");

        smol::block_on(async {
            let store = StoreFactory::open("litedb", path.to_str().unwrap(), None)
                .await
                .unwrap();
            assert_eq!(store.provider(), Provider::Redb);
            store.close().await.unwrap();
        });
    }

    #[test]
    fn test_database_name_is_ignored_outside_mongodb() {
        smol::block_on(async {
            let store = StoreFactory::open("sqlite", ":memory:", Some("unused"))
                .await
                .unwrap();
            assert!(!store.provider().uses_database_name());
            assert!(store.get_all("T").await.unwrap().is_empty());
            store.close().await.unwrap();
        });
    }

    #[test]
    fn test_from_config_rejects_empty_connection() {
        let config = StoreConfig::new(Provider::Sqlite, "  ");
        let result = smol::block_on(StoreFactory::from_config(&config));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config_opens_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.db");
        let config = StoreConfig::new(Provider::Sqlite, path.to_string_lossy());

        smol::block_on(async {
            let store = StoreFactory::from_config(&config).await.unwrap();
            assert_eq!(store.provider(), Provider::Sqlite);
            assert!(store.get_all("Empty").await.unwrap().is_empty());
            store.close().await.unwrap();
        });
    }
}
