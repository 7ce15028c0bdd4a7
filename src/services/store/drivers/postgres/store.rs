//! PostgreSQL store implementation.
//!
//! This module implements the `DocumentStore` trait for PostgreSQL
//! using SQLx's PgPool.

use anyhow::{anyhow, Result};
use async_lock::RwLock;
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

use super::super::sql::{Dialect, JsonTable};
use super::options::build_connect_options;
use crate::services::store::traits::{
    is_identifier_field, BoxedStore, DocumentStore, Provider, Record,
};

/// PostgreSQL store with one JSONB table per collection.
pub struct PostgresStore {
    pool: RwLock<Option<PgPool>>,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

impl PostgresStore {
    /// Connect using a URL or `Host=...;Port=...` connection string.
    pub async fn open(connection: &str) -> Result<Self> {
        let options = build_connect_options(connection)?;

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;
        tracing::info!("Opened PostgreSQL store");

        Ok(Self {
            pool: RwLock::new(Some(pool)),
        })
    }

    /// Open a store and box it (for factory use).
    pub async fn boxed(connection: &str) -> Result<BoxedStore> {
        Ok(Box::new(Self::open(connection).await?))
    }

    /// Get a handle to the connection pool.
    ///
    /// Returns an error if the store has been closed.
    async fn get_pool(&self) -> Result<PgPool> {
        let guard = self.pool.read().await;
        guard
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow!("Store is closed"))
    }

    /// Pool plus table statements, with the table created if missing.
    async fn prepare(&self, collection: &str) -> Result<(PgPool, JsonTable)> {
        let table = JsonTable::new(Dialect::Postgres, collection)?;
        let pool = self.get_pool().await?;
        sqlx::query(&table.create_table()).execute(&pool).await?;
        Ok((pool, table))
    }

    /// Resolve `field`/`value` to a primary key.
    async fn locate_id(
        pool: &PgPool,
        table: &JsonTable,
        field: &str,
        value: &str,
    ) -> Result<Option<String>> {
        if is_identifier_field(field) {
            let found: Option<String> = sqlx::query_scalar(&table.select_by_id())
                .bind(value)
                .fetch_optional(pool)
                .await?;
            return Ok(found.map(|_| value.to_string()));
        }

        let id = sqlx::query_scalar(&table.select_id_by_field())
            .bind(field)
            .bind(value)
            .fetch_optional(pool)
            .await?;
        Ok(id)
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    fn provider(&self) -> Provider {
        Provider::Postgres
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Record>> {
        let (pool, table) = self.prepare(collection).await?;

        let rows: Vec<String> = sqlx::query_scalar(&table.select_all())
            .fetch_all(&pool)
            .await?;

        rows.iter().map(|json| Record::from_json_str(json)).collect()
    }

    async fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>> {
        let (pool, table) = self.prepare(collection).await?;

        tracing::debug!("postgres get_by_field {}.{} = {}", collection, field, value);
        let row: Option<String> = if is_identifier_field(field) {
            sqlx::query_scalar(&table.select_by_id())
                .bind(value)
                .fetch_optional(&pool)
                .await?
        } else {
            sqlx::query_scalar(&table.select_by_field())
                .bind(field)
                .bind(value)
                .fetch_optional(&pool)
                .await?
        };

        row.map(|json| Record::from_json_str(&json)).transpose()
    }

    async fn insert(&self, collection: &str, record: Record) -> Result<bool> {
        let (pool, table) = self.prepare(collection).await?;
        let (id, record) = record.ensure_identifier();
        let json = record.to_json_string()?;

        tracing::debug!("postgres insert {} into {}", id, collection);
        let result = sqlx::query(&table.insert())
            .bind(&id)
            .bind(&json)
            .execute(&pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        record: Record,
    ) -> Result<bool> {
        let (pool, table) = self.prepare(collection).await?;

        let Some(id) = Self::locate_id(&pool, &table, field, value).await? else {
            tracing::debug!("postgres update found no match for {}.{}", collection, field);
            return Ok(false);
        };

        let json = record.with_identifier(&id).to_json_string()?;
        let result = sqlx::query(&table.update_by_id())
            .bind(&json)
            .bind(&id)
            .execute(&pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, field: &str, value: &str) -> Result<bool> {
        let (pool, table) = self.prepare(collection).await?;

        let Some(id) = Self::locate_id(&pool, &table, field, value).await? else {
            return Ok(false);
        };

        let result = sqlx::query(&table.delete_by_id())
            .bind(&id)
            .execute(&pool)
            .await?;
        tracing::debug!("postgres delete {} from {}", id, collection);
        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.pool.write().await;
        if let Some(pool) = guard.take() {
            pool.close().await;
            tracing::info!("Closed PostgreSQL store");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::testing;

    /// Server address for the live tests, e.g. `postgres://postgres:pw@localhost/openschema`.
    fn test_url() -> String {
        std::env::var("OPENSCHEMA_TEST_POSTGRES")
            .expect("set OPENSCHEMA_TEST_POSTGRES to run PostgreSQL tests")
    }

    fn unique_prefix() -> String {
        format!("pg_{}", &uuid::Uuid::new_v4().simple().to_string()[..8])
    }

    #[test]
    fn test_open_rejects_malformed_connection_string() {
        let result = smol::block_on(PostgresStore::open("Host=localhost;Port=oops"));
        assert!(result.is_err());
    }

    #[test]
    #[ignore = "requires a PostgreSQL server"]
    fn test_postgres_full_suite() {
        smol::block_on(async {
            let store = PostgresStore::open(&test_url()).await.unwrap();
            testing::full_suite(&store, &unique_prefix()).await;
            store.close().await.unwrap();
        });
    }

    #[test]
    #[ignore = "requires a PostgreSQL server"]
    fn test_postgres_matches_numbers_as_text() {
        smol::block_on(async {
            let store = PostgresStore::open(&test_url()).await.unwrap();
            let collection = unique_prefix();
            let rec = testing::record(serde_json::json!({"Id": "1", "Age": 30}));
            store.insert(&collection, rec.clone()).await.unwrap();
            assert_eq!(store.get_by_field(&collection, "Age", "30").await.unwrap(), Some(rec));
            store.close().await.unwrap();
        });
    }
}
