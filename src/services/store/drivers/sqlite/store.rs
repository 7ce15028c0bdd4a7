//! SQLite store implementation.
//!
//! This module implements the `DocumentStore` trait for SQLite using a single
//! SQLx connection held for the lifetime of the store.

use anyhow::{anyhow, bail, Result};
use async_lock::Mutex;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use std::str::FromStr;

use super::super::sql::{Dialect, JsonTable};
use crate::services::store::traits::{
    is_identifier_field, BoxedStore, DocumentStore, Provider, Record,
};

/// Embedded SQLite store.
///
/// Every collection is a table with an `Id` primary key and a JSON `Data`
/// column. Field lookups go through `json_each`; identifier lookups use
/// the primary key.
pub struct SqliteStore {
    location: String,
    connection: Mutex<Option<SqliteConnection>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("location", &self.location)
            .field("connection", &"<SqliteConnection>")
            .finish()
    }
}

/// Extract the database location from a connection string.
///
/// Accepts a bare path, `:memory:`, a `sqlite:` URL, or a
/// `Data Source=<path>` pair among `;`-separated options.
fn database_location(connection: &str) -> &str {
    let trimmed = connection.trim();
    trimmed
        .split(';')
        .find_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("data source")
                .then(|| value.trim())
        })
        .unwrap_or(trimmed)
}

/// Build SqliteConnectOptions from a connection string.
fn build_connect_options(connection: &str) -> Result<SqliteConnectOptions> {
    let location = database_location(connection);
    if location.is_empty() {
        bail!("SQLite requires a database path or :memory:");
    }

    if location == ":memory:" {
        return Ok(SqliteConnectOptions::from_str("sqlite::memory:")?);
    }
    if location.starts_with("sqlite:") {
        return Ok(SqliteConnectOptions::from_str(location)?.create_if_missing(true));
    }

    Ok(SqliteConnectOptions::new()
        .filename(location)
        .create_if_missing(true))
}

impl SqliteStore {
    /// Open the database named by `connection`, creating the file if needed.
    pub async fn open(connection: &str) -> Result<Self> {
        let options = build_connect_options(connection)?;
        let conn = SqliteConnection::connect_with(&options).await?;

        let location = database_location(connection).to_string();
        tracing::info!("Opened SQLite store at {}", location);

        Ok(Self {
            location,
            connection: Mutex::new(Some(conn)),
        })
    }

    /// Open a store and box it (for factory use).
    pub async fn boxed(connection: &str) -> Result<BoxedStore> {
        Ok(Box::new(Self::open(connection).await?))
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    async fn ensure_table(conn: &mut SqliteConnection, table: &JsonTable) -> Result<()> {
        sqlx::query(&table.create_table()).execute(&mut *conn).await?;
        Ok(())
    }

    /// Resolve `field`/`value` to a primary key.
    async fn locate_id(
        conn: &mut SqliteConnection,
        table: &JsonTable,
        field: &str,
        value: &str,
    ) -> Result<Option<String>> {
        if is_identifier_field(field) {
            let found: Option<String> = sqlx::query_scalar(&table.select_by_id())
                .bind(value)
                .fetch_optional(&mut *conn)
                .await?;
            return Ok(found.map(|_| value.to_string()));
        }

        let id = sqlx::query_scalar(&table.select_id_by_field())
            .bind(field)
            .bind(value)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(id)
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn provider(&self) -> Provider {
        Provider::Sqlite
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Record>> {
        let table = JsonTable::new(Dialect::Sqlite, collection)?;
        let mut guard = self.connection.lock().await;
        let conn = guard.as_mut().ok_or_else(|| anyhow!("Store is closed"))?;
        Self::ensure_table(conn, &table).await?;

        let rows: Vec<String> = sqlx::query_scalar(&table.select_all())
            .fetch_all(&mut *conn)
            .await?;

        rows.iter().map(|json| Record::from_json_str(json)).collect()
    }

    async fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>> {
        let table = JsonTable::new(Dialect::Sqlite, collection)?;
        let mut guard = self.connection.lock().await;
        let conn = guard.as_mut().ok_or_else(|| anyhow!("Store is closed"))?;
        Self::ensure_table(conn, &table).await?;

        tracing::debug!("sqlite get_by_field {}.{} = {}", collection, field, value);
        let row: Option<String> = if is_identifier_field(field) {
            sqlx::query_scalar(&table.select_by_id())
                .bind(value)
                .fetch_optional(&mut *conn)
                .await?
        } else {
            sqlx::query_scalar(&table.select_by_field())
                .bind(field)
                .bind(value)
                .fetch_optional(&mut *conn)
                .await?
        };

        row.map(|json| Record::from_json_str(&json)).transpose()
    }

    async fn insert(&self, collection: &str, record: Record) -> Result<bool> {
        let table = JsonTable::new(Dialect::Sqlite, collection)?;
        let (id, record) = record.ensure_identifier();
        let json = record.to_json_string()?;

        let mut guard = self.connection.lock().await;
        let conn = guard.as_mut().ok_or_else(|| anyhow!("Store is closed"))?;
        Self::ensure_table(conn, &table).await?;

        tracing::debug!("sqlite insert {} into {}", id, collection);
        let result = sqlx::query(&table.insert())
            .bind(&id)
            .bind(&json)
            .execute(&mut *conn)
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
        let table = JsonTable::new(Dialect::Sqlite, collection)?;
        let mut guard = self.connection.lock().await;
        let conn = guard.as_mut().ok_or_else(|| anyhow!("Store is closed"))?;
        Self::ensure_table(conn, &table).await?;

        let Some(id) = Self::locate_id(conn, &table, field, value).await? else {
            tracing::debug!("sqlite update found no match for {}.{}", collection, field);
            return Ok(false);
        };

        let json = record.with_identifier(&id).to_json_string()?;
        let result = sqlx::query(&table.update_by_id())
            .bind(&json)
            .bind(&id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, field: &str, value: &str) -> Result<bool> {
        let table = JsonTable::new(Dialect::Sqlite, collection)?;
        let mut guard = self.connection.lock().await;
        let conn = guard.as_mut().ok_or_else(|| anyhow!("Store is closed"))?;
        Self::ensure_table(conn, &table).await?;

        let Some(id) = Self::locate_id(conn, &table, field, value).await? else {
            return Ok(false);
        };

        let result = sqlx::query(&table.delete_by_id())
            .bind(&id)
            .execute(&mut *conn)
            .await?;
        tracing::debug!("sqlite delete {} from {}", id, collection);
        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.connection.lock().await;
        if let Some(conn) = guard.take() {
            conn.close().await?;
            tracing::info!("Closed SQLite store at {}", self.location);
        }
        Ok(())
    }
}
