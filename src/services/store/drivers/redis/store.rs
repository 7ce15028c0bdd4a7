//! Redis store implementation.
//!
//! Records are JSON strings under `<collection>:<id>` keys. Every lookup
//! walks the collection's keys with `SCAN`, so cost grows with the
//! collection size.

use anyhow::Result;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::services::store::traits::{
    validate_collection_name, BoxedStore, DocumentStore, Provider, Record,
};

const SCAN_BATCH: usize = 100;

/// Turn a bare `host[:port]` into a `redis://` URL.
pub(crate) fn normalize_url(connection: &str) -> String {
    let connection = connection.trim();
    if connection.contains("://") {
        connection.to_string()
    } else {
        format!("redis://{connection}")
    }
}

pub(crate) fn record_key(collection: &str, id: &str) -> String {
    format!("{collection}:{id}")
}

pub(crate) fn key_pattern(collection: &str) -> String {
    format!("{collection}:*")
}

/// Identifier part of a `<collection>:<id>` key.
pub(crate) fn key_identifier<'a>(collection: &str, key: &'a str) -> Option<&'a str> {
    key.strip_prefix(collection)?.strip_prefix(':')
}

/// Store backed by a Redis server.
#[derive(Clone)]
pub struct RedisStore {
    url: String,
    connection: MultiplexedConnection,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("url", &self.url)
            .field("connection", &"<MultiplexedConnection>")
            .finish()
    }
}

impl RedisStore {
    /// Connect to a `redis://` URL or a bare `host[:port]`.
    pub async fn open(connection: &str) -> Result<Self> {
        let url = normalize_url(connection);
        let client = redis::Client::open(url.as_str())?;
        let connection = client.get_multiplexed_async_connection().await?;
        tracing::info!("Opened Redis store at {}", client.get_connection_info().addr);

        Ok(Self { url, connection })
    }

    /// Open a store and box it (for factory use).
    pub async fn boxed(connection: &str) -> Result<BoxedStore> {
        Ok(Box::new(Self::open(connection).await?))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn scan_keys(&self, collection: &str) -> Result<Vec<String>> {
        let mut con = self.connection.clone();
        let pattern = key_pattern(collection);
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut con)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        // SCAN may return a key more than once.
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    /// Every `(key, record)` pair in the collection.
    async fn entries(&self, collection: &str) -> Result<Vec<(String, Record)>> {
        let mut con = self.connection.clone();
        let mut entries = Vec::new();

        for key in self.scan_keys(collection).await? {
            let json: Option<String> = con.get(&key).await?;
            // Removed between SCAN and GET.
            let Some(json) = json else { continue };
            entries.push((key, Record::from_json_str(&json)?));
        }
        Ok(entries)
    }

    async fn locate(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<(String, Record)>> {
        let entries = self.entries(collection).await?;
        Ok(entries.into_iter().find(|(_, record)| record.matches(field, value)))
    }
}

#[async_trait]
impl DocumentStore for RedisStore {
    fn provider(&self) -> Provider {
        Provider::Redis
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Record>> {
        let collection = validate_collection_name(collection)?;
        let entries = self.entries(collection).await?;
        Ok(entries.into_iter().map(|(_, record)| record).collect())
    }

    async fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>> {
        let collection = validate_collection_name(collection)?;

        tracing::debug!("redis get_by_field {}.{} = {}", collection, field, value);
        Ok(self
            .locate(collection, field, value)
            .await?
            .map(|(_, record)| record))
    }

    async fn insert(&self, collection: &str, record: Record) -> Result<bool> {
        let collection = validate_collection_name(collection)?;
        let (id, record) = record.ensure_identifier();
        let key = record_key(collection, &id);

        let mut con = self.connection.clone();
        let () = con.set(&key, record.to_json_string()?).await?;
        tracing::debug!("redis insert {}", key);
        Ok(true)
    }

    async fn update(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        record: Record,
    ) -> Result<bool> {
        let collection = validate_collection_name(collection)?;
        let Some((key, _)) = self.locate(collection, field, value).await? else {
            tracing::debug!("redis update found no match for {}.{}", collection, field);
            return Ok(false);
        };

        let record = match key_identifier(collection, &key) {
            Some(id) => record.with_identifier(id),
            None => record,
        };
        let mut con = self.connection.clone();
        let () = con.set(&key, record.to_json_string()?).await?;
        tracing::debug!("redis update {}", key);
        Ok(true)
    }

    async fn delete(&self, collection: &str, field: &str, value: &str) -> Result<bool> {
        let collection = validate_collection_name(collection)?;
        let Some((key, _)) = self.locate(collection, field, value).await? else {
            return Ok(false);
        };

        let mut con = self.connection.clone();
        let removed: usize = con.del(&key).await?;
        tracing::debug!("redis delete {} removed {}", key, removed);
        Ok(removed > 0)
    }
}
