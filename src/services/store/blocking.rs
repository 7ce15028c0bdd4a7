//! Synchronous wrapper over a boxed store.
//!
//! Every call is driven to completion on the current thread with
//! `smol::block_on`. Do not use it from inside an async task.

use anyhow::Result;

use super::drivers::StoreFactory;
use super::traits::{BoxedStore, Provider, Record, StoreConfig};

/// Blocking handle to a `DocumentStore`.
pub struct BlockingStore {
    inner: BoxedStore,
}

impl std::fmt::Debug for BlockingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingStore")
            .field("provider", &self.inner.provider())
            .finish()
    }
}

impl BlockingStore {
    pub fn new(inner: BoxedStore) -> Self {
        Self { inner }
    }

    /// Open a store by provider name, as `StoreFactory::open` does.
    pub fn open(provider: &str, connection: &str, database: Option<&str>) -> Result<Self> {
        let inner = smol::block_on(StoreFactory::open(provider, connection, database))?;
        Ok(Self::new(inner))
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let inner = smol::block_on(StoreFactory::from_config(config))?;
        Ok(Self::new(inner))
    }

    pub fn provider(&self) -> Provider {
        self.inner.provider()
    }

    pub fn get_all(&self, collection: &str) -> Result<Vec<Record>> {
        smol::block_on(self.inner.get_all(collection))
    }

    pub fn get_by_field(&self, collection: &str, field: &str, value: &str) -> Result<Option<Record>> {
        smol::block_on(self.inner.get_by_field(collection, field, value))
    }

    pub fn insert(&self, collection: &str, record: Record) -> Result<bool> {
        smol::block_on(self.inner.insert(collection, record))
    }

    pub fn update(&self, collection: &str, field: &str, value: &str, record: Record) -> Result<bool> {
        smol::block_on(self.inner.update(collection, field, value, record))
    }

    pub fn delete(&self, collection: &str, field: &str, value: &str) -> Result<bool> {
        smol::block_on(self.inner.delete(collection, field, value))
    }

    pub fn close(&self) -> Result<()> {
        smol::block_on(self.inner.close())
    }

    /// Give back the async store.
    pub fn into_inner(self) -> BoxedStore {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::testing::record;
    use serde_json::json;

    #[test]
    fn test_blocking_round_trip() {
        let store = BlockingStore::open("sqlite", ":memory:", None).unwrap();
        assert_eq!(store.provider(), Provider::Sqlite);

        let alice = record(json!({"Id": "1", "Name": "Alice", "Age": 30}));
        assert!(store.insert("People", alice.clone()).unwrap());
        assert_eq!(store.get_by_field("People", "Id", "1").unwrap(), Some(alice));

        let renamed = record(json!({"Name": "Alicia"}));
        assert!(store.update("People", "Name", "Alice", renamed).unwrap());
        let found = store.get_by_field("People", "Name", "Alicia").unwrap().unwrap();
        assert_eq!(found.identifier().as_deref(), Some("1"));

        assert!(store.delete("People", "Id", "1").unwrap());
        assert!(!store.delete("People", "Id", "1").unwrap());
        assert!(store.get_all("People").unwrap().is_empty());

        store.close().unwrap();
        assert!(store.get_all("People").is_err());
    }

    #[test]
    fn test_open_unknown_provider_fails() {
        assert!(BlockingStore::open("oracle", "whatever", None).is_err());
    }
}
