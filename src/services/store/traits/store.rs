//! Core document store trait.
//!
//! This module defines the `DocumentStore` trait that every backend driver
//! implements: four CRUD operations addressed by collection name and, for
//! lookups, a field name/value pair.

use anyhow::Result;
use async_trait::async_trait;

use super::record::Record;
use super::types::Provider;

/// Uniform CRUD interface over a storage backend.
///
/// Field lookups compare by string equality. When the field is `"Id"`
/// (case-insensitive) drivers take their identifier path, which is a key or
/// primary-key lookup wherever the backend offers one.
///
/// # Example
///
/// ```ignore
/// use openschema::{DocumentStore, Record, StoreFactory};
///
/// async fn example() -> anyhow::Result<()> {
///     let store = StoreFactory::open("sqlite", ":memory:", None).await?;
///     let record = Record::from_value(serde_json::json!({"Id": "1", "Name": "Alice"}))?;
///     store.insert("People", record).await?;
///     let alice = store.get_by_field("People", "Name", "Alice").await?;
///     assert!(alice.is_some());
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Get the provider backing this store
    fn provider(&self) -> Provider;

    /// Return every record in the collection.
    ///
    /// Order is whatever the backend yields. A collection that does not
    /// exist yet is empty, not an error.
    async fn get_all(&self, collection: &str) -> Result<Vec<Record>>;

    /// Return the first record whose `field` equals `value`, if any.
    async fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>>;

    /// Persist a new record.
    ///
    /// Records without an identifier get a generated one (MongoDB may assign
    /// its own). The collection is created when missing.
    async fn insert(&self, collection: &str, record: Record) -> Result<bool>;

    /// Replace the content of the record matched by `field`/`value`.
    ///
    /// Returns `false` when nothing matched; there is no upsert.
    async fn update(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        record: Record,
    ) -> Result<bool>;

    /// Remove the record matched by `field`/`value`.
    ///
    /// Returns `false` when nothing matched.
    async fn delete(&self, collection: &str, field: &str, value: &str) -> Result<bool>;

    /// Release the backend handle.
    ///
    /// Stores holding a persistent connection or file handle close it here;
    /// any later call fails. Stores with a shared client have nothing to do.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A boxed document store trait object.
pub type BoxedStore = Box<dyn DocumentStore>;
