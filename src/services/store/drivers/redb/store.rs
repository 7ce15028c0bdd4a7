//! redb document store implementation.
//!
//! Each collection is a redb table mapping the record identifier to the
//! record's JSON text. redb is synchronous, so every operation runs on
//! `smol::unblock`.

use anyhow::{anyhow, bail, Result};
use async_lock::RwLock;
use async_trait::async_trait;
use redb::{Database, ReadableTable, TableDefinition, TableError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::services::store::traits::{
    is_identifier_field, validate_collection_name, BoxedStore, DocumentStore, Provider, Record,
};

fn table(collection: &str) -> TableDefinition<'_, &'static str, &'static str> {
    TableDefinition::new(collection)
}

/// Embedded document store backed by a single redb file.
pub struct RedbStore {
    path: PathBuf,
    db: RwLock<Option<Arc<Database>>>,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("path", &self.path)
            .field("db", &"<Database>")
            .finish()
    }
}

impl RedbStore {
    /// Open (or create) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.as_os_str().is_empty() {
            bail!("redb requires a database file path");
        }

        let open_path = path.clone();
        let db = smol::unblock(move || Database::create(&open_path)).await?;
        tracing::info!("Opened redb store at {}", path.display());

        Ok(Self {
            path,
            db: RwLock::new(Some(Arc::new(db))),
        })
    }

    /// Open a store and box it (for factory use).
    pub async fn boxed(path: impl AsRef<Path>) -> Result<BoxedStore> {
        Ok(Box::new(Self::open(path).await?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn get_db(&self) -> Result<Arc<Database>> {
        let guard = self.db.read().await;
        guard
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow!("Store is closed"))
    }

    fn read_all(db: &Database, collection: &str) -> Result<Vec<(String, Record)>> {
        let txn = db.begin_read()?;
        let table = match txn.open_table(table(collection)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            records.push((key.value().to_string(), Record::from_json_str(value.value())?));
        }
        Ok(records)
    }

    fn read_one(db: &Database, collection: &str, id: &str) -> Result<Option<Record>> {
        let txn = db.begin_read()?;
        let table = match txn.open_table(table(collection)) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match table.get(id)? {
            Some(value) => Ok(Some(Record::from_json_str(value.value())?)),
            None => Ok(None),
        }
    }

    /// Resolve `field`/`value` to the stored key and record.
    ///
    /// Identifier lookups go straight to the key; anything else scans the
    /// table and compares the materialized field.
    fn locate(
        db: &Database,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<(String, Record)>> {
        if is_identifier_field(field) {
            return Ok(Self::read_one(db, collection, value)?.map(|r| (value.to_string(), r)));
        }
        Ok(Self::read_all(db, collection)?
            .into_iter()
            .find(|(_, record)| record.matches(field, value)))
    }

    fn write_new(db: &Database, collection: &str, id: &str, json: &str) -> Result<()> {
        let txn = db.begin_write()?;
        {
            let mut table = txn.open_table(table(collection))?;
            if table.get(id)?.is_some() {
                bail!("Record with Id '{}' already exists in '{}'", id, collection);
            }
            table.insert(id, json)?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Overwrite an existing key. Returns false when the key is gone.
    fn replace(db: &Database, collection: &str, id: &str, json: &str) -> Result<bool> {
        let txn = db.begin_write()?;
        let replaced = {
            let mut table = txn.open_table(table(collection))?;
            if table.get(id)?.is_none() {
                false
            } else {
                table.insert(id, json)?;
                true
            }
        };
        txn.commit()?;
        Ok(replaced)
    }

    fn remove(db: &Database, collection: &str, id: &str) -> Result<bool> {
        let txn = db.begin_write()?;
        let removed = {
            let mut table = match txn.open_table(table(collection)) {
                Ok(table) => table,
                Err(TableError::TableDoesNotExist(_)) => return Ok(false),
                Err(e) => return Err(e.into()),
            };
            let removed = table.remove(id)?.is_some();
            removed
        };
        txn.commit()?;
        Ok(removed)
    }
}

#[async_trait]
impl DocumentStore for RedbStore {
    fn provider(&self) -> Provider {
        Provider::Redb
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Record>> {
        let collection = validate_collection_name(collection)?.to_string();
        let db = self.get_db().await?;

        let records = smol::unblock(move || Self::read_all(&db, &collection)).await?;
        Ok(records.into_iter().map(|(_, record)| record).collect())
    }

    async fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>> {
        let collection = validate_collection_name(collection)?.to_string();
        let db = self.get_db().await?;
        let (field, value) = (field.to_string(), value.to_string());

        tracing::debug!("redb get_by_field {}.{} = {}", collection, field, value);
        let found = smol::unblock(move || Self::locate(&db, &collection, &field, &value)).await?;
        Ok(found.map(|(_, record)| record))
    }

    async fn insert(&self, collection: &str, record: Record) -> Result<bool> {
        let collection = validate_collection_name(collection)?.to_string();
        let db = self.get_db().await?;

        let (id, record) = record.ensure_identifier();
        let json = record.to_json_string()?;

        tracing::debug!("redb insert {} into {}", id, collection);
        smol::unblock(move || Self::write_new(&db, &collection, &id, &json)).await?;
        Ok(true)
    }

    async fn update(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        record: Record,
    ) -> Result<bool> {
        let collection = validate_collection_name(collection)?.to_string();
        let db = self.get_db().await?;
        let (field, value) = (field.to_string(), value.to_string());

        let updated = smol::unblock(move || -> Result<bool> {
            let Some((id, _)) = Self::locate(&db, &collection, &field, &value)? else {
                return Ok(false);
            };
            let json = record.with_identifier(&id).to_json_string()?;
            Self::replace(&db, &collection, &id, &json)
        })
        .await?;

        tracing::debug!("redb update matched: {}", updated);
        Ok(updated)
    }

    async fn delete(&self, collection: &str, field: &str, value: &str) -> Result<bool> {
        let collection = validate_collection_name(collection)?.to_string();
        let db = self.get_db().await?;
        let (field, value) = (field.to_string(), value.to_string());

        let deleted = smol::unblock(move || -> Result<bool> {
            if is_identifier_field(&field) {
                return Self::remove(&db, &collection, &value);
            }
            match Self::locate(&db, &collection, &field, &value)? {
                Some((id, _)) => Self::remove(&db, &collection, &id),
                None => Ok(false),
            }
        })
        .await?;

        tracing::debug!("redb delete matched: {}", deleted);
        Ok(deleted)
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.db.write().await;
        if guard.take().is_some() {
            tracing::info!("Closed redb store at {}", self.path.display());
        }
        Ok(())
    }
}
