//! MongoDB store implementation.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::Document;
use mongodb::{Client, Collection, Database};

use super::convert::{document_to_record, field_filter, insert_document, pinned_replacement};
use crate::services::store::traits::{
    validate_collection_name, BoxedStore, DocumentStore, Provider, Record,
};

/// Store backed by a MongoDB database.
///
/// The client is shared across calls; the driver pools connections itself.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Connect to `uri` and select `database`, or the URI's default database.
    pub async fn open(uri: &str, database: Option<&str>) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;

        let database = match database {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .ok_or_else(|| anyhow!("MongoDB requires a database name"))?,
        };
        tracing::info!("Opened MongoDB store on database {}", database.name());

        Ok(Self { client, database })
    }

    /// Open a store and box it (for factory use).
    pub async fn boxed(uri: &str, database: Option<&str>) -> Result<BoxedStore> {
        Ok(Box::new(Self::open(uri, database).await?))
    }

    /// Underlying driver client, for operations outside the CRUD surface.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database_name(&self) -> &str {
        self.database.name()
    }

    fn collection(&self, name: &str) -> Result<Collection<Document>> {
        let name = validate_collection_name(name)?;
        Ok(self.database.collection::<Document>(name))
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn provider(&self) -> Provider {
        Provider::MongoDb
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Record>> {
        let coll = self.collection(collection)?;
        let documents: Vec<Document> = coll.find(None, None).await?.try_collect().await?;

        documents.into_iter().map(document_to_record).collect()
    }

    async fn get_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<Record>> {
        let coll = self.collection(collection)?;
        let Some(filter) = field_filter(field, value) else {
            tracing::debug!("mongodb get_by_field refused field name {:?}", field);
            return Ok(None);
        };

        tracing::debug!("mongodb get_by_field {} {}", collection, filter);
        coll.find_one(filter, None)
            .await?
            .map(document_to_record)
            .transpose()
    }

    async fn insert(&self, collection: &str, record: Record) -> Result<bool> {
        let coll = self.collection(collection)?;
        let document = insert_document(&record)?;

        let result = coll.insert_one(document, None).await?;
        tracing::debug!("mongodb insert {} into {}", result.inserted_id, collection);
        Ok(true)
    }

    async fn update(
        &self,
        collection: &str,
        field: &str,
        value: &str,
        record: Record,
    ) -> Result<bool> {
        let coll = self.collection(collection)?;
        let Some(filter) = field_filter(field, value) else {
            return Ok(false);
        };
        let Some(existing) = coll.find_one(filter, None).await? else {
            tracing::debug!("mongodb update found no match for {}.{}", collection, field);
            return Ok(false);
        };

        let (filter, replacement) = pinned_replacement(existing, record)?;
        let result = coll.replace_one(filter, replacement, None).await?;
        tracing::debug!(
            "mongodb update matched {} modified {}",
            result.matched_count,
            result.modified_count
        );
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, collection: &str, field: &str, value: &str) -> Result<bool> {
        let coll = self.collection(collection)?;
        let Some(filter) = field_filter(field, value) else {
            return Ok(false);
        };

        let result = coll.delete_one(filter, None).await?;
        tracing::debug!("mongodb delete removed {}", result.deleted_count);
        Ok(result.deleted_count > 0)
    }
}
