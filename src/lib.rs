//! Uniform create/read/update/delete access to schemaless records stored in
//! redb, MongoDB, Redis, PostgreSQL or SQLite.
//!
//! ```ignore
//! use openschema::{Record, StoreFactory};
//!
//! let store = StoreFactory::open("redis", "localhost:6379", None).await?;
//! store.insert("People", Record::from_value(serde_json::json!({"Name": "Alice"}))?).await?;
//! ```

pub mod services;

pub use services::store::{
    BlockingStore, BoxedStore, DocumentStore, MongoStore, PostgresStore, Provider, Record,
    RedbStore, RedisStore, SqliteStore, StoreConfig, StoreFactory,
};
