//! Document storage over interchangeable backends.
//!
//! - `traits`: the `DocumentStore` trait, `Record` and provider types
//! - `drivers`: one driver per provider plus the `StoreFactory`
//! - `blocking`: synchronous wrapper for callers outside an executor

pub mod blocking;
pub mod drivers;
pub mod traits;

#[cfg(test)]
mod testing;

pub use blocking::BlockingStore;
pub use drivers::{MongoStore, PostgresStore, RedbStore, RedisStore, SqliteStore, StoreFactory};
pub use traits::{
    generate_identifier, is_identifier_field, validate_collection_name, BoxedStore, DocumentStore,
    Provider, Record, StoreConfig, IDENTIFIER_FIELD,
};
