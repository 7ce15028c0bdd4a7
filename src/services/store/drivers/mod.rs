//! Store driver implementations.
//!
//! This module contains driver implementations for each provider:
//!
//! - **redb**: Embedded document store, one table per collection
//! - **MongoDB**: Managed document database via the official driver
//! - **Redis**: Key/value store, records under `<collection>:<id>` keys
//! - **PostgreSQL**: JSONB column per table via SQLx
//! - **SQLite**: Embedded JSON-in-TEXT table via SQLx
//!
//! Each driver implements the `DocumentStore` trait.

mod factory;
mod sql;

pub mod mongodb;
pub mod postgres;
pub mod redb;
pub mod redis;
pub mod sqlite;

pub use factory::StoreFactory;

pub use self::mongodb::MongoStore;
pub use self::postgres::PostgresStore;
pub use self::redb::RedbStore;
pub use self::redis::RedisStore;
pub use self::sqlite::SqliteStore;
