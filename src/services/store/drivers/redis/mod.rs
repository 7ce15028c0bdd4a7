//! Redis store driver implementation.
//!
//! # Example
//!
//! ```ignore
//! use openschema::services::store::drivers::RedisStore;
//!
//! let store = RedisStore::open("localhost:6379").await?;
//! let people = store.get_all("People").await?;
//! ```

mod store;

pub use store::RedisStore;
