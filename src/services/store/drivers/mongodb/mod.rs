//! MongoDB store driver implementation.
//!
//! Records are stored as BSON documents, one MongoDB collection per
//! collection name. Identifier lookups use `_id` when the value is a valid
//! `ObjectId` and fall back to the literal `"Id"` field otherwise.
//!
//! # Example
//!
//! ```ignore
//! use openschema::services::store::drivers::MongoStore;
//!
//! let store = MongoStore::open("mongodb://localhost:27017", Some("app")).await?;
//! let people = store.get_all("People").await?;
//! ```

mod convert;
mod store;

pub use store::MongoStore;
