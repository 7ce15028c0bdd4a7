//! redb embedded document store driver.
//!
//! Collections are redb tables keyed by record identifier, holding the
//! record as JSON text. Identifier lookups are key lookups; other fields are
//! matched by scanning the table.
//!
//! # Example
//!
//! ```ignore
//! use openschema::services::store::drivers::RedbStore;
//!
//! let store = RedbStore::open("/path/to/data.redb").await?;
//! let people = store.get_all("People").await?;
//! store.close().await?;
//! ```

mod store;

pub use store::RedbStore;
