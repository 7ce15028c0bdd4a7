//! SQLite store driver implementation.
//!
//! This module provides a SQLite driver that implements the `DocumentStore`
//! trait using SQLx.
//!
//! SQLite is a file-based embedded database that supports:
//! - File-based databases (`.db`, `.sqlite`, `.sqlite3`)
//! - In-memory databases (`:memory:`)
//! - `Data Source=<path>` connection strings
//!
//! # Example
//!
//! ```ignore
//! use openschema::services::store::drivers::SqliteStore;
//!
//! let store = SqliteStore::open("/path/to/database.db").await?;
//! let people = store.get_all("People").await?;
//! store.close().await?;
//! ```

mod store;

pub use store::SqliteStore;
