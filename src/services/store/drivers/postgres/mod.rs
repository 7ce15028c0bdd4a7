//! PostgreSQL store driver implementation.
//!
//! This module provides a PostgreSQL driver that implements the
//! `DocumentStore` trait using SQLx. Records live in a `JSONB` column and
//! field lookups use the `->>` text extraction operator.
//!
//! # Example
//!
//! ```ignore
//! use openschema::services::store::drivers::PostgresStore;
//!
//! let store = PostgresStore::open(
//!     "Host=localhost;Port=5432;Username=postgres;Password=secret;Database=app",
//! )
//! .await?;
//! ```

mod options;
mod store;

pub use store::PostgresStore;
