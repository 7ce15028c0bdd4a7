//! Storage abstraction traits and types.
//!
//! This module provides a unified interface over the supported backends.
//! It defines:
//!
//! - **Types** (`types`): Provider enum, store configuration, collection name rules
//! - **Record** (`record`): Schemaless record and identifier helpers
//! - **Store** (`store`): The `DocumentStore` CRUD trait
//!
//! # Example
//!
//! ```ignore
//! use openschema::services::store::traits::{Provider, StoreConfig};
//!
//! let config = StoreConfig::new(Provider::MongoDb, "mongodb://localhost:27017")
//!     .with_database("app");
//! ```

pub mod record;
pub mod store;
pub mod types;

pub use record::{generate_identifier, is_identifier_field, Record, IDENTIFIER_FIELD};

pub use store::{BoxedStore, DocumentStore};

pub use types::{validate_collection_name, Provider, StoreConfig};
