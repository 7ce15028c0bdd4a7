//! SQL statement generation for the JSON-column drivers.
//!
//! PostgreSQL and SQLite share one physical layout per collection: a table
//! named after the collection with an `"Id" TEXT PRIMARY KEY` column and a
//! `"Data"` column holding the whole record as JSON. Only the table name is
//! spliced into the SQL, after passing the collection allow-list; field names
//! and values are always bound parameters.

use anyhow::Result;

use crate::services::store::traits::validate_collection_name;

/// SQL flavour of a JSON-column driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Placeholder for the n-th bound parameter (1-based)
    fn param(&self, n: usize) -> String {
        match self {
            Self::Postgres => format!("${}", n),
            Self::Sqlite => format!("?{}", n),
        }
    }

    /// Type of the data column
    fn data_type(&self) -> &'static str {
        match self {
            Self::Postgres => "JSONB",
            Self::Sqlite => "TEXT",
        }
    }

    /// Data column as it is read back (always text)
    fn data_select(&self) -> &'static str {
        match self {
            Self::Postgres => "\"Data\"::text",
            Self::Sqlite => "\"Data\"",
        }
    }

    /// Data column value as it is written
    fn data_value(&self, n: usize) -> String {
        match self {
            Self::Postgres => format!("{}::jsonb", self.param(n)),
            Self::Sqlite => self.param(n),
        }
    }

    /// Text form of a top-level field of the data column, compared with `value`.
    ///
    /// Both dialects take the field name as a plain bound key, never as a
    /// path, so any name (dots, quotes, `$`) addresses exactly that key.
    fn field_predicate(&self, field: usize, value: usize) -> String {
        match self {
            Self::Postgres => format!("\"Data\"->>{} = {}", self.param(field), self.param(value)),
            Self::Sqlite => format!(
                "EXISTS (SELECT 1 FROM json_each(\"Data\") AS f WHERE f.key = {} AND CAST(f.value AS TEXT) = {})",
                self.param(field),
                self.param(value)
            ),
        }
    }
}

/// Statements for one collection's table
#[derive(Debug, Clone)]
pub(crate) struct JsonTable {
    dialect: Dialect,
    table: String,
}

impl JsonTable {
    /// Validate the collection name and quote it as a table identifier.
    pub(crate) fn new(dialect: Dialect, collection: &str) -> Result<Self> {
        let name = validate_collection_name(collection)?;
        Ok(Self {
            dialect,
            table: format!("\"{}\"", name),
        })
    }

    pub(crate) fn create_table(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\"Id\" TEXT PRIMARY KEY, \"Data\" {} NOT NULL)",
            self.table,
            self.dialect.data_type()
        )
    }

    pub(crate) fn select_all(&self) -> String {
        format!("SELECT {} FROM {}", self.dialect.data_select(), self.table)
    }

    /// Params: id
    pub(crate) fn select_by_id(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE \"Id\" = {}",
            self.dialect.data_select(),
            self.table,
            self.dialect.param(1)
        )
    }

    /// Params: field argument, value
    pub(crate) fn select_by_field(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE {} LIMIT 1",
            self.dialect.data_select(),
            self.table,
            self.dialect.field_predicate(1, 2)
        )
    }

    /// Params: field argument, value
    pub(crate) fn select_id_by_field(&self) -> String {
        format!(
            "SELECT \"Id\" FROM {} WHERE {} LIMIT 1",
            self.table,
            self.dialect.field_predicate(1, 2)
        )
    }

    /// Params: id, data
    pub(crate) fn insert(&self) -> String {
        format!(
            "INSERT INTO {} (\"Id\", \"Data\") VALUES ({}, {})",
            self.table,
            self.dialect.param(1),
            self.dialect.data_value(2)
        )
    }

    /// Params: data, id
    pub(crate) fn update_by_id(&self) -> String {
        format!(
            "UPDATE {} SET \"Data\" = {} WHERE \"Id\" = {}",
            self.table,
            self.dialect.data_value(1),
            self.dialect.param(2)
        )
    }

    /// Params: id
    pub(crate) fn delete_by_id(&self) -> String {
        format!(
            "DELETE FROM {} WHERE \"Id\" = {}",
            self.table,
            self.dialect.param(1)
        )
    }
}
