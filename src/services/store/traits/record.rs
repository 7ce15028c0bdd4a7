//! Backend-agnostic record type.
//!
//! This module contains:
//! - `Record` - A schemaless document mapping field names to JSON values
//! - Identifier helpers used by every driver to read, pin and generate `Id`

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Conventional name of the identifier field.
pub const IDENTIFIER_FIELD: &str = "Id";

/// Check whether a field name addresses the identifier (case-insensitive).
pub fn is_identifier_field(field: &str) -> bool {
    field.eq_ignore_ascii_case(IDENTIFIER_FIELD)
}

/// Generate a fresh identifier for records inserted without one.
pub fn generate_identifier() -> String {
    Uuid::new_v4().to_string()
}

/// A schemaless record stored in a collection.
///
/// Records have no fixed shape. The only field the stores care about is the
/// identifier, which is looked up case-insensitively under `"Id"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a record from a JSON value. Only objects are accepted.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(anyhow!(
                "Record must be a JSON object, got {}",
                json_type_name(&other)
            )),
        }
    }

    /// Build a record from any serializable value (structs, maps, `json!` literals).
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self> {
        Self::from_value(serde_json::to_value(value)?)
    }

    /// Parse a record from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Serialize the record to JSON text.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    /// Deserialize the record into a typed value.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Name of the key holding the identifier, whatever its casing.
    fn identifier_key(&self) -> Option<&str> {
        self.0
            .keys()
            .find(|key| is_identifier_field(key))
            .map(String::as_str)
    }

    /// Read the identifier, if the record carries one.
    ///
    /// Strings are returned verbatim and numbers as their decimal text.
    /// Null or structured values count as absent.
    pub fn identifier(&self) -> Option<String> {
        let key = self.identifier_key()?;
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Set the identifier, overwriting the existing identifier field if any.
    pub fn with_identifier(mut self, id: &str) -> Self {
        let key = self
            .identifier_key()
            .unwrap_or(IDENTIFIER_FIELD)
            .to_string();
        self.0.insert(key, Value::String(id.to_string()));
        self
    }

    /// Return the record's identifier, generating and storing one when absent.
    pub fn ensure_identifier(self) -> (String, Self) {
        match self.identifier() {
            Some(id) => (id, self),
            None => {
                let id = generate_identifier();
                let record = self.with_identifier(&id);
                (id, record)
            }
        }
    }

    /// Text form of a field, as compared by the scan-based stores.
    ///
    /// Identifier fields resolve case-insensitively; other fields match the
    /// key exactly. Strings compare by content, everything else by its JSON text.
    pub fn field_text(&self, field: &str) -> Option<String> {
        if is_identifier_field(field) {
            return self.identifier();
        }
        match self.0.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Check whether `field` holds `value` under string equality.
    pub fn matches(&self, field: &str, value: &str) -> bool {
        self.field_text(field).as_deref() == Some(value)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

impl TryFrom<Value> for Record {
    type Error = anyhow::Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        Record::from_value(value).unwrap()
    }

    #[test]
    fn test_is_identifier_field() {
        assert!(is_identifier_field("Id"));
        assert!(is_identifier_field("id"));
        assert!(is_identifier_field("ID"));
        assert!(!is_identifier_field("_id"));
        assert!(!is_identifier_field("Identifier"));
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Record::from_value(json!([1, 2])).is_err());
        assert!(Record::from_value(json!("text")).is_err());
        assert!(Record::from_value(json!({})).is_ok());
    }

    #[test]
    fn test_identifier_lookup() {
        assert_eq!(record(json!({"Id": "1"})).identifier().as_deref(), Some("1"));
        assert_eq!(record(json!({"id": "abc"})).identifier().as_deref(), Some("abc"));
        assert_eq!(record(json!({"Id": 42})).identifier().as_deref(), Some("42"));
        assert_eq!(record(json!({"Id": null})).identifier(), None);
        assert_eq!(record(json!({"Name": "Alice"})).identifier(), None);
    }

    #[test]
    fn test_with_identifier_keeps_existing_casing() {
        let updated = record(json!({"id": "old", "Name": "Alice"})).with_identifier("new");
        assert_eq!(updated.get("id"), Some(&json!("new")));
        assert!(updated.get("Id").is_none());

        let fresh = record(json!({"Name": "Bob"})).with_identifier("7");
        assert_eq!(fresh.get("Id"), Some(&json!("7")));
    }

    #[test]
    fn test_ensure_identifier_generates_uuid() {
        let (id, stored) = record(json!({"Name": "Carol"})).ensure_identifier();
        assert!(Uuid::parse_str(&id).is_ok());
        assert_eq!(stored.identifier(), Some(id));

        let (id, _) = record(json!({"Id": "given"})).ensure_identifier();
        assert_eq!(id, "given");
    }

    #[test]
    fn test_field_matching() {
        let alice = record(json!({"Id": "1", "Name": "Alice", "Age": 30, "Admin": true}));
        assert!(alice.matches("Name", "Alice"));
        assert!(alice.matches("Age", "30"));
        assert!(alice.matches("Admin", "true"));
        assert!(alice.matches("ID", "1"));
        assert!(!alice.matches("name", "Alice"));
        assert!(!alice.matches("Missing", ""));
    }

    #[test]
    fn test_typed_conversion() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Person {
            #[serde(rename = "Id")]
            id: String,
            #[serde(rename = "Age")]
            age: u32,
        }

        let person = Person { id: "9".into(), age: 12 };
        let rec = Record::from_serializable(&person).unwrap();
        assert_eq!(rec.identifier().as_deref(), Some("9"));
        assert_eq!(rec.to_typed::<Person>().unwrap(), person);
    }
}
