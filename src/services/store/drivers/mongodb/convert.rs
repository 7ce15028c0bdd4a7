//! Record/BSON conversion and filter construction for MongoDB.
//!
//! MongoDB keeps its own `_id` primary key next to the record's `"Id"`
//! field. The rules here keep the two consistent:
//! - an `"Id"` that parses as an `ObjectId` is stored as `_id`;
//! - `_id` is hidden from returned records, and surfaced as `"Id"` when the
//!   record has no identifier of its own.

use anyhow::{anyhow, Result};
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};

use crate::services::store::traits::{is_identifier_field, Record, IDENTIFIER_FIELD};

const PRIMARY_KEY: &str = "_id";

/// Filter matching `field == value`, with the identifier mapped onto `_id`
/// whenever the value is a valid `ObjectId`.
///
/// Field names starting with `$` would be read as query operators, so they
/// yield no filter and match nothing.
pub(crate) fn field_filter(field: &str, value: &str) -> Option<Document> {
    if field.starts_with('$') {
        return None;
    }

    let mut filter = Document::new();
    if is_identifier_field(field) {
        match ObjectId::parse_str(value) {
            Ok(oid) => filter.insert(PRIMARY_KEY, oid),
            Err(_) => filter.insert(IDENTIFIER_FIELD, text_match(value)),
        };
    } else {
        filter.insert(field, text_match(value));
    }
    Some(filter)
}

/// Condition equal to `value` under the text comparison used by every store:
/// strings by content, integers and booleans by their JSON text.
fn text_match(value: &str) -> Bson {
    let mut candidates = vec![Bson::String(value.to_string())];
    if let Ok(n) = value.parse::<i64>() {
        if n.to_string() == value {
            candidates.push(Bson::Int64(n));
        }
    }
    match value {
        "true" => candidates.push(Bson::Boolean(true)),
        "false" => candidates.push(Bson::Boolean(false)),
        _ => {}
    }

    if candidates.len() == 1 {
        candidates.remove(0)
    } else {
        Bson::Document(doc! { "$in": candidates })
    }
}

fn identifier_key(document: &Document) -> Option<String> {
    document.keys().find(|k| is_identifier_field(k)).cloned()
}

/// Convert a record for `insert_one`.
///
/// An `ObjectId`-shaped identifier becomes the document's `_id`; any other
/// identifier is stored verbatim and MongoDB assigns `_id` itself.
pub(crate) fn insert_document(record: &Record) -> Result<Document> {
    let object_id = record.identifier().and_then(|id| ObjectId::parse_str(&id).ok());
    let mut document = bson::to_document(record.as_map())?;

    if let Some(oid) = object_id {
        if let Some(key) = identifier_key(&document) {
            document.remove(&key);
        }
        document.insert(PRIMARY_KEY, oid);
    }
    Ok(document)
}

/// Convert a record for `replace_one`.
///
/// `_id` is immutable, so an `ObjectId`-shaped identifier is dropped and the
/// stored `_id` carries it.
pub(crate) fn replacement_document(record: &Record) -> Result<Document> {
    let mut document = bson::to_document(record.as_map())?;
    let oid_shaped = record
        .identifier()
        .is_some_and(|id| ObjectId::parse_str(&id).is_ok());

    if oid_shaped {
        if let Some(key) = identifier_key(&document) {
            document.remove(&key);
        }
    }
    Ok(document)
}

/// Filter and replacement for updating the document `existing`.
///
/// The replacement keeps the located record's identifier, and the filter
/// targets the located document by `_id` so exactly that one is replaced.
pub(crate) fn pinned_replacement(existing: Document, record: Record) -> Result<(Document, Document)> {
    let native_id = existing
        .get(PRIMARY_KEY)
        .cloned()
        .ok_or_else(|| anyhow!("Stored document has no {}", PRIMARY_KEY))?;

    let record = match document_to_record(existing)?.identifier() {
        Some(id) => record.with_identifier(&id),
        None => record,
    };
    let mut filter = Document::new();
    filter.insert(PRIMARY_KEY, native_id);
    Ok((filter, replacement_document(&record)?))
}

/// Convert a stored document back into a record.
pub(crate) fn document_to_record(mut document: Document) -> Result<Record> {
    let native_id = document.remove(PRIMARY_KEY);
    let record = Record::from_value(Bson::Document(document).into_relaxed_extjson())?;

    if record.identifier().is_some() {
        return Ok(record);
    }
    Ok(match native_id {
        Some(Bson::ObjectId(oid)) => record.with_identifier(&oid.to_hex()),
        Some(Bson::String(id)) => record.with_identifier(&id),
        _ => record,
    })
}
