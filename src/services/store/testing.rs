//! Shared behavioural checks run against every driver.

use serde_json::json;

use super::traits::{DocumentStore, Record};

pub(crate) fn record(value: serde_json::Value) -> Record {
    Record::from_value(value).unwrap()
}

fn names(records: &[Record]) -> Vec<String> {
    let mut names: Vec<String> = records
        .iter()
        .filter_map(|r| r.get("Name").and_then(|n| n.as_str()).map(str::to_string))
        .collect();
    names.sort();
    names
}

/// Alice/Bob walk-through: insert, list, lookup, update, delete.
pub(crate) async fn crud_scenario(store: &dyn DocumentStore, collection: &str) {
    let alice = record(json!({"Id": "1", "Name": "Alice", "Age": 30}));
    let bob = record(json!({"Id": "2", "Name": "Bob", "Age": 25}));

    assert!(store.insert(collection, alice.clone()).await.unwrap());
    assert!(store.insert(collection, bob.clone()).await.unwrap());

    let all = store.get_all(collection).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.contains(&alice));
    assert!(all.contains(&bob));

    let found = store
        .get_by_field(collection, "Name", "Alice")
        .await
        .unwrap()
        .expect("Alice should be found by name");
    assert_eq!(found.identifier().as_deref(), Some("1"));

    let older = record(json!({"Id": "1", "Name": "Alice", "Age": 31}));
    assert!(store.update(collection, "Id", "1", older.clone()).await.unwrap());
    let found = store
        .get_by_field(collection, "Id", "1")
        .await
        .unwrap()
        .expect("Alice should be found by id");
    assert_eq!(found.get("Age"), Some(&json!(31)));
    assert_eq!(found, older);

    assert!(store.delete(collection, "Id", "2").await.unwrap());
    let all = store.get_all(collection).await.unwrap();
    assert_eq!(names(&all), vec!["Alice".to_string()]);
    assert!(store.get_by_field(collection, "id", "2").await.unwrap().is_none());
}

/// Update replaces the whole record; lookups by other fields work too.
pub(crate) async fn replace_without_merge(store: &dyn DocumentStore, collection: &str) {
    let original = record(json!({"Id": "10", "Name": "Dana", "City": "Oslo"}));
    assert!(store.insert(collection, original).await.unwrap());

    let replacement = record(json!({"Id": "10", "Name": "Dana", "Team": "Blue"}));
    assert!(
        store
            .update(collection, "Name", "Dana", replacement.clone())
            .await
            .unwrap()
    );

    let stored = store
        .get_by_field(collection, "Id", "10")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, replacement);
    assert!(stored.get("City").is_none());

    assert!(store.delete(collection, "Team", "Blue").await.unwrap());
    assert!(store.get_all(collection).await.unwrap().is_empty());
}

/// Missing matches yield `None`/`false` and leave the collection untouched.
pub(crate) async fn missing_matches(store: &dyn DocumentStore, collection: &str) {
    assert!(store.get_all(collection).await.unwrap().is_empty());
    assert!(store.get_by_field(collection, "Id", "nope").await.unwrap().is_none());

    let erin = record(json!({"Id": "20", "Name": "Erin"}));
    assert!(store.insert(collection, erin.clone()).await.unwrap());

    let ghost = record(json!({"Id": "21", "Name": "Ghost"}));
    assert!(!store.update(collection, "Id", "21", ghost.clone()).await.unwrap());
    assert!(!store.update(collection, "Name", "Nobody", ghost).await.unwrap());
    assert!(!store.delete(collection, "Id", "21").await.unwrap());
    assert!(!store.delete(collection, "Name", "Nobody").await.unwrap());

    assert_eq!(store.get_all(collection).await.unwrap(), vec![erin]);
}

/// Inserting without an identifier yields a generated, distinct one.
pub(crate) async fn generated_identifiers(store: &dyn DocumentStore, collection: &str) {
    assert!(store.insert(collection, record(json!({"Name": "Finn"}))).await.unwrap());
    assert!(store.insert(collection, record(json!({"Name": "Gail"}))).await.unwrap());

    let all = store.get_all(collection).await.unwrap();
    assert_eq!(all.len(), 2);
    let ids: Vec<String> = all.iter().map(|r| r.identifier().unwrap()).collect();
    assert_ne!(ids[0], ids[1]);

    for (id, stored) in ids.iter().zip(all.iter()) {
        let found = store
            .get_by_field(collection, "Id", id)
            .await
            .unwrap()
            .expect("generated id should be addressable");
        assert_eq!(&found, stored);
    }
}

/// Every check above, each on its own collection.
pub(crate) async fn full_suite(store: &dyn DocumentStore, prefix: &str) {
    crud_scenario(store, &format!("{}_crud", prefix)).await;
    replace_without_merge(store, &format!("{}_replace", prefix)).await;
    missing_matches(store, &format!("{}_missing", prefix)).await;
    generated_identifiers(store, &format!("{}_generated", prefix)).await;
}
