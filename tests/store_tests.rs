use serde_json::json;
use txnstore::{DocumentId, DocumentStore, UpdateSpec};

#[test]
fn test_collection_handles_share_data() {
    let store = DocumentStore::new();
    let a = store.collection("events").unwrap();
    let b = store.collection("events").unwrap();

    let id = a.insert(json!({"kind": "x"})).unwrap();

    assert!(b.find(&id).unwrap().is_some());
    assert_eq!(a.len().unwrap(), 1);
    assert_eq!(store.collection_names().unwrap(), vec!["events".to_string()]);
}

#[test]
fn test_update_outcome_reports_match_and_modification() {
    let store = DocumentStore::new();
    let events = store.collection("events").unwrap();
    let id = events.insert(json!({"n": 1})).unwrap();

    let outcome = events
        .update(&id, &UpdateSpec::new().set("n", json!(1)))
        .unwrap();
    assert!(outcome.matched);
    assert!(!outcome.modified);

    let outcome = events
        .update(&id, &UpdateSpec::new().set("n", json!(2)))
        .unwrap();
    assert!(outcome.matched);
    assert!(outcome.modified);

    let outcome = events
        .update(&DocumentId::generate(), &UpdateSpec::new().set("n", json!(3)))
        .unwrap();
    assert!(!outcome.matched);
    assert!(!outcome.modified);
}

#[test]
fn test_touch_stamps_only_real_modifications() {
    let store = DocumentStore::new();
    let events = store.collection("events").unwrap();
    let id = events
        .insert(json!({"n": 1, "updated_at": "t0"}))
        .unwrap();

    let spec = UpdateSpec::new()
        .set("n", json!(1))
        .touch("updated_at", json!("t1"));
    assert!(!events.update(&id, &spec).unwrap().modified);
    assert_eq!(events.find(&id).unwrap().unwrap()["updated_at"], json!("t0"));

    let spec = UpdateSpec::new()
        .set("n", json!(2))
        .touch("updated_at", json!("t1"));
    assert!(events.update(&id, &spec).unwrap().modified);
    assert_eq!(events.find(&id).unwrap().unwrap()["updated_at"], json!("t1"));
}

#[test]
fn test_collections_are_isolated() {
    let store = DocumentStore::new();
    let left = store.collection("left").unwrap();
    let right = store.collection("right").unwrap();

    let id = left.insert(json!({"kind": "x"})).unwrap();

    assert!(right.find(&id).unwrap().is_none());
    assert!(right.is_empty().unwrap());
}
