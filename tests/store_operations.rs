//! Store Operation Tests
//!
//! Covers:
//! - identifier monotonicity, including after deletes and reopen
//! - insert/find round trip
//! - predicate, projection, update and delete semantics
//! - missing bucket handling

use pallas::{Document, Store, StoreErrorCode, StoreOptions, Value};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn create_temp_data_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

fn open_store(dir: &TempDir) -> Store {
    Store::open(
        StoreOptions::new()
            .with_data_dir(dir.path())
            .with_db_name("test"),
    )
    .unwrap()
}

fn person(name: &str, age: i64) -> Document {
    Document::new().with("name", name).with("age", age)
}

fn seed_users(store: &Store) {
    store.bucket("users").insert(person("Foo", 10)).unwrap();
    store.bucket("users").insert(person("Bar", 10)).unwrap();
    store.bucket("users").insert(person("Baz", 20)).unwrap();
}

// =============================================================================
// Identifiers
// =============================================================================

#[test]
fn test_ids_start_at_one_and_increase() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);

    let ids: Vec<u64> = (0..5)
        .map(|i| store.bucket("items").insert(person("x", i)).unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_ids_are_per_bucket() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);

    assert_eq!(store.bucket("a").insert(person("x", 1)).unwrap(), 1);
    assert_eq!(store.bucket("b").insert(person("x", 1)).unwrap(), 1);
    assert_eq!(store.bucket("a").insert(person("x", 1)).unwrap(), 2);
}

#[test]
fn test_ids_never_reused_after_delete() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);
    seed_users(&store);

    assert_eq!(store.bucket("users").equal([("id", 3)]).delete().unwrap(), 1);
    assert_eq!(store.bucket("users").insert(person("Qux", 30)).unwrap(), 4);

    store.bucket("users").delete().unwrap();
    assert_eq!(store.bucket("users").insert(person("Quux", 40)).unwrap(), 5);
}

#[test]
fn test_ids_survive_reopen() {
    let dir = create_temp_data_dir();
    {
        let store = open_store(&dir);
        seed_users(&store);
    }

    let store = open_store(&dir);
    assert_eq!(store.bucket("users").find().unwrap().len(), 3);
    assert_eq!(store.bucket("users").insert(person("Qux", 30)).unwrap(), 4);
}

// =============================================================================
// Find
// =============================================================================

#[test]
fn test_scenario_three_users() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);

    let ids: Vec<u64> = [("Foo", 10), ("Bar", 10), ("Baz", 20)]
        .iter()
        .map(|(name, age)| store.bucket("users").insert(person(name, *age)).unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);

    assert_eq!(store.bucket("users").find().unwrap().len(), 3);

    let baz = store.bucket("users").equal([("name", "Baz")]).find().unwrap();
    assert_eq!(baz.len(), 1);
    assert_eq!(baz[0].get("age"), Some(&Value::Int(20)));
    assert_eq!(baz[0].id(), Some(3));
}

#[test]
fn test_insert_find_round_trip_by_id() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);

    let doc = Document::new()
        .with("name", "Foo")
        .with("tags", vec!["a", "b"])
        .with("nested", Document::new().with("ok", true))
        .with("score", 1.5)
        .with("nothing", Value::Null);
    let id = store.bucket("users").insert(doc.clone()).unwrap();

    let found = store.bucket("users").equal([("id", id)]).find().unwrap();
    assert_eq!(found, vec![doc.with("id", id)]);
}

#[test]
fn test_results_in_id_order() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);
    for i in 0..300 {
        store.bucket("items").insert(person("x", i)).unwrap();
    }

    let ids: Vec<u64> = store
        .bucket("items")
        .find()
        .unwrap()
        .iter()
        .filter_map(Document::id)
        .collect();
    let expected: Vec<u64> = (1..=300).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_predicate_on_absent_field_excludes_record() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);
    store.bucket("users").insert(person("Foo", 10)).unwrap();
    store
        .bucket("users")
        .insert(person("Bar", 10).with("email", "bar@x"))
        .unwrap();

    let found = store
        .bucket("users")
        .equal([("email", "bar@x")])
        .find()
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), Some(2));
}

#[test]
fn test_equal_narrows_and_or_equal_widens() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);
    seed_users(&store);

    let narrowed = store
        .bucket("users")
        .equal([("age", 10)])
        .equal([("name", "Bar")])
        .find()
        .unwrap();
    assert_eq!(narrowed.len(), 1);

    let widened = store
        .bucket("users")
        .equal([("name", "Foo")])
        .or_equal([("name", "Baz")])
        .find()
        .unwrap();
    let names: Vec<&str> = widened
        .iter()
        .filter_map(|d| d.get("name").and_then(Value::as_str))
        .collect();
    assert_eq!(names, vec!["Foo", "Baz"]);
}

#[test]
fn test_projection() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);
    store.bucket("users").insert(person("A", 9)).unwrap();

    let found = store.bucket("users").select(["name"]).find().unwrap();
    assert_eq!(found, vec![Document::new().with("name", "A")]);
}

#[test]
fn test_limit_truncates() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);
    seed_users(&store);

    let found = store.bucket("users").limit(2).find().unwrap();
    let ids: Vec<u64> = found.iter().filter_map(Document::id).collect();
    assert_eq!(ids, vec![1, 2]);
}

// =============================================================================
// Update and Delete
// =============================================================================

#[test]
fn test_update_only_touches_existing_fields() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);
    seed_users(&store);

    let updated = store
        .bucket("users")
        .equal([("age", 10)])
        .update(Document::new().with("age", 11).with("city", "Oslo"))
        .unwrap();
    assert_eq!(updated.len(), 2);
    for doc in &updated {
        assert_eq!(doc.get("age"), Some(&Value::Int(11)));
        assert!(!doc.contains_field("city"));
    }

    let untouched = store.bucket("users").equal([("id", 3)]).find().unwrap();
    assert_eq!(untouched[0].get("age"), Some(&Value::Int(20)));
}

#[test]
fn test_update_with_no_matches_returns_empty() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);
    seed_users(&store);

    let updated = store
        .bucket("users")
        .equal([("name", "Nobody")])
        .update(Document::new().with("age", 1))
        .unwrap();
    assert!(updated.is_empty());
}

#[test]
fn test_delete_removes_exactly_matched_set() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);
    seed_users(&store);

    assert_eq!(store.bucket("users").equal([("age", 10)]).delete().unwrap(), 2);

    let rest = store.bucket("users").find().unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].get("name"), Some(&Value::from("Baz")));
}

// =============================================================================
// Missing Buckets
// =============================================================================

#[test]
fn test_unknown_bucket_is_not_found() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);

    let find = store.bucket("ghosts").find().unwrap_err();
    assert_eq!(find.code(), StoreErrorCode::NotFound);

    let update = store
        .bucket("ghosts")
        .update(Document::new().with("a", 1))
        .unwrap_err();
    assert_eq!(update.code(), StoreErrorCode::NotFound);

    let delete = store.bucket("ghosts").delete().unwrap_err();
    assert_eq!(delete.code(), StoreErrorCode::NotFound);

    assert!(store.bucket_names().unwrap().is_empty());
}

#[test]
fn test_created_empty_bucket_is_found() {
    let dir = create_temp_data_dir();
    let store = open_store(&dir);
    store.create_bucket("empty").unwrap();

    assert!(store.bucket("empty").find().unwrap().is_empty());
    assert_eq!(store.bucket("empty").delete().unwrap(), 0);
}
