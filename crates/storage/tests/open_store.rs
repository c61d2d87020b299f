#![forbid(unsafe_code)]

use gs_storage::{SqliteStore, StoreError};
use rusqlite::Connection;
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("gs_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

#[test]
fn open_requires_an_existing_database() {
    let db_path = temp_dir("open_missing").join("gravity.db");

    let err = SqliteStore::open(&db_path).expect_err("missing file must be rejected");
    match err {
        StoreError::MissingDatabase(path) => assert_eq!(path, db_path),
        other => panic!("expected MissingDatabase, got {other:?}"),
    }
    assert!(!db_path.exists(), "open must not create the file");
}

#[test]
fn open_rejects_database_without_adlist_tables() {
    let db_path = temp_dir("open_foreign").join("gravity.db");
    let conn = Connection::open(&db_path).expect("create foreign db");
    conn.execute("CREATE TABLE adlist (id INTEGER PRIMARY KEY)", [])
        .expect("create partial schema");
    drop(conn);

    let err = SqliteStore::open(&db_path).expect_err("partial schema must be rejected");
    match err {
        StoreError::SchemaMismatch { missing } => {
            assert_eq!(missing, ["group", "adlist_by_group"]);
        }
        other => panic!("expected SchemaMismatch, got {other:?}"),
    }
}

#[test]
fn created_store_reopens_with_default_group() {
    let db_path = temp_dir("create_reopen").join("nested").join("gravity.db");
    {
        let mut store = SqliteStore::create(&db_path).expect("create store");
        store
            .add_adlist("http://mine", true, Some("mine"))
            .expect("seed");
    }

    let store = SqliteStore::open(&db_path).expect("reopen store");
    assert_eq!(store.db_path(), db_path.as_path());
    let groups = store.list_groups().expect("groups");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].id, 0);
    assert_eq!(groups[0].name, "Default");
    assert_eq!(store.list_adlists().expect("adlists").len(), 1);
}

#[test]
fn create_is_idempotent_on_existing_store() {
    let db_path = temp_dir("create_twice").join("gravity.db");
    {
        let mut store = SqliteStore::create(&db_path).expect("create store");
        store
            .add_adlist("http://mine", true, None)
            .expect("seed");
    }
    let store = SqliteStore::create(&db_path).expect("create again");
    assert_eq!(store.list_adlists().expect("adlists").len(), 1);
    assert_eq!(store.list_groups().expect("groups").len(), 1);
}

#[test]
fn add_adlist_rejects_blank_address() {
    let mut store =
        SqliteStore::create(temp_dir("blank_address").join("gravity.db")).expect("create store");
    let err = store
        .add_adlist("  ", true, None)
        .expect_err("blank address must be rejected");
    assert!(matches!(err, StoreError::InvalidInput(_)));
}
