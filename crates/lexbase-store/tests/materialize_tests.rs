//! Materializer behavior over real database files.

use std::fs;

use lexbase_ingest::TableSchema;
use lexbase_store::LanguageStore;
use tempfile::tempdir;

fn preposition_schema() -> TableSchema {
    TableSchema::new(
        "prepositions",
        vec!["preposition".to_string(), "form".to_string()],
    )
}

fn row(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn duplicate_keys_keep_the_first_row() {
    let dir = tempdir().unwrap();
    let mut store = LanguageStore::create(&dir.path().join("DELanguageData.sqlite")).unwrap();

    let rows = vec![
        row(&["in", "Dative"]),
        row(&["in", "Accusative"]),
        row(&["durch", "Accusative"]),
    ];
    let inserted = store.materialize(&preposition_schema(), &rows).unwrap();

    assert_eq!(inserted, 2);
    assert_eq!(
        store.column_values("prepositions", "form").unwrap(),
        ["Dative", "Accusative"]
    );
}

#[test]
fn materialization_is_a_full_rebuild() {
    let dir = tempdir().unwrap();
    let mut store = LanguageStore::create(&dir.path().join("DELanguageData.sqlite")).unwrap();
    let schema = preposition_schema();

    store
        .materialize(&schema, &[row(&["in", "Dative"]), row(&["an", "Dative"])])
        .unwrap();
    store.materialize(&schema, &[row(&["mit", "Dative"])]).unwrap();

    assert_eq!(
        store.column_values("prepositions", "preposition").unwrap(),
        ["mit"]
    );
}

#[test]
fn materializing_twice_is_idempotent() {
    let dir = tempdir().unwrap();
    let mut store = LanguageStore::create(&dir.path().join("DELanguageData.sqlite")).unwrap();
    let schema = preposition_schema();
    let rows = vec![row(&["in", "Dative"]), row(&["durch", "Accusative"])];

    store.materialize(&schema, &rows).unwrap();
    let first = store.column_values("prepositions", "preposition").unwrap();
    store.materialize(&schema, &rows).unwrap();
    let second = store.column_values("prepositions", "preposition").unwrap();

    assert_eq!(first, second);
}

#[test]
fn row_arity_mismatch_is_rejected() {
    let dir = tempdir().unwrap();
    let mut store = LanguageStore::create(&dir.path().join("DELanguageData.sqlite")).unwrap();

    let err = store
        .materialize(&preposition_schema(), &[row(&["in"])])
        .unwrap_err();
    assert!(err.to_string().contains("schema declares 2 columns"));
}

#[test]
fn finish_replaces_an_existing_database_atomically() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("DELanguageData.sqlite");
    let schema = preposition_schema();

    let mut store = LanguageStore::create(&db_path).unwrap();
    store.materialize(&schema, &[row(&["in", "Dative"])]).unwrap();
    store.finish().unwrap();

    // Second run over the same path: the old file stays intact until the
    // staged database is renamed into place.
    let mut store = LanguageStore::create(&db_path).unwrap();
    store
        .materialize(&schema, &[row(&["durch", "Accusative"])])
        .unwrap();
    store.finish().unwrap();

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let words: Vec<String> = conn
        .prepare("SELECT preposition FROM prepositions")
        .unwrap()
        .query_map([], |r| r.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(words, ["durch"]);

    assert!(!db_path
        .with_extension("sqlite.staging")
        .exists());
}

#[test]
fn stale_staging_files_are_removed_on_create() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("DELanguageData.sqlite");
    let staging = db_path.with_extension("sqlite.staging");
    fs::write(&staging, b"not a database").unwrap();

    let mut store = LanguageStore::create(&db_path).unwrap();
    store
        .materialize(&preposition_schema(), &[row(&["in", "Dative"])])
        .unwrap();
    store.finish().unwrap();

    assert!(db_path.exists());
}

#[test]
fn table_existence_is_visible_while_staged() {
    let dir = tempdir().unwrap();
    let mut store = LanguageStore::create(&dir.path().join("DELanguageData.sqlite")).unwrap();

    assert!(!store.table_exists("prepositions").unwrap());
    store
        .materialize(&preposition_schema(), &[row(&["in", "Dative"])])
        .unwrap();
    assert!(store.table_exists("prepositions").unwrap());
}
