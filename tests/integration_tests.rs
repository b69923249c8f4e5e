//! Workspace-level integration tests: extraction through materialization to
//! lexicon derivation, against real database files.

use lexbase_ingest::{extract, DataType};
use lexbase_store::{build_autocomplete_lexicon, LanguageStore};
use tempfile::tempdir;

fn extract_doc(data_type: DataType, language: &str, json: &str) -> lexbase_ingest::ExtractedTable {
    let doc: serde_json::Value = serde_json::from_str(json).unwrap();
    extract(data_type, language, &doc).unwrap()
}

#[test]
fn german_pack_materializes_and_derives_the_lexicon() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("DELanguageData.sqlite");
    let mut store = LanguageStore::create(&db_path).unwrap();

    let nouns = extract_doc(
        DataType::Nouns,
        "German",
        r#"{"Haus": {"plural": "Häuser", "form": ""}}"#,
    );
    store.materialize(&nouns.schema, &nouns.rows).unwrap();

    let prepositions = extract_doc(
        DataType::Prepositions,
        "German",
        r#"{"in": "Dative", "durch": "Accusative"}"#,
    );
    store
        .materialize(&prepositions.schema, &prepositions.rows)
        .unwrap();

    let autosuggestions = extract_doc(
        DataType::Autosuggestions,
        "German",
        r#"{"scribe": ["scribes", "schreiben"], "haus": []}"#,
    );
    store
        .materialize(&autosuggestions.schema, &autosuggestions.rows)
        .unwrap();

    let emoji = extract_doc(
        DataType::EmojiKeywords,
        "German",
        r#"{"feuer": [{"emoji": "🔥"}]}"#,
    );
    store.materialize(&emoji.schema, &emoji.rows).unwrap();

    build_autocomplete_lexicon(&mut store).unwrap();

    // The nouns table carries the source noun plus the synthesized row.
    assert_eq!(
        store.column_values("nouns", "noun").unwrap(),
        ["Haus", "Scribe"]
    );

    // The lexicon reconciles casing against the noun table, keeps the long
    // preposition and the emoji keyword, and drops the two-character "in".
    assert_eq!(
        store.column_values("autocomplete_lexicon", "word").unwrap(),
        ["Haus", "Scribe", "durch", "feuer"]
    );

    let path = store.finish().unwrap();
    assert_eq!(path, db_path);

    // The finished file is a readable database with the same content the
    // staged store reported.
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let words: Vec<String> = conn
        .prepare("SELECT word FROM autocomplete_lexicon")
        .unwrap()
        .query_map([], |r| r.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(words, ["Haus", "Scribe", "durch", "feuer"]);
    assert!(!db_path.with_extension("sqlite.staging").exists());
}

#[test]
fn verbs_table_round_trips_dynamic_attribute_columns() {
    let dir = tempdir().unwrap();
    let mut store = LanguageStore::create(&dir.path().join("SVLanguageData.sqlite")).unwrap();

    let verbs = extract_doc(
        DataType::Verbs,
        "Swedish",
        r#"{
            "vara": {"activeInfinitive": "vara", "activeSupine": "varit"},
            "ha": {"activeInfinitive": "ha", "activeSupine": "haft"}
        }"#,
    );
    store.materialize(&verbs.schema, &verbs.rows).unwrap();

    assert_eq!(
        verbs.schema.columns,
        ["verb", "activeInfinitive", "activeSupine"]
    );
    assert_eq!(store.column_values("verbs", "verb").unwrap(), ["vara", "ha"]);
    assert_eq!(
        store.column_values("verbs", "activeSupine").unwrap(),
        ["varit", "haft"]
    );
}
