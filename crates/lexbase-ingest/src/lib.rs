//! Schema catalog and row extraction for language data packs
//!
//! Each lexical data type ships as one JSON document per language. This crate
//! maps every data-type shape onto a relational table schema:
//! - fixed column sets for most data types,
//! - attribute-derived columns for `verbs` (validated against every entry),
//! and turns the JSON entries into text rows ready for materialization.
//!
//! Extraction is pure: no storage dependencies, deterministic output for
//! identical input documents.

use std::fmt;

use serde_json::{Map, Value};

pub mod extract;
pub mod language;

pub use extract::{extract, ExtractedTable};

/// One lexical data type, with its own JSON shape and table schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Nouns,
    Verbs,
    Prepositions,
    Translations,
    Autosuggestions,
    EmojiKeywords,
}

/// Name of the derived table built from materialized source relations.
/// Not a source data type: it has no JSON document of its own.
pub const AUTOCOMPLETE_LEXICON: &str = "autocomplete_lexicon";

/// How many suggestion/emoji slots a row carries beyond its key column.
/// Source entries past this count are dropped; missing ones pad with "".
pub const SUGGESTION_SLOTS: usize = 3;

impl DataType {
    pub const ALL: [DataType; 6] = [
        DataType::Nouns,
        DataType::Verbs,
        DataType::Prepositions,
        DataType::Translations,
        DataType::Autosuggestions,
        DataType::EmojiKeywords,
    ];

    /// Table name, also the stem of the source JSON file (`<name>.json`).
    pub fn name(self) -> &'static str {
        match self {
            DataType::Nouns => "nouns",
            DataType::Verbs => "verbs",
            DataType::Prepositions => "prepositions",
            DataType::Translations => "translations",
            DataType::Autosuggestions => "autosuggestions",
            DataType::EmojiKeywords => "emoji_keywords",
        }
    }

    pub fn from_name(name: &str) -> Option<DataType> {
        DataType::ALL.iter().copied().find(|dt| dt.name() == name)
    }

    /// Declared columns for data types whose schema does not depend on the
    /// source document. `verbs` derives its attribute columns from the data
    /// and returns `None` here; see [`schema_for`].
    pub fn fixed_columns(self) -> Option<&'static [&'static str]> {
        match self {
            DataType::Nouns => Some(&["noun", "plural", "form"]),
            DataType::Verbs => None,
            DataType::Prepositions => Some(&["preposition", "form"]),
            DataType::Translations => Some(&["word", "translation"]),
            DataType::Autosuggestions => Some(&[
                "word",
                "autosuggestion_0",
                "autosuggestion_1",
                "autosuggestion_2",
            ]),
            DataType::EmojiKeywords => Some(&[
                "word",
                "emoji_keyword_0",
                "emoji_keyword_1",
                "emoji_keyword_2",
            ]),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Relational schema for one table. Column 0 is the key column and is
/// enforced unique at materialization time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<String>,
}

impl TableSchema {
    /// `columns` must be non-empty: column 0 is the key column.
    pub fn new(table: impl Into<String>, columns: Vec<String>) -> TableSchema {
        debug_assert!(!columns.is_empty(), "a table schema needs a key column");
        TableSchema {
            table: table.into(),
            columns,
        }
    }

    pub fn key_column(&self) -> &str {
        &self.columns[0]
    }
}

/// Structural problems in a source document. These fail one data type
/// loudly; callers skip the table and keep processing the language.
#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("`{data_type}` document is not a JSON object keyed by word")]
    NotAnObject { data_type: DataType },

    #[error("`{data_type}` entry `{key}`: {message}")]
    BadEntry {
        data_type: DataType,
        key: String,
        message: String,
    },

    #[error("`verbs` document is empty; attribute columns cannot be derived")]
    EmptyVerbs,

    #[error(
        "`verbs` entry `{verb}` does not share the attribute set of `{sample}` \
         (expected [{expected}], found [{found}])"
    )]
    VerbAttributeMismatch {
        verb: String,
        sample: String,
        expected: String,
        found: String,
    },
}

/// Resolve the table schema for a data type.
///
/// Fixed mappings never fail. For `verbs` the attribute columns are derived
/// from the first entry, in source order; [`extract`] then validates every
/// other entry against that set before producing any row.
pub fn schema_for(
    data_type: DataType,
    entries: &Map<String, Value>,
) -> Result<TableSchema, ShapeError> {
    if let Some(columns) = data_type.fixed_columns() {
        return Ok(TableSchema::new(
            data_type.name(),
            columns.iter().map(|c| c.to_string()).collect(),
        ));
    }

    // Verbs: key column plus one column per attribute of the first entry.
    let (sample_key, sample) = entries.iter().next().ok_or(ShapeError::EmptyVerbs)?;
    let attributes = sample.as_object().ok_or_else(|| ShapeError::BadEntry {
        data_type,
        key: sample_key.clone(),
        message: "expected an object of conjugation attributes".to_string(),
    })?;

    let mut columns = vec!["verb".to_string()];
    columns.extend(attributes.keys().cloned());
    Ok(TableSchema::new(data_type.name(), columns))
}
