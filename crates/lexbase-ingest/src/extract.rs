//! Per-data-type row extraction.
//!
//! One entry in the source document becomes one row; column 0 is the entry
//! key. Missing scalar fields become empty strings, variable-length
//! suggestion/emoji lists are truncated and padded to a fixed arity, and the
//! nouns table may gain a synthesized `Scribe` row depending on the
//! language (see [`crate::language`]).

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{language, schema_for, DataType, ShapeError, TableSchema, SUGGESTION_SLOTS};

/// A table schema together with the rows extracted for it.
#[derive(Debug, Clone)]
pub struct ExtractedTable {
    pub schema: TableSchema,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct NounEntry {
    #[serde(default)]
    plural: String,
    #[serde(default)]
    form: String,
}

#[derive(Debug, Deserialize)]
struct EmojiKeywordEntry {
    emoji: String,
}

/// Extract all rows for one data type from its parsed source document.
///
/// Deterministic for identical input. Entry order follows the source object;
/// it only matters downstream for which duplicate key wins on insertion.
pub fn extract(
    data_type: DataType,
    language: &str,
    doc: &Value,
) -> Result<ExtractedTable, ShapeError> {
    let entries = doc
        .as_object()
        .ok_or(ShapeError::NotAnObject { data_type })?;
    let schema = schema_for(data_type, entries)?;

    let rows = match data_type {
        DataType::Nouns => noun_rows(language, entries)?,
        DataType::Verbs => verb_rows(&schema, entries)?,
        DataType::Prepositions | DataType::Translations => scalar_rows(data_type, entries)?,
        DataType::Autosuggestions => suggestion_rows(entries)?,
        DataType::EmojiKeywords => emoji_rows(entries)?,
    };

    Ok(ExtractedTable { schema, rows })
}

/// Text rendering for scalar cells: strings verbatim, null as empty,
/// anything else via its JSON encoding.
fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn noun_rows(
    language: &str,
    entries: &Map<String, Value>,
) -> Result<Vec<Vec<String>>, ShapeError> {
    let mut rows = Vec::with_capacity(entries.len() + 1);
    for (noun, value) in entries {
        let entry: NounEntry =
            serde_json::from_value(value.clone()).map_err(|e| ShapeError::BadEntry {
                data_type: DataType::Nouns,
                key: noun.clone(),
                message: e.to_string(),
            })?;
        rows.push(vec![noun.clone(), entry.plural, entry.form]);
    }

    if !entries.contains_key("Scribe") && language::wants_scribe_row(language) {
        rows.push(vec![
            "Scribe".to_string(),
            "Scribes".to_string(),
            String::new(),
        ]);
    }

    Ok(rows)
}

fn verb_rows(
    schema: &TableSchema,
    entries: &Map<String, Value>,
) -> Result<Vec<Vec<String>>, ShapeError> {
    let attribute_columns = &schema.columns[1..];
    let sample_key = entries.keys().next().cloned().unwrap_or_default();

    let mut rows = Vec::with_capacity(entries.len());
    for (verb, value) in entries {
        let attributes = value.as_object().ok_or_else(|| ShapeError::BadEntry {
            data_type: DataType::Verbs,
            key: verb.clone(),
            message: "expected an object of conjugation attributes".to_string(),
        })?;

        // Every entry must share the sampled attribute set exactly; a silent
        // column mismatch would otherwise drop or misalign conjugations.
        let matches_schema = attributes.len() == attribute_columns.len()
            && attribute_columns.iter().all(|c| attributes.contains_key(c));
        if !matches_schema {
            return Err(ShapeError::VerbAttributeMismatch {
                verb: verb.clone(),
                sample: sample_key,
                expected: attribute_columns.join(", "),
                found: attributes.keys().cloned().collect::<Vec<_>>().join(", "),
            });
        }

        let mut row = Vec::with_capacity(schema.columns.len());
        row.push(verb.clone());
        for column in attribute_columns {
            row.push(text_value(&attributes[column]));
        }
        rows.push(row);
    }

    Ok(rows)
}

fn scalar_rows(
    data_type: DataType,
    entries: &Map<String, Value>,
) -> Result<Vec<Vec<String>>, ShapeError> {
    entries
        .iter()
        .map(|(word, value)| match value {
            Value::Array(_) | Value::Object(_) => Err(ShapeError::BadEntry {
                data_type,
                key: word.clone(),
                message: "expected a scalar value".to_string(),
            }),
            scalar => Ok(vec![word.clone(), text_value(scalar)]),
        })
        .collect()
}

fn suggestion_rows(entries: &Map<String, Value>) -> Result<Vec<Vec<String>>, ShapeError> {
    let mut rows = Vec::with_capacity(entries.len());
    for (word, value) in entries {
        let suggestions = value.as_array().ok_or_else(|| ShapeError::BadEntry {
            data_type: DataType::Autosuggestions,
            key: word.clone(),
            message: "expected an array of suggestions".to_string(),
        })?;

        let mut row = vec![word.clone()];
        row.extend(suggestions.iter().take(SUGGESTION_SLOTS).map(text_value));
        pad_row(&mut row);
        rows.push(row);
    }
    Ok(rows)
}

fn emoji_rows(entries: &Map<String, Value>) -> Result<Vec<Vec<String>>, ShapeError> {
    let mut rows = Vec::with_capacity(entries.len());
    for (word, value) in entries {
        let keywords: Vec<EmojiKeywordEntry> =
            serde_json::from_value(value.clone()).map_err(|e| ShapeError::BadEntry {
                data_type: DataType::EmojiKeywords,
                key: word.clone(),
                message: e.to_string(),
            })?;

        let mut row = vec![word.clone()];
        row.extend(
            keywords
                .into_iter()
                .take(SUGGESTION_SLOTS)
                .map(|k| k.emoji),
        );
        pad_row(&mut row);
        rows.push(row);
    }
    Ok(rows)
}

/// Pad with empty slots so every row has key + `SUGGESTION_SLOTS` columns.
fn pad_row(row: &mut Vec<String>) {
    row.resize(1 + SUGGESTION_SLOTS, String::new());
}
