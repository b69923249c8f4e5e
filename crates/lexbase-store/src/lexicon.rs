//! Autocomplete lexicon derivation.
//!
//! Merges the materialized `nouns`, `prepositions`, `autosuggestions` and
//! `emoji_keywords` relations into the single-column `autocomplete_lexicon`
//! table:
//! 1. distinct union of candidates with per-source filters,
//! 2. casing resolution against the noun table,
//! 3. final length/punctuation filter on the resolved form,
//! 4. case-sensitive dedup, written through the normal materialize path.

use std::collections::{BTreeSet, HashSet};

use anyhow::Result;
use tracing::debug;

use lexbase_ingest::{DataType, TableSchema, AUTOCOMPLETE_LEXICON};

use crate::LanguageStore;

/// Source relations that must be materialized before the lexicon can build.
pub const LEXICON_PREREQUISITES: [DataType; 4] = [
    DataType::Nouns,
    DataType::Prepositions,
    DataType::Autosuggestions,
    DataType::EmojiKeywords,
];

/// Characters that disqualify a resolved candidate from the lexicon.
const EXCLUDED_CHARS: [char; 9] = ['-', '/', '(', ')', '"', '“', '„', '”', '\''];

/// Derive and write `autocomplete_lexicon` for one language database.
///
/// Expects the four prerequisite tables to exist; returns the number of
/// lexicon rows written. Errors here are meant to be caught per language by
/// the caller, not to abort the run.
pub fn build_autocomplete_lexicon(store: &mut LanguageStore) -> Result<usize> {
    let nouns = store.column_values("nouns", "noun")?;
    let noun_set: HashSet<&str> = nouns.iter().map(String::as_str).collect();

    // Distinct union of candidate words. BTreeSet keeps iteration (and the
    // final table content) deterministic.
    let mut candidates: BTreeSet<String> = BTreeSet::new();
    candidates.extend(nouns.iter().filter(|w| char_len(w) > 2).cloned());
    candidates.extend(
        store
            .column_values("prepositions", "preposition")?
            .into_iter()
            .filter(|w| char_len(w) > 2),
    );
    // Autosuggestion keys are lower-cased before the length check; casing
    // resolution below restores noun casing where one exists.
    candidates.extend(
        store
            .column_values("autosuggestions", "word")?
            .into_iter()
            .map(|w| w.to_lowercase())
            .filter(|w| char_len(w) > 2),
    );
    // Emoji keyword words join unfiltered; the final filter still applies.
    candidates.extend(store.column_values("emoji_keywords", "word")?);

    let mut resolved: BTreeSet<String> = BTreeSet::new();
    for candidate in candidates {
        let word = resolve_casing(&candidate, &noun_set);
        if char_len(&word) <= 1 || word.contains(&EXCLUDED_CHARS[..]) {
            continue;
        }
        resolved.insert(word);
    }

    let schema = TableSchema::new(AUTOCOMPLETE_LEXICON, vec!["word".to_string()]);
    let rows: Vec<Vec<String>> = resolved.into_iter().map(|w| vec![w]).collect();
    let written = store.materialize(&schema, &rows)?;

    debug!(rows = written, "built autocomplete lexicon");
    Ok(written)
}

/// Pick the display casing for a candidate. Precedence is fixed: a noun
/// matching the first-letter-capitalized form wins over a noun matching the
/// fully upper-cased form, which wins over the candidate itself.
fn resolve_casing(candidate: &str, nouns: &HashSet<&str>) -> String {
    let capitalized = capitalize_first(candidate);
    if let Some(noun) = nouns.get(capitalized.as_str()) {
        return noun.to_string();
    }
    let upper = candidate.to_uppercase();
    if let Some(noun) = nouns.get(upper.as_str()) {
        return noun.to_string();
    }
    candidate.to_string()
}

/// Upper-case only the first character, leaving the rest unchanged.
fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Length in characters, matching SQLite `LENGTH()` on text values.
fn char_len(word: &str) -> usize {
    word.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalization_only_touches_the_first_character() {
        assert_eq!(capitalize_first("scribe"), "Scribe");
        assert_eq!(capitalize_first("äpfel"), "Äpfel");
        assert_eq!(capitalize_first("VPN"), "VPN");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn casing_resolution_prefers_capitalized_noun_match() {
        let nouns: HashSet<&str> = ["Scribe", "HAUS"].into_iter().collect();
        assert_eq!(resolve_casing("scribe", &nouns), "Scribe");
        assert_eq!(resolve_casing("haus", &nouns), "HAUS");
        assert_eq!(resolve_casing("tree", &nouns), "tree");
    }

    #[test]
    fn char_len_counts_characters_not_bytes() {
        assert_eq!(char_len("in"), 2);
        assert_eq!(char_len("дом"), 3);
        assert_eq!(char_len("🔥"), 1);
    }
}
