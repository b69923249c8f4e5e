//! Load orchestration: one run is one sequential pass over the requested
//! languages, one data type at a time within a language.
//!
//! Error isolation follows the table/language boundaries: a malformed source
//! document skips one table, a storage failure fails one language, and only
//! configuration errors (unknown language or table name) abort the run —
//! before any storage is touched.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use lexbase_ingest::{extract, language, DataType, AUTOCOMPLETE_LEXICON};
use lexbase_store::{build_autocomplete_lexicon, LanguageStore, LEXICON_PREREQUISITES};

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Reference catalog of known languages (`total_data.json`). Passed in
    /// explicitly; nothing is read from a conventional hidden path.
    pub catalog_path: PathBuf,
    /// Directory holding one subdirectory of JSON documents per language.
    pub json_dir: PathBuf,
    /// Output directory for the per-language databases.
    pub sqlite_dir: PathBuf,
    /// Empty means every catalog language.
    pub languages: Vec<String>,
    /// Empty means all six data types plus the derived lexicon.
    pub tables: Vec<String>,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    pub databases_written: Vec<String>,
    pub skipped: Vec<String>,
    pub failures: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct TableSelection {
    source_types: Vec<DataType>,
    lexicon: bool,
}

enum LanguageOutcome {
    Written(PathBuf),
    NoData,
}

pub fn run(options: &LoadOptions) -> Result<LoadReport> {
    let catalog = load_catalog(&options.catalog_path)?;
    let known: Vec<String> = catalog.keys().cloned().collect();

    let languages = if options.languages.is_empty() {
        known.clone()
    } else {
        let unknown: Vec<String> = options
            .languages
            .iter()
            .filter(|l| !known.contains(l))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            bail!(
                "invalid language(s) specified: {}. Available languages are: {}",
                unknown.join(", "),
                known.join(", ")
            );
        }
        options.languages.clone()
    };

    let selection = select_tables(&options.tables)?;

    info!(
        languages = %languages.join(", "),
        "creating/updating language databases"
    );

    let bar = ProgressBar::new(languages.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len} dbs")?.progress_chars("=> "),
    );
    bar.set_message("databases created");

    let mut report = LoadReport::default();
    for lang in &languages {
        match load_language(lang, options, &selection) {
            Ok(LanguageOutcome::Written(path)) => {
                info!(language = %lang, path = %path.display(), "database written");
                report.databases_written.push(lang.clone());
            }
            Ok(LanguageOutcome::NoData) => {
                info!(language = %lang, "no relevant JSON data files found; skipping");
                report.skipped.push(lang.clone());
            }
            Err(e) => {
                warn!(language = %lang, error = %format!("{e:#}"), "language processing failed");
                report.failures.push((lang.clone(), format!("{e:#}")));
            }
        }
        bar.inc(1);
    }
    bar.finish();

    Ok(report)
}

fn load_catalog(path: &Path) -> Result<Map<String, Value>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read reference catalog {}", path.display()))?;
    let doc: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parse reference catalog {}", path.display()))?;
    doc.as_object()
        .cloned()
        .ok_or_else(|| anyhow!("reference catalog is not a JSON object keyed by language"))
}

fn select_tables(tables: &[String]) -> Result<TableSelection> {
    if tables.is_empty() {
        return Ok(TableSelection {
            source_types: DataType::ALL.to_vec(),
            lexicon: true,
        });
    }

    let mut source_types = Vec::new();
    let mut lexicon = false;
    for table in tables {
        if table == AUTOCOMPLETE_LEXICON {
            lexicon = true;
        } else if let Some(dt) = DataType::from_name(table) {
            if !source_types.contains(&dt) {
                source_types.push(dt);
            }
        } else {
            let valid: Vec<&str> = DataType::ALL.iter().map(|dt| dt.name()).collect();
            bail!(
                "invalid table `{table}`. Valid tables are: {}, {AUTOCOMPLETE_LEXICON}",
                valid.join(", ")
            );
        }
    }

    Ok(TableSelection {
        source_types,
        lexicon,
    })
}

fn load_language(
    language: &str,
    options: &LoadOptions,
    selection: &TableSelection,
) -> Result<LanguageOutcome> {
    let lang_dir = options.json_dir.join(language);

    // Requesting the lexicon forces its prerequisite source tables in, even
    // when they were not separately requested.
    let mut wanted = selection.source_types.clone();
    if selection.lexicon {
        for dt in LEXICON_PREREQUISITES {
            if !wanted.contains(&dt) {
                wanted.push(dt);
            }
        }
    }

    // A data type without a source file is simply absent for this language.
    let present: Vec<DataType> = wanted
        .into_iter()
        .filter(|dt| lang_dir.join(format!("{}.json", dt.name())).exists())
        .collect();
    if present.is_empty() {
        return Ok(LanguageOutcome::NoData);
    }

    let file_name = language::database_file_name(language)
        .ok_or_else(|| anyhow!("no ISO code registered for language `{language}`"))?;
    let db_path = options.sqlite_dir.join(file_name);
    let mut store = LanguageStore::create(&db_path)?;

    let mut materialized: HashSet<DataType> = HashSet::new();
    for dt in &present {
        match materialize_data_type(*dt, language, &lang_dir, &mut store) {
            Ok(rows) => {
                debug!(language = %language, table = %dt, rows, "table rebuilt");
                materialized.insert(*dt);
            }
            Err(e) => {
                warn!(language = %language, table = %dt, error = %format!("{e:#}"), "skipping table");
            }
        }
    }

    if selection.lexicon {
        if LEXICON_PREREQUISITES.iter().all(|dt| materialized.contains(dt)) {
            // A merge failure is reported but does not abort the language:
            // the source tables above are already in place.
            match build_autocomplete_lexicon(&mut store) {
                Ok(rows) => info!(language = %language, rows, "autocomplete lexicon rebuilt"),
                Err(e) => {
                    warn!(language = %language, error = %format!("{e:#}"), "autocomplete lexicon failed")
                }
            }
        } else {
            debug!(language = %language, "lexicon prerequisites missing; lexicon skipped");
        }
    }

    let path = store.finish()?;
    Ok(LanguageOutcome::Written(path))
}

fn materialize_data_type(
    data_type: DataType,
    language: &str,
    lang_dir: &Path,
    store: &mut LanguageStore,
) -> Result<usize> {
    let json_path = lang_dir.join(format!("{}.json", data_type.name()));
    let raw = fs::read_to_string(&json_path)
        .with_context(|| format!("read {}", json_path.display()))?;
    let doc: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parse {}", json_path.display()))?;
    let table = extract(data_type, language, &doc)?;
    store.materialize(&table.schema, &table.rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_covers_all_tables_and_the_lexicon() {
        let selection = select_tables(&[]).unwrap();
        assert_eq!(selection.source_types, DataType::ALL.to_vec());
        assert!(selection.lexicon);
    }

    #[test]
    fn explicit_selection_keeps_only_named_tables() {
        let selection = select_tables(&["nouns".to_string(), "verbs".to_string()]).unwrap();
        assert_eq!(
            selection.source_types,
            vec![DataType::Nouns, DataType::Verbs]
        );
        assert!(!selection.lexicon);
    }

    #[test]
    fn lexicon_only_selection_is_recognized() {
        let selection = select_tables(&[AUTOCOMPLETE_LEXICON.to_string()]).unwrap();
        assert!(selection.source_types.is_empty());
        assert!(selection.lexicon);
    }

    #[test]
    fn unknown_table_names_are_configuration_errors() {
        let err = select_tables(&["adjectives".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Valid tables are"));
    }
}
