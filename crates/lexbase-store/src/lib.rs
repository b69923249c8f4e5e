//! SQLite materialization for per-language lexical relations.
//!
//! A [`LanguageStore`] stages a fresh database file next to its final path
//! and only renames it into place on [`LanguageStore::finish`], so an
//! existing database is replaced atomically and never observed half-built.
//!
//! Every table is fully rebuilt on each run: create if absent, clear,
//! insert with duplicate-key suppression, all inside one transaction per
//! data type.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use lexbase_ingest::TableSchema;

pub mod lexicon;

pub use lexicon::{build_autocomplete_lexicon, LEXICON_PREREQUISITES};

/// Extension of the staging file a store writes to before `finish` renames
/// it over the final path. A stale staging file from an aborted run is
/// removed on the next `create`.
const STAGING_EXTENSION: &str = "sqlite.staging";

/// One language's database while it is being (re)built.
pub struct LanguageStore {
    conn: Connection,
    staging_path: PathBuf,
    final_path: PathBuf,
}

impl LanguageStore {
    /// Open a staging database for the language database at `path`.
    ///
    /// Nothing at `path` itself is touched until [`LanguageStore::finish`].
    pub fn create(path: &Path) -> Result<LanguageStore> {
        let staging_path = path.with_extension(STAGING_EXTENSION);
        if staging_path.exists() {
            fs::remove_file(&staging_path).with_context(|| {
                format!("remove stale staging file {}", staging_path.display())
            })?;
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create output directory {}", parent.display()))?;
            }
        }

        let conn = Connection::open(&staging_path)
            .with_context(|| format!("open staging database {}", staging_path.display()))?;

        Ok(LanguageStore {
            conn,
            staging_path,
            final_path: path.to_path_buf(),
        })
    }

    /// Rebuild one table: ensure it exists with all-text columns and a
    /// unique key column, clear it, and insert every row with
    /// `INSERT OR IGNORE` so the first occurrence of a key wins.
    ///
    /// Returns the number of rows actually inserted. The whole rebuild is
    /// one transaction; a failure leaves the table untouched.
    pub fn materialize(&mut self, schema: &TableSchema, rows: &[Vec<String>]) -> Result<usize> {
        let create_sql = create_table_sql(schema);
        let insert_sql = insert_sql(schema);
        let clear_sql = format!("DELETE FROM {}", quoted(&schema.table));

        let tx = self.conn.transaction()?;
        tx.execute(&create_sql, [])?;
        tx.execute(&clear_sql, [])?;

        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for row in rows {
                ensure!(
                    row.len() == schema.columns.len(),
                    "row for `{}` has {} values, schema declares {} columns",
                    schema.table,
                    row.len(),
                    schema.columns.len()
                );
                inserted += stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;

        debug!(table = %schema.table, rows = inserted, "materialized table");
        Ok(inserted)
    }

    /// All values of one column, in rowid order.
    pub fn column_values(&self, table: &str, column: &str) -> Result<Vec<String>> {
        let sql = format!("SELECT {} FROM {}", quoted(column), quoted(table));
        let mut stmt = self.conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
        Ok(stmt.exists([table])?)
    }

    /// Close the staged database and rename it over the final path,
    /// replacing any previous database file in one step.
    pub fn finish(self) -> Result<PathBuf> {
        let LanguageStore {
            conn,
            staging_path,
            final_path,
        } = self;

        conn.close()
            .map_err(|(_, e)| e)
            .context("close staged database")?;
        fs::rename(&staging_path, &final_path)
            .with_context(|| format!("replace database {}", final_path.display()))?;
        Ok(final_path)
    }
}

/// Quote an identifier. Identifiers only ever come from the static schema
/// catalog or validated verb attribute keys, but they are quoted anyway
/// instead of being interpolated raw.
fn quoted(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn create_table_sql(schema: &TableSchema) -> String {
    let columns = schema
        .columns
        .iter()
        .map(|c| format!("{} Text", quoted(c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({columns}, UNIQUE({}))",
        quoted(&schema.table),
        quoted(schema.key_column())
    )
}

fn insert_sql(schema: &TableSchema) -> String {
    let marks = vec!["?"; schema.columns.len()].join(", ");
    format!("INSERT OR IGNORE INTO {} VALUES ({marks})", quoted(&schema.table))
}
