//! Lexbase CLI
//!
//! Materializes per-language lexical JSON packs into one SQLite database per
//! language, then derives the `autocomplete_lexicon` table from the
//! materialized relations.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod load;

use load::{run, LoadOptions, LoadReport};

#[derive(Parser)]
#[command(name = "lexbase")]
#[command(
    author,
    version,
    about = "Materialize language data packs into per-language SQLite databases"
)]
struct Cli {
    /// Reference catalog of known languages (total_data.json)
    #[arg(long)]
    catalog: PathBuf,

    /// Directory holding one subdirectory of JSON documents per language
    #[arg(long, default_value = "export_json")]
    json_dir: PathBuf,

    /// Output directory for the per-language SQLite databases
    #[arg(long, default_value = "export_sqlite")]
    sqlite_dir: PathBuf,

    /// Languages to process, comma separated (default: every catalog language)
    #[arg(long, value_delimiter = ',')]
    languages: Vec<String>,

    /// Tables to rebuild: the six source data types and/or
    /// autocomplete_lexicon (default: all of them)
    #[arg(long, value_delimiter = ',')]
    tables: Vec<String>,
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let report = run(&LoadOptions {
        catalog_path: cli.catalog,
        json_dir: cli.json_dir,
        sqlite_dir: cli.sqlite_dir,
        languages: cli.languages,
        tables: cli.tables,
    })?;

    print_summary(&report);

    if report.failures.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn print_summary(report: &LoadReport) {
    println!(
        "{} {} database(s) written",
        "done:".green().bold(),
        report.databases_written.len()
    );
    for language in &report.skipped {
        println!(
            "  {} {language}: no relevant JSON data files",
            "skipped".yellow()
        );
    }
    for (language, error) in &report.failures {
        println!("  {} {language}: {error}", "failed".red());
    }
}
