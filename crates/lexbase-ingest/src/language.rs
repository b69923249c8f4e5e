//! Language registry: ISO codes and per-language lexicon quirks.

/// Languages with shipped data packs, paired with their ISO 639-1 codes.
const LANGUAGES: &[(&str, &str)] = &[
    ("English", "en"),
    ("French", "fr"),
    ("German", "de"),
    ("Italian", "it"),
    ("Portuguese", "pt"),
    ("Russian", "ru"),
    ("Spanish", "es"),
    ("Swedish", "sv"),
];

/// Languages for which the synthesized `["Scribe", "Scribes", ""]` noun row
/// is suppressed because the language's own word for "Scribe" collides with
/// conjugation rows.
///
/// Review before extending data coverage: the collision is only verified
/// for Russian, and other languages may share it.
const SCRIBE_ROW_EXCLUSIONS: &[&str] = &["Russian"];

pub fn iso_code(language: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(name, _)| *name == language)
        .map(|(_, iso)| *iso)
}

/// Database file name for one language: ISO code upper-cased, suffixed
/// `LanguageData.sqlite`. `None` if the language has no registered ISO code.
pub fn database_file_name(language: &str) -> Option<String> {
    iso_code(language).map(|iso| format!("{}LanguageData.sqlite", iso.to_uppercase()))
}

/// Whether the nouns table for this language gets a synthesized `Scribe`
/// row when the source document does not already carry one.
pub fn wants_scribe_row(language: &str) -> bool {
    !SCRIBE_ROW_EXCLUSIONS.contains(&language)
}
