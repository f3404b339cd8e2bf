//! Translation citation parser
//!
//! Cells hold citations of the form `excerpt[[язык]]` (optionally `[[язык.]]`),
//! one after another. Each citation with a known language registers an
//! (excerpt, ISO code) translation.

use super::{language_name, split_citations, split_language};
use crate::diagnostics::{Diagnostics, Issue};
use crate::fields::Field;
use crate::languages::{is_source_language, iso_code};
use crate::registry::{Id, Registry, TranslationKey};
use sqlx::SqlitePool;

/// A citation whose markers and language were understood
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCitation<'a> {
    pub excerpt: &'a str,
    pub language: &'a str,
    pub code: &'static str,
}

/// Why a citation was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// `[[` missing or repeated
    Markers,
    /// Language name outside the code table
    UnknownLanguage(String),
}

impl Rejection {
    /// Report this rejection for a field
    pub fn into_issue(self, field: Field, citation: &str) -> Issue {
        match self {
            Rejection::Markers => Issue::format_mismatch(
                field.as_str(),
                citation,
                "citation does not match excerpt[[language]]",
            ),
            Rejection::UnknownLanguage(name) => Issue::unrecognized(
                field.as_str(),
                citation,
                format!("language '{}' is not in the language list", name),
            ),
        }
    }
}

/// Parse one citation
pub fn parse_citation(citation: &str) -> Result<LanguageCitation<'_>, Rejection> {
    let (excerpt, lang_part) = split_language(citation).ok_or(Rejection::Markers)?;
    let language = language_name(lang_part);
    let code = iso_code(language).ok_or_else(|| Rejection::UnknownLanguage(language.to_string()))?;

    Ok(LanguageCitation {
        excerpt: excerpt.trim(),
        language,
        code,
    })
}

/// Resolve every citation in a translations cell
///
/// Citations into the corpus language are reported as a data-quality issue
/// and still registered.
pub async fn decode(
    pool: &SqlitePool,
    translations: &mut Registry<TranslationKey>,
    diagnostics: &mut Diagnostics,
    field: Field,
    content: &str,
) -> Vec<Option<Id>> {
    let mut ids = Vec::new();

    for citation in split_citations(content.trim()) {
        let parsed = match parse_citation(&citation) {
            Ok(parsed) => parsed,
            Err(rejection) => {
                diagnostics.report(rejection.into_issue(field, &citation));
                continue;
            }
        };

        if is_source_language(parsed.code) {
            diagnostics.report(Issue::data_quality(
                field.as_str(),
                citation.as_str(),
                "translation into the corpus language",
            ));
        }

        let id = translations
            .resolve(pool, TranslationKey::new(parsed.excerpt, parsed.code), diagnostics)
            .await;
        ids.push(id);
    }

    ids
}
