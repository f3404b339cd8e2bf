//! Example citation parser
//!
//! Examples use the translation citation syntax, but the excerpt may end in a
//! bibliographic reference opened by a single `[`:
//!
//! ```text
//! Ну ты даёшь! [Иванов. Повесть о ... (1999–2001)][[русский]]
//! Вот так так. [Петров // «Огонёк», 1987][[русский]]
//! ```
//!
//! The reference is matched against [`CITATION_GRAMMARS`] in order. What it
//! yields is logged only; the excerpt itself is looked up in the translation
//! registry.

use super::translations::parse_citation;
use super::split_citations;
use crate::diagnostics::{Diagnostics, Issue};
use crate::fields::Field;
use crate::registry::{Id, Registry, TranslationKey};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sqlx::SqlitePool;
use tracing::debug;

/// Bibliographic data extracted from a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub author: String,
    pub book: String,
    pub date: String,
}

/// A named reference grammar
pub struct CitationGrammar {
    pub name: &'static str,
    pattern: Regex,
    extract: fn(&Captures<'_>) -> Result<Citation, String>,
}

/// Result of matching a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationOutcome {
    Matched {
        grammar: &'static str,
        citation: Citation,
    },
    /// A grammar matched but its captures could not be split unambiguously
    Anomaly {
        grammar: &'static str,
        detail: String,
    },
    /// No grammar matched
    Unresolved,
}

fn dated_book(caps: &Captures<'_>) -> Result<Citation, String> {
    let prefix = caps[1].trim();
    let prefix = prefix.strip_suffix('.').unwrap_or(prefix).trim_end();

    let segments: Vec<&str> = prefix.split('.').map(str::trim).collect();
    match segments.as_slice() {
        [author, book] if !author.is_empty() && !book.is_empty() => Ok(Citation {
            author: author.to_string(),
            book: book.to_string(),
            date: caps[2].to_string(),
        }),
        [_] => Err(format!("no author/book separator in '{}'", prefix)),
        [_, _] => Err(format!("empty author or book in '{}'", prefix)),
        _ => Err(format!("more than one author/book separator in '{}'", prefix)),
    }
}

fn periodical(caps: &Captures<'_>) -> Result<Citation, String> {
    Ok(Citation {
        author: caps[1].trim().to_string(),
        book: caps[2].trim().to_string(),
        date: caps[3].to_string(),
    })
}

/// Reference grammars in priority order
pub static CITATION_GRAMMARS: Lazy<Vec<CitationGrammar>> = Lazy::new(|| {
    vec![
        // Author. Book (1999–2001)]
        CitationGrammar {
            name: "dated-book",
            pattern: Regex::new(r"^(.*?)\(([\d–.]+)\)\]$").expect("valid dated-book pattern"),
            extract: dated_book,
        },
        // Author // «Periodical», 1987]
        CitationGrammar {
            name: "periodical",
            pattern: Regex::new(r"^(.*?)\s*//\s*«(.*?)»,\s+([\d–.]+)\]$")
                .expect("valid periodical pattern"),
            extract: periodical,
        },
    ]
});

/// Unify dash spellings to an en-dash
pub fn normalize_dashes(text: &str) -> String {
    text.replace("--", "–").replace('-', "–")
}

/// Match a reference (the text after `[`, including the closing `]`)
pub fn parse_reference(reference: &str) -> CitationOutcome {
    let reference = normalize_dashes(reference.trim());

    for grammar in CITATION_GRAMMARS.iter() {
        if let Some(caps) = grammar.pattern.captures(&reference) {
            return match (grammar.extract)(&caps) {
                Ok(citation) => CitationOutcome::Matched {
                    grammar: grammar.name,
                    citation,
                },
                Err(detail) => CitationOutcome::Anomaly {
                    grammar: grammar.name,
                    detail,
                },
            };
        }
    }

    CitationOutcome::Unresolved
}

/// Split an example excerpt into its text and optional reference
pub fn split_reference(excerpt: &str) -> (&str, Option<&str>) {
    match excerpt.split_once('[') {
        Some((text, reference)) => (text.trim(), Some(reference)),
        None => (excerpt.trim(), None),
    }
}

/// Resolve every example in a cell
///
/// Each example is looked up in the translation registry by (text, language).
/// A miss leaves a hole unless `register` is set, in which case the pair is
/// inserted like a translation.
pub async fn decode(
    pool: &SqlitePool,
    translations: &mut Registry<TranslationKey>,
    diagnostics: &mut Diagnostics,
    field: Field,
    content: &str,
    register: bool,
) -> Vec<Option<Id>> {
    let mut ids = Vec::new();

    for raw in split_citations(content.trim()) {
        let example = raw.trim();
        let parsed = match parse_citation(example) {
            Ok(parsed) => parsed,
            Err(rejection) => {
                diagnostics.report(rejection.into_issue(field, example));
                continue;
            }
        };

        let (text, reference) = split_reference(parsed.excerpt);
        if let Some(reference) = reference {
            match parse_reference(reference) {
                CitationOutcome::Matched { grammar, citation } => {
                    debug!(
                        grammar,
                        author = %citation.author,
                        book = %citation.book,
                        date = %citation.date,
                        "example citation"
                    );
                }
                CitationOutcome::Anomaly { grammar, detail } => {
                    diagnostics.report(Issue::format_mismatch(
                        field.as_str(),
                        reference,
                        format!("{} reference: {}", grammar, detail),
                    ));
                }
                CitationOutcome::Unresolved => {
                    diagnostics.report(Issue::format_mismatch(
                        field.as_str(),
                        reference,
                        "unresolved bibliographic reference",
                    ));
                }
            }
        }

        let key = TranslationKey::new(text, parsed.code);
        let id = if register {
            translations.resolve(pool, key, diagnostics).await
        } else {
            translations.lookup(&key)
        };
        ids.push(id);
    }

    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::IssueKind;
    use prag_common::db::{open_in_memory, reset_schema};

    async fn setup() -> SqlitePool {
        let pool = open_in_memory().await.unwrap();
        reset_schema(&pool).await.unwrap();
        pool
    }

    #[test]
    fn test_dated_book_reference() {
        let outcome = parse_reference("Людмила Улицкая. Казус Кукоцкого (2000)]");
        assert_eq!(
            outcome,
            CitationOutcome::Matched {
                grammar: "dated-book",
                citation: Citation {
                    author: "Людмила Улицкая".to_string(),
                    book: "Казус Кукоцкого".to_string(),
                    date: "2000".to_string(),
                },
            }
        );
    }

    #[test]
    fn test_date_range_hyphens_become_en_dash() {
        match parse_reference("Автор. Книга (1999--2001)]") {
            CitationOutcome::Matched { citation, .. } => assert_eq!(citation.date, "1999–2001"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        match parse_reference("Автор. Книга (1999-2001)]") {
            CitationOutcome::Matched { citation, .. } => assert_eq!(citation.date, "1999–2001"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_extra_dot_is_anomaly() {
        let outcome = parse_reference("А. С. Пушкин. Капитанская дочка (1836)]");
        assert!(matches!(
            outcome,
            CitationOutcome::Anomaly { grammar: "dated-book", .. }
        ));
    }

    #[test]
    fn test_periodical_reference() {
        let outcome = parse_reference("Игорь Петров // «Огонёк», 1987]");
        assert_eq!(
            outcome,
            CitationOutcome::Matched {
                grammar: "periodical",
                citation: Citation {
                    author: "Игорь Петров".to_string(),
                    book: "Огонёк".to_string(),
                    date: "1987".to_string(),
                },
            }
        );
    }

    #[test]
    fn test_unresolved_reference() {
        assert_eq!(parse_reference("просто текст]"), CitationOutcome::Unresolved);
    }

    #[test]
    fn test_split_reference() {
        assert_eq!(
            split_reference("Ну ты даёшь! [Автор. Книга (2000)]"),
            ("Ну ты даёшь!", Some("Автор. Книга (2000)]"))
        );
        assert_eq!(split_reference(" Ну! "), ("Ну!", None));
    }

    #[tokio::test]
    async fn test_lookup_only_reuses_registered_translation() {
        let pool = setup().await;
        let mut translations = Registry::new();
        let mut diagnostics = Diagnostics::new();

        let registered = translations
            .resolve(&pool, TranslationKey::new("Oh well", "eng"), &mut diagnostics)
            .await;

        let ids = decode(
            &pool,
            &mut translations,
            &mut diagnostics,
            Field::Examples,
            "Oh well [Автор. Книга (2000)][[англ.]] Ну и ну [Автор. Книга (2001)][[русский]]",
            false,
        )
        .await;

        assert_eq!(ids, vec![registered, None]);
        assert_eq!(translations.inserts(), 1);
        assert_eq!(diagnostics.total(), 0);
    }

    #[tokio::test]
    async fn test_register_mode_inserts_on_miss() {
        let pool = setup().await;
        let mut translations = Registry::new();
        let mut diagnostics = Diagnostics::new();

        let ids = decode(
            &pool,
            &mut translations,
            &mut diagnostics,
            Field::Examples,
            "Ну и ну [Игорь Петров // «Огонёк», 1987][[русский]]",
            true,
        )
        .await;

        assert_eq!(ids.len(), 1);
        assert!(ids[0].is_some());
        assert_eq!(
            translations.lookup(&TranslationKey::new("Ну и ну", "rus")),
            ids[0]
        );
    }

    #[tokio::test]
    async fn test_bad_reference_and_language_are_reported() {
        let pool = setup().await;
        let mut translations = Registry::new();
        let mut diagnostics = Diagnostics::new();

        let ids = decode(
            &pool,
            &mut translations,
            &mut diagnostics,
            Field::Examples,
            "Ну [непонятно][[русский]] Voilà[[фр.]]",
            false,
        )
        .await;

        assert_eq!(ids, vec![None]);
        assert_eq!(diagnostics.count(IssueKind::FormatMismatch), 1);
        assert_eq!(diagnostics.count(IssueKind::UnrecognizedReference), 1);
    }
}
