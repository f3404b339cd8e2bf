//! Field decoders
//!
//! Each decoder reads one cell mini-language and resolves what it finds
//! through the registries. Decoders report problems to [`Diagnostics`] and
//! always return a value; a problem shrinks or leaves a hole in the output,
//! it never fails the row.
//!
//! [`Diagnostics`]: crate::diagnostics::Diagnostics

pub mod examples;
pub mod features;
pub mod phrase;
pub mod translations;

/// Opening marker of a citation's language annotation
pub const LANG_OPEN: &str = "[[";
/// Closing marker of a citation's language annotation
pub const LANG_CLOSE: &str = "]]";

/// Split a citation list into citations
///
/// `|` is decoration and is removed. A citation ends right after each `]]`;
/// whitespace following the marker is dropped. Text after the last marker
/// forms a final citation of its own (which then fails marker validation).
pub fn split_citations(content: &str) -> Vec<String> {
    let cleaned = content.replace('|', "");
    let mut citations = Vec::new();
    let mut rest = cleaned.as_str();

    while let Some(pos) = rest.find(LANG_CLOSE) {
        let end = pos + LANG_CLOSE.len();
        citations.push(rest[..end].to_string());
        rest = rest[end..].trim_start();
    }
    if !rest.is_empty() {
        citations.push(rest.to_string());
    }

    citations
}

/// Split a citation on `[[` into (excerpt, language part); `None` unless the
/// marker occurs exactly once
pub fn split_language(citation: &str) -> Option<(&str, &str)> {
    let mut parts = citation.split(LANG_OPEN);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(excerpt), Some(lang), None) => Some((excerpt, lang)),
        _ => None,
    }
}

/// Recover the bare language name from `name]]` or `name.]]`
pub fn language_name(lang_part: &str) -> &str {
    let name = lang_part.strip_suffix(LANG_CLOSE).unwrap_or(lang_part);
    name.strip_suffix('.').unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_citations_on_closing_marker() {
        let citations = split_citations("Hello[[англ.]] | Ciao[[ит.]]");
        assert_eq!(citations, vec!["Hello[[англ.]]", "Ciao[[ит.]]"]);
    }

    #[test]
    fn test_split_citations_keeps_trailing_text() {
        let citations = split_citations("Hello[[англ.]] dangling");
        assert_eq!(citations, vec!["Hello[[англ.]]", "dangling"]);
    }

    #[test]
    fn test_split_citations_empty() {
        assert!(split_citations("").is_empty());
        assert!(split_citations("|").is_empty());
    }

    #[test]
    fn test_split_language() {
        assert_eq!(split_language("Hi[[англ.]]"), Some(("Hi", "англ.]]")));
        assert_eq!(split_language("no marker"), None);
        assert_eq!(split_language("a[[b[[c]]"), None);
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("англ.]]"), "англ");
        assert_eq!(language_name("русский]]"), "русский");
        assert_eq!(language_name("фин"), "фин");
    }
}
