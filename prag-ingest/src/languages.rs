//! Controlled vocabulary of citation languages
//!
//! Citations name their language with a Cyrillic shorthand; codes are
//! ISO 639-2 (https://www.loc.gov/standards/iso639-2/php/code_list.php).

/// Language of the corpus itself
pub const SOURCE_LANGUAGE: &str = "rus";

const LANGUAGE_CODES: [(&str, &str); 8] = [
    ("тадж", "tgk"),
    ("англ", "eng"),
    ("фин", "fin"),
    ("бур", "bua"),
    ("ивр", "heb"),
    ("ит", "ita"),
    ("слвн", "slv"),
    ("русский", "rus"),
];

/// ISO 639-2 code for a Cyrillic language name
pub fn iso_code(name: &str) -> Option<&'static str> {
    LANGUAGE_CODES
        .iter()
        .find(|(ru, _)| *ru == name)
        .map(|(_, code)| *code)
}

pub fn is_source_language(code: &str) -> bool {
    code == SOURCE_LANGUAGE
}
