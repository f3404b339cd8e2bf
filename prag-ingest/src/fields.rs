//! Field catalog
//!
//! The corpus header names columns in Russian. Each recognized header maps to
//! one canonical [`Field`], and each field to the decoder that reads it.
//! Unrecognized headers are returned when the column map is built.

use std::collections::HashMap;

/// Canonical unit fields, in decode order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Unit,
    ExtRequired,
    Semantics1,
    Semantics,
    Act1,
    ActClass,
    Situation,
    Parts,
    Intonation,
    Extension,
    Mods,
    Gest,
    Organ,
    Translations,
    Examples,
    Audio,
    Video,
    Style,
    Comment,
    Construction,
    Link,
}

/// How a boolean column is derived from its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagRule {
    /// true when the cell is non-empty
    NonEmpty,
    /// true when the trimmed cell equals the given marker
    Equals(&'static str),
}

/// Decoder assigned to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// Token/expression/phrase vectorizer
    Phrase,
    Flag(FlagRule),
    /// Value is only an input to another field's decoder
    Held,
    FeatureList,
    SingleFeature,
    Text,
    Translations,
    Examples,
}

/// One row of the static field table
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub field: Field,
    pub name: &'static str,
    pub header: &'static str,
    pub decoder: Decoder,
}

/// Marker value of the `parts` column for three-part constructions
pub const THREE_PART_MARKER: &str = "трехчастная";

pub const FIELD_TABLE: [FieldSpec; 21] = [
    FieldSpec {
        field: Field::Unit,
        name: "unit",
        header: "ДФ",
        decoder: Decoder::Phrase,
    },
    FieldSpec {
        field: Field::ExtRequired,
        name: "extrequired",
        header: "требуется продолжение",
        decoder: Decoder::Flag(FlagRule::NonEmpty),
    },
    FieldSpec {
        field: Field::Semantics1,
        name: "semantics1",
        header: "основная семантика",
        decoder: Decoder::Held,
    },
    FieldSpec {
        field: Field::Semantics,
        name: "semantics",
        header: "дополнительная семантика",
        decoder: Decoder::FeatureList,
    },
    FieldSpec {
        field: Field::Act1,
        name: "act1",
        header: "речевой акт 1 (для трехчастных)",
        decoder: Decoder::FeatureList,
    },
    FieldSpec {
        field: Field::ActClass,
        name: "actclass",
        header: "тип речевого акта (собеседник)",
        decoder: Decoder::FeatureList,
    },
    FieldSpec {
        field: Field::Situation,
        name: "situation",
        header: "о ситуации",
        decoder: Decoder::Text,
    },
    FieldSpec {
        field: Field::Parts,
        name: "parts",
        header: "структура",
        decoder: Decoder::Flag(FlagRule::Equals(THREE_PART_MARKER)),
    },
    FieldSpec {
        field: Field::Intonation,
        name: "intonation",
        header: "интонация",
        decoder: Decoder::SingleFeature,
    },
    FieldSpec {
        field: Field::Extension,
        name: "extension",
        header: "продолжение",
        decoder: Decoder::FeatureList,
    },
    FieldSpec {
        field: Field::Mods,
        name: "mods",
        header: "модификации",
        decoder: Decoder::Text,
    },
    FieldSpec {
        field: Field::Gest,
        name: "gest",
        header: "жестикуляция",
        decoder: Decoder::FeatureList,
    },
    FieldSpec {
        field: Field::Organ,
        name: "organ",
        header: "активный орган",
        decoder: Decoder::FeatureList,
    },
    FieldSpec {
        field: Field::Translations,
        name: "translations",
        header: "переводные аналоги",
        decoder: Decoder::Translations,
    },
    FieldSpec {
        field: Field::Examples,
        name: "examples",
        header: "Примеры",
        decoder: Decoder::Examples,
    },
    FieldSpec {
        field: Field::Audio,
        name: "audio",
        header: "Аудио",
        decoder: Decoder::Text,
    },
    FieldSpec {
        field: Field::Video,
        name: "video",
        header: "Видео",
        decoder: Decoder::Text,
    },
    FieldSpec {
        field: Field::Style,
        name: "style",
        header: "уст.|груб.|нейтр.",
        decoder: Decoder::SingleFeature,
    },
    FieldSpec {
        field: Field::Comment,
        name: "comment",
        header: "Комментарий",
        decoder: Decoder::Text,
    },
    FieldSpec {
        field: Field::Construction,
        name: "construction",
        header: "конструкция",
        decoder: Decoder::Text,
    },
    FieldSpec {
        field: Field::Link,
        name: "link",
        header: "ссылка на конструктикон",
        decoder: Decoder::Text,
    },
];

impl Field {
    /// All fields in decode order
    pub fn all() -> impl Iterator<Item = Field> {
        FIELD_TABLE.iter().map(|spec| spec.field)
    }

    pub fn spec(self) -> &'static FieldSpec {
        // FIELD_TABLE is declared in enum order
        &FIELD_TABLE[self as usize]
    }

    /// Canonical identifier, also the feature scope name
    pub fn as_str(self) -> &'static str {
        self.spec().name
    }

    /// Source header text
    pub fn header(self) -> &'static str {
        self.spec().header
    }

    pub fn decoder(self) -> Decoder {
        self.spec().decoder
    }

    /// Fields that must carry at least one value
    pub fn is_mandatory(self) -> bool {
        matches!(self, Field::ActClass)
    }

    /// Map a source header (surrounding whitespace ignored)
    pub fn from_header(header: &str) -> Option<Field> {
        let header = header.trim();
        FIELD_TABLE
            .iter()
            .find(|spec| spec.header == header)
            .map(|spec| spec.field)
    }
}

/// Header row resolved to fields, by column index
#[derive(Debug, Clone)]
pub struct ColumnMap {
    headers: Vec<String>,
    columns: Vec<Option<Field>>,
}

impl ColumnMap {
    /// Build the map; unrecognized headers are returned for reporting and
    /// their columns are ignored
    pub fn from_header(header: &[String]) -> (Self, Vec<String>) {
        let mut unknown = Vec::new();
        let columns = header
            .iter()
            .map(|h| {
                let field = Field::from_header(h);
                if field.is_none() {
                    unknown.push(h.clone());
                }
                field
            })
            .collect();

        (
            Self {
                headers: header.to_vec(),
                columns,
            },
            unknown,
        )
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn field_at(&self, index: usize) -> Option<Field> {
        self.columns.get(index).copied().flatten()
    }

    pub fn header_at(&self, index: usize) -> Option<&str> {
        self.headers.get(index).map(String::as_str)
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.columns.contains(&Some(field))
    }

    /// Bind a data row to fields. Short rows leave fields absent; when a
    /// field appears in more than one column the last one wins.
    pub fn bind<'r>(&self, row: &'r [String]) -> HashMap<Field, &'r str> {
        self.columns
            .iter()
            .zip(row.iter())
            .filter_map(|(field, cell)| field.map(|f| (f, cell.as_str())))
            .collect()
    }
}
