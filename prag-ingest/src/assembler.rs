//! Row assembly
//!
//! Binds a data row to fields, runs each field's decoder in canonical order
//! and writes the resulting unit.

use crate::decode::{examples, features, phrase, translations};
use crate::diagnostics::{Diagnostics, Issue};
use crate::fields::{ColumnMap, Decoder, Field, FlagRule};
use crate::registry::{id_array_json, Id, Registries};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::debug;

/// Decoder settings that do not change during a run
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyOptions {
    /// Insert example excerpts missing from the translation registry
    pub register_examples: bool,
}

/// One normalized unit, ready to insert
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitRecord {
    pub phrase_id: Option<Id>,
    pub extrequired: bool,
    pub semantics: Vec<Option<Id>>,
    pub act1: Vec<Option<Id>>,
    pub actclass: Vec<Option<Id>>,
    pub situation: Option<String>,
    pub parts: bool,
    pub intonation: Option<Id>,
    pub extension: Vec<Option<Id>>,
    pub mods: Option<String>,
    pub gest: Vec<Option<Id>>,
    pub organ: Vec<Option<Id>>,
    pub translations: Vec<Option<Id>>,
    pub examples: Vec<Option<Id>>,
    pub audio: Option<String>,
    pub video: Option<String>,
    pub style: Option<Id>,
    pub comment: Option<String>,
    pub construction: Option<String>,
    pub link: Option<String>,
}

impl UnitRecord {
    fn set_flag(&mut self, field: Field, value: bool) {
        match field {
            Field::ExtRequired => self.extrequired = value,
            Field::Parts => self.parts = value,
            _ => {}
        }
    }

    fn set_list(&mut self, field: Field, ids: Vec<Option<Id>>) {
        match field {
            Field::Semantics => self.semantics = ids,
            Field::Act1 => self.act1 = ids,
            Field::ActClass => self.actclass = ids,
            Field::Extension => self.extension = ids,
            Field::Gest => self.gest = ids,
            Field::Organ => self.organ = ids,
            Field::Translations => self.translations = ids,
            Field::Examples => self.examples = ids,
            _ => {}
        }
    }

    fn set_single(&mut self, field: Field, id: Option<Id>) {
        match field {
            Field::Intonation => self.intonation = id,
            Field::Style => self.style = id,
            _ => {}
        }
    }

    fn set_text(&mut self, field: Field, text: Option<String>) {
        match field {
            Field::Situation => self.situation = text,
            Field::Mods => self.mods = text,
            Field::Audio => self.audio = text,
            Field::Video => self.video = text,
            Field::Comment => self.comment = text,
            Field::Construction => self.construction = text,
            Field::Link => self.link = text,
            _ => {}
        }
    }
}

fn flag(rule: FlagRule, cell: &str) -> bool {
    match rule {
        FlagRule::NonEmpty => !cell.trim().is_empty(),
        FlagRule::Equals(marker) => cell.trim() == marker,
    }
}

fn text(cell: &str) -> Option<String> {
    let cell = cell.trim();
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Decode one bound row into a unit record
///
/// Fields missing from the row decode as empty cells. `semantics` is decoded
/// with the `semantics1` value prepended, whatever the column order.
pub async fn assemble(
    pool: &SqlitePool,
    registries: &mut Registries,
    diagnostics: &mut Diagnostics,
    options: AssemblyOptions,
    cells: &HashMap<Field, &str>,
) -> UnitRecord {
    let mut unit = UnitRecord::default();

    for field in Field::all() {
        let cell = cells.get(&field).copied().unwrap_or("");

        match field.decoder() {
            Decoder::Phrase => {
                let vector = phrase::vectorize(pool, registries, diagnostics, cell).await;
                debug!(
                    phrase = ?vector.phrase_id,
                    primary_expr = ?vector.primary_expr,
                    exprs = %id_array_json(&vector.expr_ids),
                    "unit vectorized"
                );
                unit.phrase_id = vector.phrase_id;
            }
            Decoder::Flag(rule) => unit.set_flag(field, flag(rule, cell)),
            Decoder::Held => {}
            Decoder::FeatureList => {
                let content = if field == Field::Semantics {
                    let primary = cells.get(&Field::Semantics1).copied().unwrap_or("");
                    format!("{}|{}", primary, cell)
                } else {
                    cell.to_string()
                };
                let ids = features::decode_list(
                    pool,
                    &mut registries.features,
                    diagnostics,
                    field,
                    &content,
                )
                .await;
                unit.set_list(field, ids);
            }
            Decoder::SingleFeature => {
                let id = features::decode_single(
                    pool,
                    &mut registries.features,
                    diagnostics,
                    field,
                    cell,
                )
                .await;
                unit.set_single(field, id);
            }
            Decoder::Text => unit.set_text(field, text(cell)),
            Decoder::Translations => {
                let ids = translations::decode(
                    pool,
                    &mut registries.translations,
                    diagnostics,
                    field,
                    cell,
                )
                .await;
                unit.set_list(field, ids);
            }
            Decoder::Examples => {
                let ids = examples::decode(
                    pool,
                    &mut registries.translations,
                    diagnostics,
                    field,
                    cell,
                    options.register_examples,
                )
                .await;
                unit.set_list(field, ids);
            }
        }
    }

    unit
}

/// Insert a unit, returning its ID
pub async fn save_unit(pool: &SqlitePool, unit: &UnitRecord) -> sqlx::Result<Id> {
    sqlx::query_scalar(
        r#"
        INSERT INTO units (
            phrase_id, extrequired, semantics, act1, actclass, situation, parts,
            intonation, extension, mods, gest, organ, translations, examples,
            audio, video, style, comment, construction, link
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(unit.phrase_id)
    .bind(unit.extrequired)
    .bind(id_array_json(&unit.semantics))
    .bind(id_array_json(&unit.act1))
    .bind(id_array_json(&unit.actclass))
    .bind(&unit.situation)
    .bind(unit.parts)
    .bind(unit.intonation)
    .bind(id_array_json(&unit.extension))
    .bind(&unit.mods)
    .bind(id_array_json(&unit.gest))
    .bind(id_array_json(&unit.organ))
    .bind(id_array_json(&unit.translations))
    .bind(id_array_json(&unit.examples))
    .bind(&unit.audio)
    .bind(&unit.video)
    .bind(unit.style)
    .bind(&unit.comment)
    .bind(&unit.construction)
    .bind(&unit.link)
    .fetch_one(pool)
    .await
}

/// Assemble and write one data row
///
/// A failed unit insert is reported as a persistence conflict and yields
/// `None`.
pub async fn process_row(
    pool: &SqlitePool,
    registries: &mut Registries,
    diagnostics: &mut Diagnostics,
    options: AssemblyOptions,
    column_map: &ColumnMap,
    row: &[String],
) -> Option<Id> {
    let cells = column_map.bind(row);
    let unit = assemble(pool, registries, diagnostics, options, &cells).await;

    match save_unit(pool, &unit).await {
        Ok(id) => Some(id),
        Err(e) => {
            let unit_text = cells.get(&Field::Unit).copied().unwrap_or("");
            diagnostics.report(Issue::persistence("units", unit_text, e.to_string()));
            None
        }
    }
}
