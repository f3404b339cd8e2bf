//! Identity registries
//!
//! A registry maps a key to the ID of its row in a uniquely-constrained
//! table. The first resolution of a key inserts the row and caches the
//! returned ID; later resolutions are answered from the cache without
//! touching the database.
//!
//! Resolution takes `&mut self`, so two resolutions against one registry can
//! never interleave between the cache check and the insert.

use crate::diagnostics::{Diagnostics, Issue};
use crate::fields::Field;
use serde_json::json;
use sqlx::query::QueryScalar;
use sqlx::{Sqlite, SqlitePool};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use tracing::debug;

/// Row ID assigned by the backing table
pub type Id = i64;

/// Insert statement returning the new row ID
pub type InsertQuery<'q> = QueryScalar<'q, Sqlite, Id, <Sqlite as sqlx::Database>::Arguments<'q>>;

/// A value with its own registry table
pub trait RegistryKey: Eq + Hash + Clone + fmt::Debug {
    /// Registry (and table) name used in logs
    const NAME: &'static str;

    /// `INSERT ... RETURNING id`
    const INSERT_SQL: &'static str;

    /// Bind this key's columns to the insert statement
    fn bind_insert<'q>(&'q self, query: InsertQuery<'q>) -> InsertQuery<'q>;
}

/// Canonical stored form of an ID sequence. Holes become `null`.
pub fn id_array_json(ids: &[Option<Id>]) -> String {
    json!(ids).to_string()
}

/// Surface token text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenKey(pub String);

impl RegistryKey for TokenKey {
    const NAME: &'static str = "tokens";
    const INSERT_SQL: &'static str = "INSERT INTO tokens (token) VALUES (?) RETURNING id";

    fn bind_insert<'q>(&'q self, query: InsertQuery<'q>) -> InsertQuery<'q> {
        query.bind(self.0.as_str())
    }
}

/// Ordered token IDs of one expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExprKey(pub Vec<Option<Id>>);

impl RegistryKey for ExprKey {
    const NAME: &'static str = "exprs";
    const INSERT_SQL: &'static str = "INSERT INTO exprs (expr) VALUES (?) RETURNING id";

    fn bind_insert<'q>(&'q self, query: InsertQuery<'q>) -> InsertQuery<'q> {
        query.bind(id_array_json(&self.0))
    }
}

/// Ordered expression IDs of one phrase
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhraseKey(pub Vec<Option<Id>>);

impl RegistryKey for PhraseKey {
    const NAME: &'static str = "phrases";
    const INSERT_SQL: &'static str = "INSERT INTO phrases (phrase) VALUES (?) RETURNING id";

    fn bind_insert<'q>(&'q self, query: InsertQuery<'q>) -> InsertQuery<'q> {
        query.bind(id_array_json(&self.0))
    }
}

/// Categorical value scoped to its field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureKey {
    pub field: Field,
    pub value: String,
}

impl FeatureKey {
    pub fn new(field: Field, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

impl RegistryKey for FeatureKey {
    const NAME: &'static str = "features";
    const INSERT_SQL: &'static str =
        "INSERT INTO features (field, value) VALUES (?, ?) RETURNING id";

    fn bind_insert<'q>(&'q self, query: InsertQuery<'q>) -> InsertQuery<'q> {
        query.bind(self.field.as_str()).bind(self.value.as_str())
    }
}

/// Excerpt with its ISO 639-2 language code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationKey {
    pub excerpt: String,
    pub lang: &'static str,
}

impl TranslationKey {
    pub fn new(excerpt: impl Into<String>, lang: &'static str) -> Self {
        Self {
            excerpt: excerpt.into(),
            lang,
        }
    }
}

impl RegistryKey for TranslationKey {
    const NAME: &'static str = "translations";
    const INSERT_SQL: &'static str =
        "INSERT INTO translations (excerpt, lang) VALUES (?, ?) RETURNING id";

    fn bind_insert<'q>(&'q self, query: InsertQuery<'q>) -> InsertQuery<'q> {
        query.bind(self.excerpt.as_str()).bind(self.lang)
    }
}

/// Memoized key → ID resolver over one table
#[derive(Debug)]
pub struct Registry<K: RegistryKey> {
    cache: HashMap<K, Id>,
    inserts: usize,
}

impl<K: RegistryKey> Default for Registry<K> {
    fn default() -> Self {
        Self {
            cache: HashMap::new(),
            inserts: 0,
        }
    }
}

impl<K: RegistryKey> Registry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached ID, without inserting on a miss
    pub fn lookup(&self, key: &K) -> Option<Id> {
        self.cache.get(key).copied()
    }

    /// Cached ID, or insert the key and cache the new ID
    ///
    /// A failed insert is reported as a persistence conflict and resolves to
    /// `None`; the key stays uncached.
    pub async fn resolve(
        &mut self,
        pool: &SqlitePool,
        key: K,
        diagnostics: &mut Diagnostics,
    ) -> Option<Id> {
        if let Some(id) = self.cache.get(&key) {
            return Some(*id);
        }

        let result = key
            .bind_insert(sqlx::query_scalar(K::INSERT_SQL))
            .fetch_one(pool)
            .await;

        match result {
            Ok(id) => {
                debug!(registry = K::NAME, id, key = ?key, "registered");
                self.cache.insert(key, id);
                self.inserts += 1;
                Some(id)
            }
            Err(e) => {
                diagnostics.report(Issue::persistence(
                    K::NAME,
                    format!("{:?}", key),
                    e.to_string(),
                ));
                None
            }
        }
    }

    /// Number of cached keys
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Number of rows this registry inserted
    pub fn inserts(&self) -> usize {
        self.inserts
    }
}

/// The five registries of one ingest run
#[derive(Debug, Default)]
pub struct Registries {
    pub tokens: Registry<TokenKey>,
    pub exprs: Registry<ExprKey>,
    pub phrases: Registry<PhraseKey>,
    pub features: Registry<FeatureKey>,
    pub translations: Registry<TranslationKey>,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }
}
