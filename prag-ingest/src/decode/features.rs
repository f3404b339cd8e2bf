//! Feature list decoder
//!
//! Categorical columns hold `|`-separated values. Each value becomes a
//! Feature scoped to the column's field.

use crate::diagnostics::{Diagnostics, Issue};
use crate::fields::Field;
use crate::registry::{FeatureKey, Id, Registry};
use sqlx::SqlitePool;

/// Non-empty segments of a feature list, in order, duplicates kept
pub fn segments(content: &str) -> impl Iterator<Item = &str> {
    content.split('|').map(str::trim).filter(|s| !s.is_empty())
}

/// Resolve every value of a feature list
///
/// An empty result for a mandatory field is reported as a data-quality
/// issue.
pub async fn decode_list(
    pool: &SqlitePool,
    features: &mut Registry<FeatureKey>,
    diagnostics: &mut Diagnostics,
    field: Field,
    content: &str,
) -> Vec<Option<Id>> {
    let mut ids = Vec::new();
    for value in segments(content) {
        let id = features
            .resolve(pool, FeatureKey::new(field, value), diagnostics)
            .await;
        ids.push(id);
    }

    if ids.is_empty() && field.is_mandatory() {
        diagnostics.report(Issue::data_quality(
            field.as_str(),
            content,
            "mandatory field is empty",
        ));
    }

    ids
}

/// Resolve a single-valued feature column; empty content gives `None`
pub async fn decode_single(
    pool: &SqlitePool,
    features: &mut Registry<FeatureKey>,
    diagnostics: &mut Diagnostics,
    field: Field,
    content: &str,
) -> Option<Id> {
    let value = content.trim();
    if value.is_empty() {
        return None;
    }
    features
        .resolve(pool, FeatureKey::new(field, value), diagnostics)
        .await
}
