//! Token / expression / phrase vectorizer
//!
//! A unit's text is a `|`-separated list of parts. Each part is tokenized,
//! its tokens resolved to IDs, the token-ID list resolved to an expression,
//! and finally the ordered expression IDs resolved to the phrase the unit
//! points at. Order matters at every level.
//!
//! A token or expression sequence with a hole is never registered, since
//! unrelated texts would all collapse onto `[null]`. The hole moves up a
//! level instead, and a unit without a phrase fails its own insert.

use crate::diagnostics::{Diagnostics, Issue};
use crate::registry::{ExprKey, Id, PhraseKey, Registries, RegistryKey, TokenKey};
use sqlx::SqlitePool;

/// Result of vectorizing one unit text
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseVector {
    /// Phrase the unit links to
    pub phrase_id: Option<Id>,
    /// Expression of the first part
    pub primary_expr: Option<Id>,
    /// Expression IDs of all parts, in order
    pub expr_ids: Vec<Option<Id>>,
    /// Token IDs per part
    pub token_ids: Vec<Vec<Option<Id>>>,
}

/// Split a part into tokens
///
/// Whitespace separates tokens and is dropped. A hyphen starts a new token
/// and stays attached to it, so `пере-дать` gives `пере`, `-дать`. Empty
/// tokens are skipped.
pub fn tokenize(part: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;

    for (pos, ch) in part.char_indices() {
        if ch.is_whitespace() {
            push_token(&mut tokens, &part[start..pos]);
            start = pos + ch.len_utf8();
        } else if ch == '-' {
            push_token(&mut tokens, &part[start..pos]);
            start = pos;
        }
    }
    push_token(&mut tokens, &part[start..]);

    tokens
}

fn push_token<'a>(tokens: &mut Vec<&'a str>, raw: &'a str) {
    let token = raw.trim();
    if !token.is_empty() {
        tokens.push(token);
    }
}

fn has_hole(ids: &[Option<Id>]) -> bool {
    ids.iter().any(Option::is_none)
}

/// Vectorize a unit text and resolve its phrase
pub async fn vectorize(
    pool: &SqlitePool,
    registries: &mut Registries,
    diagnostics: &mut Diagnostics,
    text: &str,
) -> PhraseVector {
    let mut expr_ids = Vec::new();
    let mut token_ids = Vec::new();

    for part in text.split('|') {
        let mut part_tokens = Vec::new();
        for token in tokenize(part) {
            let id = registries
                .tokens
                .resolve(pool, TokenKey(token.to_string()), diagnostics)
                .await;
            part_tokens.push(id);
        }

        let expr_id = if has_hole(&part_tokens) {
            diagnostics.report(Issue::persistence(
                ExprKey::NAME,
                part.trim(),
                "expression has an unregistered token",
            ));
            None
        } else {
            registries
                .exprs
                .resolve(pool, ExprKey(part_tokens.clone()), diagnostics)
                .await
        };

        expr_ids.push(expr_id);
        token_ids.push(part_tokens);
    }

    let phrase_id = if has_hole(&expr_ids) {
        diagnostics.report(Issue::persistence(
            PhraseKey::NAME,
            text.trim(),
            "phrase has an unregistered expression",
        ));
        None
    } else {
        registries
            .phrases
            .resolve(pool, PhraseKey(expr_ids.clone()), diagnostics)
            .await
    };

    PhraseVector {
        phrase_id,
        primary_expr: expr_ids.first().copied().flatten(),
        expr_ids,
        token_ids,
    }
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
    fn test_tokenize_hyphen_boundary() {
        assert_eq!(tokenize("пере-дать слово"), vec!["пере", "-дать", "слово"]);
    }

    #[test]
    fn test_tokenize_skips_empty_tokens() {
        assert_eq!(tokenize("  ну   да "), vec!["ну", "да"]);
        assert_eq!(tokenize("ну - да"), vec!["ну", "-", "да"]);
        assert_eq!(tokenize("a--b"), vec!["a", "-", "-b"]);
        assert!(tokenize("   ").is_empty());
    }

    #[tokio::test]
    async fn test_vectorize_builds_nested_ids() {
        let pool = setup().await;
        let mut registries = Registries::new();
        let mut diagnostics = Diagnostics::new();

        let vector = vectorize(&pool, &mut registries, &mut diagnostics, "ну и ну|да").await;

        assert_eq!(vector.token_ids.len(), 2);
        // "ну" occurs twice and maps to one token
        assert_eq!(vector.token_ids[0][0], vector.token_ids[0][2]);
        assert_eq!(registries.tokens.len(), 3);
        assert_eq!(vector.expr_ids.len(), 2);
        assert_eq!(vector.primary_expr, vector.expr_ids[0]);
        assert!(vector.phrase_id.is_some());
        assert_eq!(diagnostics.total(), 0);

        let stored: String = sqlx::query_scalar("SELECT expr FROM exprs WHERE id = ?")
            .bind(vector.expr_ids[0])
            .fetch_one(&pool)
            .await
            .unwrap();
        let expected = crate::registry::id_array_json(&vector.token_ids[0]);
        assert_eq!(stored, expected);
    }

    #[tokio::test]
    async fn test_part_order_changes_phrase() {
        let pool = setup().await;
        let mut registries = Registries::new();
        let mut diagnostics = Diagnostics::new();

        let forward = vectorize(&pool, &mut registries, &mut diagnostics, "a b|c").await;
        let reversed = vectorize(&pool, &mut registries, &mut diagnostics, "c|a b").await;

        assert_ne!(forward.phrase_id, reversed.phrase_id);
        assert_eq!(registries.tokens.inserts(), 3);
        assert_eq!(registries.exprs.inserts(), 2);
    }

    #[tokio::test]
    async fn test_same_text_same_phrase() {
        let pool = setup().await;
        let mut registries = Registries::new();
        let mut diagnostics = Diagnostics::new();

        let first = vectorize(&pool, &mut registries, &mut diagnostics, "вот-вот").await;
        let second = vectorize(&pool, &mut registries, &mut diagnostics, "вот-вот").await;

        assert_eq!(first, second);
        assert_eq!(registries.phrases.inserts(), 1);
    }

    #[tokio::test]
    async fn test_failed_tokens_do_not_merge_phrases() {
        let pool = setup().await;
        let mut registries = Registries::new();
        let mut diagnostics = Diagnostics::new();

        // Rows the registry does not know about make its inserts collide
        for token in ["икс", "игрек"] {
            sqlx::query("INSERT INTO tokens (token) VALUES (?)")
                .bind(token)
                .execute(&pool)
                .await
                .unwrap();
        }

        let first = vectorize(&pool, &mut registries, &mut diagnostics, "икс").await;
        let second = vectorize(&pool, &mut registries, &mut diagnostics, "игрек").await;

        assert_eq!(first.expr_ids, vec![None]);
        assert_eq!(first.phrase_id, None);
        assert_eq!(second.phrase_id, None);
        assert!(registries.exprs.is_empty());
        assert!(registries.phrases.is_empty());

        let phrases: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM phrases")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(phrases, 0);

        // token, expression and phrase level for each text
        assert_eq!(diagnostics.count(IssueKind::PersistenceConflict), 6);
    }

    #[tokio::test]
    async fn test_hole_in_one_part_fails_only_that_expression() {
        let pool = setup().await;
        let mut registries = Registries::new();
        let mut diagnostics = Diagnostics::new();

        sqlx::query("INSERT INTO tokens (token) VALUES ('икс')")
            .execute(&pool)
            .await
            .unwrap();

        let vector = vectorize(&pool, &mut registries, &mut diagnostics, "ну да|икс").await;

        assert!(vector.expr_ids[0].is_some());
        assert_eq!(vector.expr_ids[1], None);
        assert_eq!(vector.phrase_id, None);
        assert_eq!(registries.exprs.len(), 1);
    }
}
