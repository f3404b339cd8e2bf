//! End-to-end ingest tests against real files

mod helpers;

use helpers::{count_rows, reopen, test_config, write_corpus};
use prag_common::Error;
use tempfile::TempDir;

const CORPUS: &[&str] = &[
    "ну и ну,удивление,реплика,,Well I never[[англ.]],Well I never [Автор. Книга (2000)][[англ.]]",
    "ну и ну,удивление,реплика|реакция,кивок,\"Well, well[[англ.]]\",",
    "вот-вот,,реплика,,,",
];

#[tokio::test]
async fn test_run_deduplicates_across_rows() {
    let dir = TempDir::new().unwrap();
    let input = write_corpus(&dir, CORPUS);
    let config = test_config(&dir);

    let summary = prag_ingest::run(&config, &input).await.unwrap();

    assert_eq!(summary.rows, 3);
    assert_eq!(summary.units_written, 3);
    // ну, и, вот, -вот
    assert_eq!(summary.tokens, 4);
    assert_eq!(summary.exprs, 2);
    assert_eq!(summary.phrases, 2);
    // semantics: удивление; actclass: реплика, реакция; gest: кивок
    assert_eq!(summary.features, 4);
    assert_eq!(summary.translations, 2);
    assert_eq!(summary.issues(), 0);

    let pool = reopen(&config.database).await;
    assert_eq!(count_rows(&pool, "units").await, 3);
    assert_eq!(count_rows(&pool, "tokens").await, 4);
    assert_eq!(count_rows(&pool, "phrases").await, 2);

    let phrase_ids: Vec<i64> = sqlx::query_scalar("SELECT phrase_id FROM units ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    assert_eq!(phrase_ids[0], phrase_ids[1]);
    assert_ne!(phrase_ids[0], phrase_ids[2]);

    // The example reuses the translation registered earlier in the same row
    let (translations, examples): (String, String) =
        sqlx::query_as("SELECT translations, examples FROM units ORDER BY id LIMIT 1")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(translations, examples);
    pool.close().await;

    let report = std::fs::read_to_string(&config.report).unwrap();
    assert!(report.contains("unit||ДФ\n"));
    assert!(report.contains("ну и ну\t2\n"));
}

#[tokio::test]
async fn test_rerun_replaces_previous_contents() {
    let dir = TempDir::new().unwrap();
    let input = write_corpus(&dir, CORPUS);
    let config = test_config(&dir);

    prag_ingest::run(&config, &input).await.unwrap();
    let summary = prag_ingest::run(&config, &input).await.unwrap();
    assert_eq!(summary.units_written, 3);

    let pool = reopen(&config.database).await;
    assert_eq!(count_rows(&pool, "units").await, 3);
    assert_eq!(count_rows(&pool, "translations").await, 2);
    pool.close().await;
}

#[tokio::test]
async fn test_issues_are_counted_not_fatal() {
    let dir = TempDir::new().unwrap();
    let input = write_corpus(
        &dir,
        &["ну,,,,Bonjour[[фр.]],", "да,,реплика,,просто текст,"],
    );
    let config = test_config(&dir);

    let summary = prag_ingest::run(&config, &input).await.unwrap();

    assert_eq!(summary.units_written, 2);
    assert_eq!(summary.data_quality_issues, 1);
    assert_eq!(summary.unrecognized_references, 1);
    assert_eq!(summary.format_mismatches, 1);
    assert_eq!(summary.translations, 0);
}

#[tokio::test]
async fn test_missing_input_touches_nothing() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let result = prag_ingest::run(&config, &dir.path().join("absent.csv")).await;

    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(!config.database.exists());
    assert!(!config.report.exists());
}

#[tokio::test]
async fn test_missing_unit_column_touches_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("corpus.csv");
    std::fs::write(&input, "жестикуляция\nкивок\n").unwrap();
    let config = test_config(&dir);

    let result = prag_ingest::run(&config, &input).await;

    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(!config.database.exists());
}
