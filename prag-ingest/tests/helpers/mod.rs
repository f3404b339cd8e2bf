//! Test Helper Utilities
//!
//! Shared utilities for prag-ingest integration tests

#![allow(dead_code)]

use prag_common::config::IngestConfig;
use sqlx::SqlitePool;
use std::path::Path;
use tempfile::TempDir;

/// Header used by the sample corpora
pub const HEADER: &str = "ДФ,основная семантика,тип речевого акта (собеседник),\
                          жестикуляция,переводные аналоги,Примеры";

/// Write a corpus CSV into the temp dir and return its path
pub fn write_corpus(dir: &TempDir, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join("corpus.csv");
    let mut content = String::from(HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).unwrap();
    path
}

/// Config pointing database and report into the temp dir
pub fn test_config(dir: &TempDir) -> IngestConfig {
    IngestConfig {
        database: dir.path().join("test.db"),
        report: dir.path().join("agg.log"),
        log_level: "debug".to_string(),
        register_examples: false,
        config_file: None,
    }
}

/// Reopen the database written by a run
pub async fn reopen(path: &Path) -> SqlitePool {
    prag_common::db::open_database(path).await.unwrap()
}

/// Row count of a table
pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}
