//! Ingest run
//!
//! One run is a full reload: check the input, reset the schema, decode every
//! row in order, write the frequency report and summarize. Rows are processed
//! strictly one after another; every registry resolution is awaited before
//! the next begins.

use crate::assembler::{process_row, AssemblyOptions};
use crate::diagnostics::{Diagnostics, Issue, IssueKind};
use crate::fields::{ColumnMap, Field};
use crate::registry::Registries;
use crate::report::FrequencyReport;
use crate::source::{self, Table};
use prag_common::config::IngestConfig;
use prag_common::db::{open_database, reset_schema};
use prag_common::{Error, Result};
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, info, warn};

/// Counts describing a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows: usize,
    pub units_written: usize,
    pub tokens: usize,
    pub exprs: usize,
    pub phrases: usize,
    pub features: usize,
    pub translations: usize,
    pub format_mismatches: usize,
    pub unrecognized_references: usize,
    pub data_quality_issues: usize,
    pub persistence_conflicts: usize,
}

impl RunSummary {
    pub fn issues(&self) -> usize {
        self.format_mismatches
            + self.unrecognized_references
            + self.data_quality_issues
            + self.persistence_conflicts
    }

    pub fn log(&self) {
        info!(
            rows = self.rows,
            units = self.units_written,
            tokens = self.tokens,
            exprs = self.exprs,
            phrases = self.phrases,
            features = self.features,
            translations = self.translations,
            "Ingest complete"
        );
        if self.issues() > 0 {
            warn!(
                format_mismatch = self.format_mismatches,
                unrecognized_reference = self.unrecognized_references,
                data_quality = self.data_quality_issues,
                persistence_conflict = self.persistence_conflicts,
                "{} issues reported",
                self.issues()
            );
        }
        match serde_json::to_string(self) {
            Ok(json) => debug!(summary = %json, "Run summary"),
            Err(e) => warn!("Run summary not serializable: {}", e),
        }
    }
}

/// State of one ingest run over an already reset database
pub struct Pipeline {
    pool: SqlitePool,
    registries: Registries,
    diagnostics: Diagnostics,
    options: AssemblyOptions,
    rows: usize,
    units_written: usize,
}

impl Pipeline {
    pub fn new(pool: SqlitePool, options: AssemblyOptions) -> Self {
        Self {
            pool,
            registries: Registries::new(),
            diagnostics: Diagnostics::new(),
            options,
            rows: 0,
            units_written: 0,
        }
    }

    /// Process a parsed table and return its frequency report
    ///
    /// Fails only when the header lacks the unit column; everything else is
    /// reported and skipped.
    pub async fn ingest(&mut self, table: &Table) -> Result<FrequencyReport> {
        let (column_map, unknown) = ColumnMap::from_header(&table.header);
        require_unit_column(&column_map)?;

        for header in unknown {
            self.diagnostics.report(Issue::unrecognized(
                "header",
                header,
                "column is not in the field dictionary and is ignored",
            ));
        }

        let mut report = FrequencyReport::new(&column_map);

        for (index, row) in table.rows.iter().enumerate() {
            let row_number = index + 1;
            self.diagnostics.begin_row(row_number);

            let unit_id = process_row(
                &self.pool,
                &mut self.registries,
                &mut self.diagnostics,
                self.options,
                &column_map,
                row,
            )
            .await;

            self.rows += 1;
            if unit_id.is_some() {
                self.units_written += 1;
            }
            report.observe_row(row);
            self.diagnostics.end_row();
        }

        Ok(report)
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            rows: self.rows,
            units_written: self.units_written,
            tokens: self.registries.tokens.len(),
            exprs: self.registries.exprs.len(),
            phrases: self.registries.phrases.len(),
            features: self.registries.features.len(),
            translations: self.registries.translations.len(),
            format_mismatches: self.diagnostics.count(IssueKind::FormatMismatch),
            unrecognized_references: self.diagnostics.count(IssueKind::UnrecognizedReference),
            data_quality_issues: self.diagnostics.count(IssueKind::DataQuality),
            persistence_conflicts: self.diagnostics.count(IssueKind::PersistenceConflict),
        }
    }
}

fn require_unit_column(column_map: &ColumnMap) -> Result<()> {
    if column_map.has_field(Field::Unit) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "header has no '{}' column",
            Field::Unit.header()
        )))
    }
}

/// Run a full ingest of `input` with the given configuration
///
/// Nothing is touched if the input file is missing, unreadable or has no
/// unit column.
pub async fn run(config: &IngestConfig, input: &Path) -> Result<RunSummary> {
    if !input.is_file() {
        return Err(Error::InvalidInput(format!(
            "Path to the file with data is incorrect: {}",
            input.display()
        )));
    }

    let table = source::read_table(input)?;
    require_unit_column(&ColumnMap::from_header(&table.header).0)?;
    info!("Read {} data rows from {}", table.rows.len(), input.display());

    let pool = open_database(&config.database).await?;
    reset_schema(&pool).await?;

    let options = AssemblyOptions {
        register_examples: config.register_examples,
    };
    let mut pipeline = Pipeline::new(pool.clone(), options);
    let report = pipeline.ingest(&table).await?;

    pool.close().await;
    report.write(&config.report)?;

    let summary = pipeline.summary();
    summary.log();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prag_common::db::open_in_memory;

    async fn pipeline() -> Pipeline {
        let pool = open_in_memory().await.unwrap();
        reset_schema(&pool).await.unwrap();
        Pipeline::new(pool, AssemblyOptions::default())
    }

    #[tokio::test]
    async fn test_unknown_header_is_reported_once() {
        let mut pipeline = pipeline().await;
        let table = source::parse_table(
            "ДФ,тип речевого акта (собеседник),лишняя колонка\n\
             ну и ну,реплика,x\n\
             да ну,реплика,y\n",
        )
        .unwrap();

        let report = pipeline.ingest(&table).await.unwrap();

        let diagnostics = pipeline.diagnostics();
        assert_eq!(diagnostics.count(IssueKind::UnrecognizedReference), 1);
        assert_eq!(diagnostics.total(), 1);
        assert_eq!(diagnostics.issues()[0].field, "header");
        assert_eq!(diagnostics.issues()[0].content, "лишняя колонка");
        assert_eq!(diagnostics.issues()[0].row, None);

        // The ignored column still shows up in the report
        assert_eq!(report.count(2, "x"), 1);
        assert_eq!(pipeline.summary().units_written, 2);
    }

    #[tokio::test]
    async fn test_missing_unit_column_fails_ingest() {
        let mut pipeline = pipeline().await;
        let table = source::parse_table("жестикуляция\nкивок\n").unwrap();

        let result = pipeline.ingest(&table).await;

        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(pipeline.summary().rows, 0);
    }

    #[tokio::test]
    async fn test_summary_serializes_counts() {
        let mut pipeline = pipeline().await;
        let table = source::parse_table("ДФ\nвот-вот\n").unwrap();
        pipeline.ingest(&table).await.unwrap();

        let summary = pipeline.summary();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["rows"], 1);
        assert_eq!(json["tokens"], 2);
        // actclass is empty
        assert_eq!(json["data_quality_issues"], 1);
        assert_eq!(summary.issues(), 1);
    }
}
