//! Data issue reporting
//!
//! Malformed or suspicious cell content never aborts a run. Every issue is
//! logged with the row number, field and offending content, counted by kind,
//! and kept for the end-of-run summary.

use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

/// Issue categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Content does not follow its field grammar
    FormatMismatch,
    /// Reference outside a controlled vocabulary (e.g. unknown language)
    UnrecognizedReference,
    /// Structurally valid but semantically wrong content
    DataQuality,
    /// Insert rejected by the database
    PersistenceConflict,
}

impl IssueKind {
    fn index(self) -> usize {
        match self {
            IssueKind::FormatMismatch => 0,
            IssueKind::UnrecognizedReference => 1,
            IssueKind::DataQuality => 2,
            IssueKind::PersistenceConflict => 3,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IssueKind::FormatMismatch => "format mismatch",
            IssueKind::UnrecognizedReference => "unrecognized reference",
            IssueKind::DataQuality => "data quality",
            IssueKind::PersistenceConflict => "persistence conflict",
        };
        f.write_str(label)
    }
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} in {field}: {detail}")]
pub struct Issue {
    pub kind: IssueKind,
    /// Canonical field name, or registry name for persistence conflicts
    pub field: &'static str,
    /// The offending content
    pub content: String,
    pub detail: String,
    /// 1-based data row, when reported while a row was being processed
    pub row: Option<usize>,
}

impl Issue {
    pub fn new(
        kind: IssueKind,
        field: &'static str,
        content: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field,
            content: content.into(),
            detail: detail.into(),
            row: None,
        }
    }

    pub fn format_mismatch(
        field: &'static str,
        content: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(IssueKind::FormatMismatch, field, content, detail)
    }

    pub fn unrecognized(
        field: &'static str,
        content: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(IssueKind::UnrecognizedReference, field, content, detail)
    }

    pub fn data_quality(
        field: &'static str,
        content: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(IssueKind::DataQuality, field, content, detail)
    }

    pub fn persistence(
        field: &'static str,
        content: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(IssueKind::PersistenceConflict, field, content, detail)
    }
}

/// Issue sink for one run
#[derive(Debug, Default)]
pub struct Diagnostics {
    current_row: Option<usize>,
    counts: [usize; 4],
    issues: Vec<Issue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag subsequent issues with a data row number
    pub fn begin_row(&mut self, row: usize) {
        self.current_row = Some(row);
    }

    pub fn end_row(&mut self) {
        self.current_row = None;
    }

    /// Log and record an issue
    pub fn report(&mut self, mut issue: Issue) {
        issue.row = self.current_row;

        match issue.kind {
            IssueKind::PersistenceConflict => error!(
                row = ?issue.row,
                field = issue.field,
                content = %issue.content,
                "{}",
                issue
            ),
            _ => warn!(
                row = ?issue.row,
                field = issue.field,
                content = %issue.content,
                "{}",
                issue
            ),
        }

        self.counts[issue.kind.index()] += 1;
        self.issues.push(issue);
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.counts[kind.index()]
    }

    pub fn total(&self) -> usize {
        self.issues.len()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }
}
