//! prag-ingest library interface
//!
//! Normalizes the Pragmaticon construction corpus into deduplicated tables:
//! tokens, expressions and phrases for each unit's surface form, field-scoped
//! features, and translations, plus one `units` row per source row.

pub mod assembler;
pub mod decode;
pub mod diagnostics;
pub mod fields;
pub mod languages;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod source;

pub use crate::diagnostics::{Diagnostics, Issue, IssueKind};
pub use crate::pipeline::{run, Pipeline, RunSummary};
pub use crate::registry::{Id, Registries, Registry};
