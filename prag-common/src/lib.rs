//! # Pragmaticon Common Library
//!
//! Shared code for the Pragmaticon tools:
//! - Error and result types
//! - Configuration loading (CLI / ENV / TOML / compiled defaults)
//! - Database open, destructive reset and table schemas

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
