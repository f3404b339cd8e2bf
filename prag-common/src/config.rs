//! Configuration loading and resolution
//!
//! Every setting is resolved in the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error; a malformed one is.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the database file
pub const ENV_DATABASE: &str = "PRAG_DATABASE";
/// Environment variable naming the frequency report file
pub const ENV_REPORT: &str = "PRAG_REPORT";
/// Environment variable naming the TOML config file
pub const ENV_CONFIG: &str = "PRAG_CONFIG";
/// Environment variable holding the log filter
pub const ENV_LOG: &str = "RUST_LOG";

/// Contents of `prag-ingest.toml`. All keys are optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub database: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub log_level: Option<String>,
    pub register_examples: Option<bool>,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load from an explicit file; the file must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML {} failed: {}", path.display(), e)))?;
        Self::parse(&content)
    }
}

/// Compiled defaults, used when no other source supplies a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database: PathBuf,
    pub report: PathBuf,
    pub log_level: String,
}

impl Default for CompiledDefaults {
    fn default() -> Self {
        Self {
            database: PathBuf::from("pragmaticon.db"),
            report: PathBuf::from("agg.log"),
            log_level: "info".to_string(),
        }
    }
}

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub log_level: Option<String>,
    pub register_examples: bool,
}

/// Fully resolved ingest settings
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    pub database: PathBuf,
    pub report: PathBuf,
    pub log_level: String,
    /// Insert translations for example citations whose excerpt is not yet
    /// registered instead of leaving a hole
    pub register_examples: bool,
    /// TOML file the settings were read from, if any
    pub config_file: Option<PathBuf>,
}

impl IngestConfig {
    /// Resolve settings from CLI, process environment, TOML and defaults
    pub fn resolve(cli: &CliOverrides) -> Result<Self> {
        let config_file = cli
            .config
            .clone()
            .or_else(|| env_path(ENV_CONFIG))
            .or_else(|| default_config_file().filter(|path| path.exists()));

        let toml_config = match &config_file {
            Some(path) => TomlConfig::load(path)?,
            None => TomlConfig::default(),
        };

        let env = EnvValues {
            database: env_path(ENV_DATABASE),
            report: env_path(ENV_REPORT),
            log_level: env_value(ENV_LOG),
        };

        let mut config = Self::merge(cli, &env, &toml_config, CompiledDefaults::default());
        config.config_file = config_file;
        Ok(config)
    }

    /// Pure priority merge, kept separate from process state for testing
    pub fn merge(
        cli: &CliOverrides,
        env: &EnvValues,
        toml_config: &TomlConfig,
        defaults: CompiledDefaults,
    ) -> Self {
        let database = cli
            .database
            .clone()
            .or_else(|| env.database.clone())
            .or_else(|| toml_config.database.clone())
            .unwrap_or(defaults.database);

        let report = cli
            .report
            .clone()
            .or_else(|| env.report.clone())
            .or_else(|| toml_config.report.clone())
            .unwrap_or(defaults.report);

        let log_level = cli
            .log_level
            .clone()
            .or_else(|| env.log_level.clone())
            .or_else(|| toml_config.log_level.clone())
            .unwrap_or(defaults.log_level);

        // A CLI flag can only switch registration on
        let register_examples =
            cli.register_examples || toml_config.register_examples.unwrap_or(false);

        Self {
            database,
            report,
            log_level,
            register_examples,
            config_file: None,
        }
    }
}

/// Environment-sourced values
#[derive(Debug, Clone, Default)]
pub struct EnvValues {
    pub database: Option<PathBuf>,
    pub report: Option<PathBuf>,
    /// Log filter directive
    pub log_level: Option<String>,
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_value(name).map(PathBuf::from)
}

/// Platform config location: `<config_dir>/pragmaticon/prag-ingest.toml`
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pragmaticon").join("prag-ingest.toml"))
}
