//! Publisher configuration from `publish.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [remote] [push] [commit] [ignore]
//! ├── types/         # ConfigError, ConfigDiagnostics
//! └── mod.rs         # PublishConfig (this file)
//! ```
//!
//! The file is optional. Precedence is built-in defaults, then the file
//! (found by searching upward from the working directory), then CLI flags.

pub mod section;
pub mod types;

pub use section::{CommitConfig, IgnoreConfig, PushConfig, RemoteConfig};
pub use types::{ConfigDiagnostics, ConfigError};

use crate::{
    cli::Cli,
    debug, log,
    utils::path::{expand_path, find_upward, normalize_path},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing publish.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Config file the values came from, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Working directory to publish (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Remote settings
    pub remote: RemoteConfig,

    /// Branch fallback settings
    pub push: PushConfig,

    /// Commit settings
    pub commit: CommitConfig,

    /// Ignore-file settings
    pub ignore: IgnoreConfig,
}

impl PublishConfig {
    /// Load configuration for a run described by `cli`.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = match &cli.dir {
            Some(dir) => expand_path(dir),
            None => normalize_path(
                &std::env::current_dir().context("Failed to get current working directory")?,
            ),
        };

        let mut config = match find_upward(&root, &cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = Some(path);
                config
            }
            None => Self::default(),
        };

        config.root = root;
        config.apply_cli(cli);

        // only now is --verbose known
        match &config.config_path {
            Some(path) => debug!("config"; "using {}", path.display()),
            None => debug!("config"; "no {} found, using defaults", cli.config.display()),
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse `{}`", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Apply CLI overrides on top of file values.
    fn apply_cli(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        Self::update_option(&mut self.remote.url, cli.remote.as_ref());
        Self::update_option(&mut self.push.primary, cli.primary.as_ref());
        Self::update_option(&mut self.push.secondary, cli.secondary.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Absolute path of the ignore file.
    pub fn ignore_path(&self) -> PathBuf {
        self.root.join(&self.ignore.file)
    }

    /// Validate all sections, collecting every error before failing.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.remote.validate(&mut diag);
        self.push.validate(&mut diag);
        self.commit.validate(&mut diag);
        self.ignore.validate(&mut diag);

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config, panicking on unknown fields (to catch typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PublishConfig {
    let (parsed, ignored) = PublishConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}
