//! `[ignore]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [ignore]
//! file = ".gitignore"                 # Written on initialization (overwritten)
//! extra = ["reports/", "*.csv"]       # Appended as a final "Project" section
//! ```

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Ignore file name, relative to the working directory.
    pub file: PathBuf,

    /// Additional project-specific patterns.
    pub extra: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(".gitignore"),
            extra: Vec::new(),
        }
    }
}

impl IgnoreConfig {
    /// Validate ignore configuration.
    ///
    /// # Checks
    /// - `file` must be a plain relative path that stays inside the working directory.
    /// - `extra` patterns must be single-line and non-blank.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !is_contained(&self.file) {
            diag.error_with_hint(
                "ignore.file",
                format!("`{}` must be relative to the working directory", self.file.display()),
                "use a name such as `.gitignore`",
            );
        }

        for pattern in &self.extra {
            if pattern.trim().is_empty() || pattern.contains('\n') {
                diag.error("ignore.extra", format!("invalid pattern {pattern:?}"));
            }
        }
    }
}

fn is_contained(path: &Path) -> bool {
    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_defaults() {
        let config = IgnoreConfig::default();
        assert_eq!(config.file, PathBuf::from(".gitignore"));
        assert!(config.extra.is_empty());
    }

    #[test]
    fn test_validate_file_must_stay_inside() {
        for bad in ["/etc/gitignore", "../.gitignore", ""] {
            let config = IgnoreConfig {
                file: PathBuf::from(bad),
                extra: Vec::new(),
            };
            let mut diag = ConfigDiagnostics::new();
            config.validate(&mut diag);
            assert!(diag.has_errors(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_validate_extra_patterns() {
        let config = IgnoreConfig {
            file: PathBuf::from(".gitignore"),
            extra: vec!["reports/".to_string(), " ".to_string()],
        };
        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
        assert_eq!(diag.errors()[0].field, "ignore.extra");
    }
}
