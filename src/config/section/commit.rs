//! `[commit]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [commit]
//! default_message = "Add DevOps automation scripts"   # Used when the prompt is left empty
//! ```

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};

/// Message used when the commit prompt is answered with an empty line.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Add DevOps automation scripts";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommitConfig {
    /// Fallback commit message.
    pub default_message: String,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            default_message: DEFAULT_COMMIT_MESSAGE.to_string(),
        }
    }
}

impl CommitConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.default_message.trim().is_empty() {
            diag.error_with_hint(
                "commit.default_message",
                "default commit message is empty",
                "remove the field to use the built-in message",
            );
        }
    }
}
