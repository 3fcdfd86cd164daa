//! `[push]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [push]
//! primary = "main"       # Branch tried first
//! secondary = "master"   # Branch tried when the primary push fails
//! interactive = true     # Let `git push` prompt for credentials (default: only on a tty)
//! ```

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

/// Push target settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Branch tried first, and the name the local branch is renamed to on recovery.
    pub primary: String,

    /// Branch tried when pushing to `primary` fails.
    pub secondary: String,

    /// Attach `git push` to the terminal. Unset means "when stdin and
    /// stdout are both terminals".
    pub interactive: Option<bool>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            primary: "main".to_string(),
            secondary: "master".to_string(),
            interactive: None,
        }
    }
}

impl PushConfig {
    /// Whether pushes may talk to the user's terminal.
    pub fn interactive(&self) -> bool {
        self.interactive
            .unwrap_or_else(|| std::io::stdin().is_terminal() && std::io::stdout().is_terminal())
    }

    /// Validate push configuration.
    ///
    /// # Checks
    /// - Branch names must be valid-looking ref components.
    /// - Identical primary/secondary only warns (the second attempt repeats the first).
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let branches = [
            ("push.primary", &self.primary),
            ("push.secondary", &self.secondary),
        ];
        for (field, branch) in branches {
            if let Some(problem) = branch_name_problem(branch) {
                diag.error(field, format!("invalid branch name `{branch}`: {problem}"));
            }
        }

        if self.primary == self.secondary {
            diag.warn(
                "push.secondary",
                format!(
                    "same as push.primary (`{}`), fallback repeats the first push",
                    self.primary
                ),
            );
        }
    }
}

/// Subset of `git check-ref-format --branch` rules worth catching early.
fn branch_name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        return Some("empty");
    }
    if name.starts_with('-') {
        return Some("starts with `-`");
    }
    if name.starts_with('/') || name.ends_with('/') || name.ends_with('.') {
        return Some("bad leading or trailing character");
    }
    if name.contains("..") || name.contains("//") || name.contains("@{") {
        return Some("contains a forbidden sequence");
    }
    if name.ends_with(".lock") {
        return Some("ends with `.lock`");
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c))
    {
        return Some("contains a forbidden character");
    }
    None
}
