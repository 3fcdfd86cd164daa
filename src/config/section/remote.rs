//! `[remote]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [remote]
//! name = "origin"                                              # Remote name registered on init
//! url = "https://github.com/devops-toolkit/automation-scripts.git"  # Push target
//! ```
//!
//! `url` accepts HTTPS/SSH URLs, scp-like `git@host:path` and local paths
//! (handy for pushing to a bare repository during testing).

use crate::config::ConfigDiagnostics;
use serde::{Deserialize, Serialize};

/// Remote used when neither `publish.toml` nor `--remote` sets one.
pub const DEFAULT_REMOTE_URL: &str = "https://github.com/devops-toolkit/automation-scripts.git";

/// Remote repository settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Remote name (e.g., "origin").
    pub name: String,

    /// Repository URL.
    pub url: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            name: "origin".to_string(),
            url: DEFAULT_REMOTE_URL.to_string(),
        }
    }
}

/// Shape of a remote URL as git would interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKind {
    /// `https://`, `ssh://`, `git://`, `file://` ...
    Url,
    /// `user@host:path`
    ScpLike,
    /// Anything else is a filesystem path.
    Local,
}

impl RemoteConfig {
    /// Classify `url` the way git does before transport selection.
    pub fn kind(&self) -> RemoteKind {
        if url::Url::parse(&self.url).is_ok_and(|u| u.scheme().len() > 1) {
            return RemoteKind::Url;
        }
        match self.url.split_once(':') {
            Some((host, path)) if !host.contains('/') && !path.is_empty() => RemoteKind::ScpLike,
            _ => RemoteKind::Local,
        }
    }

    /// Validate remote configuration.
    ///
    /// # Checks
    /// - `name` must be non-empty and contain no whitespace.
    /// - `url` must be non-empty; URL schemes must be ones git can push to.
    /// - Plain `http://` only warns.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.name.trim().is_empty() || self.name.chars().any(char::is_whitespace) {
            diag.error_with_hint(
                "remote.name",
                format!("invalid remote name `{}`", self.name),
                "use a single word such as `origin`",
            );
        }

        if self.url.trim().is_empty() {
            diag.error_with_hint(
                "remote.url",
                "remote url is empty",
                "set [remote] url in publish.toml or pass --remote",
            );
            return;
        }

        if self.kind() != RemoteKind::Url {
            return;
        }
        // kind() already parsed it
        let Ok(parsed) = url::Url::parse(&self.url) else {
            return;
        };
        match parsed.scheme() {
            "https" | "ssh" | "git" | "file" => {}
            "http" => diag.warn(
                "remote.url",
                format!("`{}` is not encrypted, prefer https", self.url),
            ),
            scheme => diag.error_with_hint(
                "remote.url",
                format!("unsupported url scheme `{scheme}`"),
                "use https://, ssh://, git@host:path or a local path",
            ),
        }
    }
}
