//! Ignore rules written when a repository is initialized.
//!
//! Sections are rendered in order as `# <title>` followed by their
//! patterns. Order matters to git: the sample-log exception has to come
//! after the `*.log` rule it carves out of.

use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Sample log read by the bundled analyzers; kept under version control.
pub const SAMPLE_LOG_FILE: &str = "sample_api.log";

/// A titled group of patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreSection {
    pub title: String,
    pub patterns: Vec<String>,
}

impl IgnoreSection {
    fn new(title: &str, patterns: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
        }
    }
}

/// Ordered ignore sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRules {
    sections: Vec<IgnoreSection>,
}

impl IgnoreRules {
    /// The standard rule set.
    pub fn standard() -> Self {
        let sample_exception = format!("!{SAMPLE_LOG_FILE}");
        let mut logs = IgnoreSection::new("Logs", &["*.log"]);
        logs.patterns.push(sample_exception);

        Self {
            sections: vec![
                IgnoreSection::new(
                    "Python build artifacts",
                    &[
                        "__pycache__/",
                        "*.py[cod]",
                        "*$py.class",
                        "*.so",
                        "build/",
                        "dist/",
                        "*.egg-info/",
                        ".eggs/",
                    ],
                ),
                IgnoreSection::new(
                    "Virtual environments",
                    &["venv/", ".venv/", "env/", "ENV/", ".python-version"],
                ),
                IgnoreSection::new(
                    "Editors and IDEs",
                    &[".vscode/", ".idea/", "*.swp", "*.swo", "*~"],
                ),
                IgnoreSection::new("OS metadata", &[".DS_Store", "Thumbs.db", "desktop.ini"]),
                IgnoreSection::new(
                    "Credentials and secrets",
                    &[
                        ".env",
                        "*.pem",
                        "*.key",
                        "credentials.json",
                        ".aws/",
                        "secrets.*",
                    ],
                ),
                logs,
                IgnoreSection::new("Temporary files", &["*.tmp", "*.temp", "tmp/"]),
            ],
        }
    }

    /// Append project patterns as a final section. Blank input adds nothing.
    pub fn with_extra(mut self, extra: &[String]) -> Self {
        let patterns: Vec<String> = extra
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        if !patterns.is_empty() {
            self.sections.push(IgnoreSection {
                title: "Project".to_string(),
                patterns,
            });
        }
        self
    }

    #[cfg(test)]
    pub fn sections(&self) -> &[IgnoreSection] {
        &self.sections
    }

    /// All patterns in file order.
    #[cfg(test)]
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|s| s.patterns.iter().map(String::as_str))
    }

    /// Render the file content.
    pub fn render(&self) -> String {
        let mut out = format!(
            "# Generated by {} v{}\n",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        );
        for section in &self.sections {
            out.push('\n');
            out.push_str("# ");
            out.push_str(&section.title);
            out.push('\n');
            for pattern in &section.patterns {
                out.push_str(pattern);
                out.push('\n');
            }
        }
        out
    }

    /// Write the rendered rules to `path`, replacing any existing file.
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())
            .with_context(|| format!("Failed to write '{}'", path.display()))
    }
}
