//! External command execution utilities.
//!
//! Provides a Builder-based API for running commands with proper
//! output handling. Captured mode collects output for logging and error
//! reports; interactive mode hands the terminal to the child.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Simple command
//! Cmd::new("git").args(["status", "-s"]).run()?;
//!
//! // Let git ask for credentials on the user's terminal
//! Cmd::new("git")
//!     .args(["push", "origin", "main"])
//!     .cwd(root)
//!     .interactive(true)
//!     .run()?;
//!
//! // Inspect output of a command that may fail
//! let output = Cmd::new("git").args(["commit", "-m", msg]).output()?;
//! ```

use crate::log;
use anyhow::{Context, Result, bail};
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
    sync::OnceLock,
};

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
    interactive: bool,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument. Empty arguments are dropped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments. Empty arguments are dropped.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set environment variables for the subprocess.
    pub fn envs<K, V, I>(mut self, vars: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in vars {
            self.envs.push((k.as_ref().to_owned(), v.as_ref().to_owned()));
        }
        self
    }

    /// Run with the parent's stdin, stdout and stderr.
    ///
    /// The child's prompts and progress reach the user as they happen and
    /// it can read answers from the terminal. Nothing is captured, so the
    /// returned `Output` carries only the exit status.
    pub fn interactive(mut self, enable: bool) -> Self {
        self.interactive = enable;
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Execute the command, failing on a non-zero exit status.
    pub fn run(self) -> Result<Output> {
        let name = self.program_name();
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);
        let interactive = self.interactive;
        let output = self.output()?;

        if !output.status.success() {
            bail!(format_error(&name, &output, filter));
        }

        // interactive output was already shown by the child
        if !interactive {
            filter.log(&name, String::from_utf8_lossy(&output.stderr).trim());
        }
        Ok(output)
    }

    /// Execute the command and return its output whatever the exit status.
    ///
    /// Only a failure to start or wait for the process is an error.
    pub fn output(self) -> Result<Output> {
        if self.interactive {
            self.output_interactive()
        } else {
            self.output_simple()
        }
    }

    #[cfg(test)]
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Get the program name for error messages.
    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).envs(self.envs.iter().cloned());
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// Captured execution, stdin closed.
    fn output_simple(self) -> Result<Output> {
        let name = self.program_name();
        self.command()
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to execute `{name}`"))
    }

    /// Execution attached to the parent's terminal.
    fn output_interactive(self) -> Result<Output> {
        let name = self.program_name();
        let status = self
            .command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute `{name}`"))?;

        Ok(Output {
            status,
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}

/// Fail fast when `program` is not on `PATH`.
pub fn require_program(program: &str) -> Result<PathBuf, which::Error> {
    which::which(program)
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known hints or irrelevant messages.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Lines of `output` that pass the filter, ANSI codes removed.
    pub fn keep(&self, output: &str) -> Vec<String> {
        output
            .lines()
            .map(|line| strip_ansi(line).trim().to_string())
            .filter(|line| !self.should_skip(line))
            .collect()
    }

    /// Log output lines that pass the filter.
    pub fn log(&self, name: &str, output: &str) {
        let lines = self.keep(output);
        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
pub fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("valid ansi regex"));
    re.replace_all(s, "")
}

/// Format error message for failed command.
pub fn format_error(name: &str, output: &Output, filter: &FilterRule) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut msg = format!("Command `{name}` failed with {}", output.status);
    for line in filter.keep(&stderr) {
        msg.push('\n');
        msg.push_str(&line);
    }

    let stdout_lines = filter.keep(&stdout);
    if !stdout_lines.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(&stdout_lines.join("\n"));
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("git")
            .arg("push")
            .args(["origin", "main"])
            .cwd("/tmp");

        assert_eq!(cmd.program, OsString::from("git"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
        assert!(!cmd.interactive);
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("echo").arg("").args(["a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_filter_rule() {
        let filter = FilterRule::new(&["hint:", "remote:"]);
        assert!(filter.should_skip("hint: use --set-upstream"));
        assert!(filter.should_skip("remote: Resolving deltas"));
        assert!(!filter.should_skip("error: failed to push some refs"));
        assert!(filter.should_skip(""));
    }

    #[test]
    fn test_filter_keep_strips_ansi() {
        let filter = FilterRule::new(&["hint:"]);
        let kept = filter.keep("\x1b[33mhint:\x1b[0m skip me\n\x1b[31mfatal\x1b[0m: bad\n\n");
        assert_eq!(kept, vec!["fatal: bad".to_string()]);
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("\x1b[?25lHidden"), "Hidden");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[cfg(unix)]
    #[test]
    fn test_simple_command() {
        let output = Cmd::new("echo").arg("hello").run().unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("hello"));
    }

    #[cfg(unix)]
    #[test]
    fn test_output_does_not_fail_on_status() {
        let output = Cmd::new("false").output().unwrap();
        assert!(!output.status.success());
        assert!(Cmd::new("false").run().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_interactive_reports_status() {
        assert!(Cmd::new("true").interactive(true).run().is_ok());

        let err = Cmd::new("sh")
            .args(["-c", "exit 3"])
            .interactive(true)
            .run()
            .unwrap_err();
        assert!(err.to_string().contains("exit status: 3"));
    }

    /// A child that prompts on `/dev/tty` either talks to the user's
    /// terminal or, with none attached, fails at once. It must never wait
    /// on a terminal nobody can see.
    #[cfg(unix)]
    #[test]
    fn test_interactive_tty_prompt_without_terminal_returns() {
        use std::{sync::mpsc, time::Duration};

        // with a real terminal the prompt would legitimately wait for input
        if std::fs::File::open("/dev/tty").is_ok() {
            return;
        }

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let result = Cmd::new("sh")
                .args(["-c", "printf 'Username: ' > /dev/tty; read u < /dev/tty"])
                .interactive(true)
                .run();
            let _ = tx.send(result.is_ok());
        });

        let succeeded = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("prompting child blocked");
        assert!(!succeeded);
    }

    #[test]
    fn test_missing_program() {
        assert!(require_program("definitely-not-a-real-program-4242").is_err());
        assert!(Cmd::new("definitely-not-a-real-program-4242").output().is_err());
    }
}
