//! Version-control operations used by the publisher.
//!
//! [`Vcs`] is the seam between the run's state machine and git. [`GitCli`]
//! shells out to the system `git`, which already knows about credential
//! helpers, SSH keys and proxies.

use crate::{
    debug, log,
    utils::exec::{Cmd, EMPTY_FILTER, FilterRule, format_error},
};
use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

/// Outcome of staging and committing. Never fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
    /// A new commit was created.
    Committed,
    /// The working tree had no changes to record.
    NothingToCommit,
    /// Staging or committing failed for another reason.
    Rejected(String),
}

/// Operations a publish run performs against the working directory.
pub trait Vcs {
    /// Create (or re-initialize) the repository.
    fn init(&mut self) -> Result<()>;

    /// Point remote `name` at `url`, adding it if missing.
    fn set_remote(&mut self, name: &str, url: &str) -> Result<()>;

    /// Stage every change, honoring ignore rules.
    fn stage_all(&mut self) -> Result<()>;

    /// Commit staged changes.
    fn commit(&mut self, message: &str) -> Result<CommitResult>;

    /// Push `branch` to `remote`, optionally recording upstream tracking.
    fn push(&mut self, remote: &str, branch: &str, set_upstream: bool) -> Result<()>;

    /// Rename the current branch to `name`, replacing any existing branch of that name.
    fn rename_branch(&mut self, name: &str) -> Result<()>;
}

/// Hints git prints around pushes that only add noise to our log.
const PUSH_FILTER: FilterRule = FilterRule::new(&[
    "hint:",
    "To ",
    "Enumerating",
    "Counting",
    "Compressing",
    "Writing",
    "Total",
]);

/// `git` on `PATH`, run in a fixed working directory.
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    interactive: bool,
    envs: Vec<(String, String)>,
}

impl GitCli {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            interactive: false,
            // git's messages are matched below, keep them untranslated
            envs: vec![("LC_ALL".to_string(), "C".to_string())],
        }
    }

    /// Hand the terminal to `git push` so it can ask for credentials.
    ///
    /// Otherwise pushes are captured and git is told not to prompt, since
    /// nobody could see or answer the question.
    pub fn interactive(mut self, enable: bool) -> Self {
        self.interactive = enable;
        self
    }

    /// Extra environment for every git invocation.
    #[cfg(test)]
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    fn push_cmd(&self, remote: &str, branch: &str, set_upstream: bool) -> Cmd {
        let upstream = if set_upstream { "-u" } else { "" };
        let push = self
            .git(["push", upstream, remote, branch])
            .interactive(self.interactive)
            .filter(&PUSH_FILTER);
        if self.interactive {
            push
        } else {
            push.envs([("GIT_TERMINAL_PROMPT", "0")])
        }
    }

    fn git<I, S>(&self, args: I) -> Cmd
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        Cmd::new("git")
            .args(args)
            .cwd(&self.root)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

impl Vcs for GitCli {
    fn init(&mut self) -> Result<()> {
        self.git(["init"]).run()?;
        log!("git"; "initialized repository in {}", self.root.display());
        Ok(())
    }

    fn set_remote(&mut self, name: &str, url: &str) -> Result<()> {
        let added = self.git(["remote", "add", name, url]).output()?;
        if added.status.success() {
            log!("git"; "added remote {name} -> {url}");
            return Ok(());
        }

        // already registered: re-point it instead
        let existing = self.git(["remote", "get-url", name]).output()?;
        if !existing.status.success() {
            bail!(format_error("git remote add", &added, &EMPTY_FILTER));
        }
        self.git(["remote", "set-url", name, url]).run()?;
        log!("git"; "updated remote {name} -> {url}");
        Ok(())
    }

    fn stage_all(&mut self) -> Result<()> {
        self.git(["add", "-A"]).run()?;
        debug!("git"; "staged all changes");
        Ok(())
    }

    fn commit(&mut self, message: &str) -> Result<CommitResult> {
        let output = self.git(["commit", "-m", message]).output()?;
        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            if let Some(summary) = stdout.lines().next() {
                log!("git"; "{}", summary.trim());
            }
            return Ok(CommitResult::Committed);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let nothing = ["nothing to commit", "nothing added to commit"];
        if nothing
            .iter()
            .any(|needle| stdout.contains(needle) || stderr.contains(needle))
        {
            return Ok(CommitResult::NothingToCommit);
        }

        Ok(CommitResult::Rejected(format_error(
            "git commit",
            &output,
            &FilterRule::new(&["hint:"]),
        )))
    }

    fn push(&mut self, remote: &str, branch: &str, set_upstream: bool) -> Result<()> {
        self.push_cmd(remote, branch, set_upstream).run()?;
        Ok(())
    }

    fn rename_branch(&mut self, name: &str) -> Result<()> {
        self.git(["branch", "-M", name]).run()?;
        log!("git"; "renamed current branch to {name}");
        Ok(())
    }
}

/// A repository in `dir` whose first commit lands on `master`, whatever
/// git's default is, with a fixed identity and no signing.
#[cfg(test)]
pub fn scratch_repo(dir: &Path) -> GitCli {
    let mut git = GitCli::new(dir)
        .env("GIT_AUTHOR_NAME", "Publisher Test")
        .env("GIT_AUTHOR_EMAIL", "publisher@example.com")
        .env("GIT_COMMITTER_NAME", "Publisher Test")
        .env("GIT_COMMITTER_EMAIL", "publisher@example.com")
        .env("GIT_CONFIG_NOSYSTEM", "1");
    git.init().unwrap();
    git.git(["symbolic-ref", "HEAD", "refs/heads/master"])
        .run()
        .unwrap();
    git.git(["config", "commit.gpgsign", "false"]).run().unwrap();
    git
}

#[cfg(test)]
pub fn has_git() -> bool {
    which::which("git").is_ok()
}
