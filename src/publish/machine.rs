//! The publish run as an explicit state machine.
//!
//! ```text
//! START → prompt → INIT_CHOICE (yes → INITIALIZED | no → SKIP_INIT)
//!       → STAGE → COMMIT → PUSH_PRIMARY
//! PUSH_PRIMARY     ok → DONE(PushedPrimary)          | fail → PUSH_SECONDARY
//! PUSH_SECONDARY   ok → DONE(PushedSecondary)        | fail → RENAME_AND_RETRY
//! RENAME_AND_RETRY ok → DONE(PushedAfterUpstreamFix) | fail → DONE(Failed)
//! ```
//!
//! Each push state performs exactly one step, so the attempt log doubles as
//! the transition history.

use super::{
    PublishError,
    ignore::IgnoreRules,
    input::{InputProvider, Prompt, parse_consent},
    vcs::{CommitResult, Vcs},
};
use crate::{
    config::PublishConfig,
    debug, log,
    logger::{step_fail, step_ok},
};
use anyhow::Result;
use std::path::PathBuf;

/// How the run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    PushedPrimary,
    PushedSecondary,
    PushedAfterUpstreamFix,
    Failed,
}

impl PushOutcome {
    /// Phrase used in the final summary.
    pub const fn summary(self) -> &'static str {
        match self {
            Self::PushedPrimary => "pushed to primary",
            Self::PushedSecondary => "pushed to secondary",
            Self::PushedAfterUpstreamFix => "pushed after branch-rename recovery",
            Self::Failed => "failed — manual intervention required",
        }
    }

    pub const fn is_success(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// The step a push state runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStep {
    Primary,
    Secondary,
    RenameAndRetry,
}

impl PushStep {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::RenameAndRetry => "rename and retry",
        }
    }
}

/// One executed push step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushAttempt {
    pub step: PushStep,
    pub branch: String,
    /// `None` on success, the failure otherwise.
    pub error: Option<String>,
}

impl PushAttempt {
    #[cfg(test)]
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PushState {
    Primary,
    Secondary,
    RenameAndRetry,
    Done(PushOutcome),
}

/// Everything a run did, for the summary and for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub remote_url: String,
    pub initialized: bool,
    /// Ignore file written during initialization.
    pub ignore_file: Option<PathBuf>,
    /// Message actually used for the commit.
    pub message: String,
    pub commit: CommitResult,
    pub attempts: Vec<PushAttempt>,
    pub outcome: PushOutcome,
}

/// Use `input` unless it is blank.
pub fn effective_message(input: Option<&str>, default: &str) -> String {
    match input.map(str::trim) {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => default.to_string(),
    }
}

/// Runs one publish against a [`Vcs`], asking an [`InputProvider`] for answers.
pub struct Publisher<'a, V, I> {
    config: &'a PublishConfig,
    vcs: V,
    input: I,
    rules: IgnoreRules,
    ignore_file: Option<PathBuf>,
    attempts: Vec<PushAttempt>,
}

impl<'a, V: Vcs, I: InputProvider> Publisher<'a, V, I> {
    pub fn new(config: &'a PublishConfig, vcs: V, input: I) -> Self {
        Self {
            config,
            vcs,
            input,
            rules: IgnoreRules::standard().with_extra(&config.ignore.extra),
            ignore_file: None,
            attempts: Vec::new(),
        }
    }

    /// Full run: consent prompt, init, message prompt, commit, push.
    ///
    /// Commit and push failures are part of the report; only prompt I/O and
    /// initialization errors are returned as `Err`.
    pub fn run(&mut self) -> Result<PublishReport> {
        let consent = parse_consent(&self.ask(&Prompt::InitConsent)?);
        let initialized = self.maybe_initialize(consent)?;

        let default = self.config.commit.default_message.clone();
        let answer = self.ask(&Prompt::CommitMessage {
            default: default.clone(),
        })?;
        let message = effective_message(Some(&answer), &default);
        let commit = self.stage_and_commit(Some(&message));

        let config = self.config;
        let outcome = self.publish(&config.push.primary, &config.push.secondary);

        Ok(PublishReport {
            remote_url: config.remote.url.clone(),
            initialized,
            ignore_file: self.ignore_file.clone(),
            message,
            commit,
            attempts: self.attempts.clone(),
            outcome,
        })
    }

    fn ask(&mut self, prompt: &Prompt) -> Result<String, PublishError> {
        self.input
            .ask(prompt)
            .map_err(|e| PublishError::Prompt(prompt.name(), e))
    }

    /// Initialize the repository when `consent` is given.
    ///
    /// Registers the remote and (over)writes the ignore file. Returns whether
    /// anything was done.
    pub fn maybe_initialize(&mut self, consent: bool) -> Result<bool, PublishError> {
        if !consent {
            debug!("init"; "skipped, using existing repository");
            return Ok(false);
        }

        let remote = &self.config.remote;
        self.vcs.init().map_err(PublishError::Init)?;
        self.vcs
            .set_remote(&remote.name, &remote.url)
            .map_err(PublishError::Init)?;

        let path = self.config.ignore_path();
        self.rules
            .write(&path)
            .map_err(|e| PublishError::IgnoreFile(path.clone(), e))?;
        step_ok(&format!("wrote {}", self.config.ignore.file.display()));
        self.ignore_file = Some(path);

        Ok(true)
    }

    /// Stage everything and commit. Failures are reported, not returned.
    pub fn stage_and_commit(&mut self, message: Option<&str>) -> CommitResult {
        let message = effective_message(message, &self.config.commit.default_message);

        let result = self
            .vcs
            .stage_all()
            .and_then(|()| self.vcs.commit(&message))
            .unwrap_or_else(|e| CommitResult::Rejected(format!("{e:#}")));

        match &result {
            CommitResult::Committed => step_ok(&format!("committed: {message}")),
            CommitResult::NothingToCommit => {
                log!("commit"; "nothing to commit, continuing with push")
            }
            CommitResult::Rejected(detail) => {
                step_fail("commit failed, continuing with push", detail)
            }
        }
        result
    }

    /// Push with fallback, returning the final outcome.
    pub fn publish(&mut self, primary: &str, secondary: &str) -> PushOutcome {
        let mut state = PushState::Primary;
        loop {
            state = match state {
                PushState::Done(outcome) => return outcome,
                PushState::Primary => {
                    if self.attempt(PushStep::Primary, primary) {
                        PushState::Done(PushOutcome::PushedPrimary)
                    } else {
                        PushState::Secondary
                    }
                }
                PushState::Secondary => {
                    if self.attempt(PushStep::Secondary, secondary) {
                        PushState::Done(PushOutcome::PushedSecondary)
                    } else {
                        PushState::RenameAndRetry
                    }
                }
                PushState::RenameAndRetry => {
                    if self.attempt(PushStep::RenameAndRetry, primary) {
                        PushState::Done(PushOutcome::PushedAfterUpstreamFix)
                    } else {
                        PushState::Done(PushOutcome::Failed)
                    }
                }
            };
        }
    }

    /// Run one push step and record it.
    fn attempt(&mut self, step: PushStep, branch: &str) -> bool {
        let remote = self.config.remote.name.as_str();
        log!("push"; "{} -> {}/{}", step.label(), remote, branch);

        let result = match step {
            PushStep::Primary | PushStep::Secondary => self.vcs.push(remote, branch, false),
            PushStep::RenameAndRetry => self
                .vcs
                .rename_branch(branch)
                .and_then(|()| self.vcs.push(remote, branch, true)),
        };

        let error = match result {
            Ok(()) => {
                step_ok(&format!("pushed to {remote}/{branch}"));
                None
            }
            Err(e) => {
                let detail = format!("{e:#}");
                step_fail(&format!("push to {remote}/{branch} failed"), &detail);
                Some(detail)
            }
        };

        let ok = error.is_none();
        self.attempts.push(PushAttempt {
            step,
            branch: branch.to_string(),
            error,
        });
        ok
    }

    /// Give back the backends, e.g. to inspect a fake after a run.
    #[cfg(test)]
    pub fn into_parts(self) -> (V, I) {
        (self.vcs, self.input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publish::input::ScriptedInput;
    use anyhow::anyhow;
    use std::fs;
    use tempfile::TempDir;

    /// Recorded call against the fake.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Init,
        SetRemote(String, String),
        StageAll,
        Commit(String),
        Push(String, String, bool),
        Rename(String),
    }

    /// In-memory `Vcs` with scripted push results.
    #[derive(Default)]
    struct FakeVcs {
        calls: Vec<Call>,
        /// Consumed front to back by `push`; missing entries succeed.
        push_results: Vec<bool>,
        commit_result: Option<CommitResult>,
        fail_stage: bool,
    }

    impl FakeVcs {
        fn pushes(results: &[bool]) -> Self {
            Self {
                push_results: results.to_vec(),
                ..Self::default()
            }
        }
    }

    impl Vcs for FakeVcs {
        fn init(&mut self) -> Result<()> {
            self.calls.push(Call::Init);
            Ok(())
        }

        fn set_remote(&mut self, name: &str, url: &str) -> Result<()> {
            self.calls
                .push(Call::SetRemote(name.to_string(), url.to_string()));
            Ok(())
        }

        fn stage_all(&mut self) -> Result<()> {
            self.calls.push(Call::StageAll);
            if self.fail_stage {
                return Err(anyhow!("index.lock exists"));
            }
            Ok(())
        }

        fn commit(&mut self, message: &str) -> Result<CommitResult> {
            self.calls.push(Call::Commit(message.to_string()));
            Ok(self.commit_result.clone().unwrap_or(CommitResult::Committed))
        }

        fn push(&mut self, remote: &str, branch: &str, set_upstream: bool) -> Result<()> {
            self.calls
                .push(Call::Push(remote.to_string(), branch.to_string(), set_upstream));
            let ok = if self.push_results.is_empty() {
                true
            } else {
                self.push_results.remove(0)
            };
            if ok { Ok(()) } else { Err(anyhow!("rejected")) }
        }

        fn rename_branch(&mut self, name: &str) -> Result<()> {
            self.calls.push(Call::Rename(name.to_string()));
            Ok(())
        }
    }

    fn config_in(dir: &TempDir) -> PublishConfig {
        let mut config = PublishConfig::default();
        config.root = dir.path().to_path_buf();
        config.remote.url = "https://example.com/ops/scripts.git".to_string();
        config
    }

    fn run(config: &PublishConfig, vcs: FakeVcs, answers: &[&str]) -> (PublishReport, FakeVcs) {
        let input = ScriptedInput::new(answers.iter().copied());
        let mut publisher = Publisher::new(config, vcs, input);
        let report = publisher.run().unwrap();
        let (vcs, _) = publisher.into_parts();
        (report, vcs)
    }

    fn pushes(calls: &[Call]) -> Vec<Call> {
        calls
            .iter()
            .filter(|c| matches!(c, Call::Push(..) | Call::Rename(_)))
            .cloned()
            .collect()
    }

    #[test]
    fn test_effective_message() {
        assert_eq!(effective_message(None, "default"), "default");
        assert_eq!(effective_message(Some(""), "default"), "default");
        assert_eq!(effective_message(Some("   "), "default"), "default");
        assert_eq!(effective_message(Some(" Add analyzer "), "default"), "Add analyzer");
    }

    #[test]
    fn test_outcome_summaries() {
        assert_eq!(PushOutcome::PushedPrimary.summary(), "pushed to primary");
        assert_eq!(PushOutcome::PushedSecondary.summary(), "pushed to secondary");
        assert_eq!(
            PushOutcome::PushedAfterUpstreamFix.summary(),
            "pushed after branch-rename recovery"
        );
        assert_eq!(
            PushOutcome::Failed.summary(),
            "failed — manual intervention required"
        );
        assert!(!PushOutcome::Failed.is_success());
        assert!(PushOutcome::PushedAfterUpstreamFix.is_success());
    }

    #[test]
    fn test_declined_primary_ok_default_message() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);

        let (report, vcs) = run(&config, FakeVcs::default(), &["n", ""]);

        assert_eq!(report.outcome, PushOutcome::PushedPrimary);
        assert!(!report.initialized);
        assert!(report.ignore_file.is_none());
        assert!(!temp.path().join(".gitignore").exists());
        assert_eq!(report.message, config.commit.default_message);
        assert_eq!(
            vcs.calls,
            vec![
                Call::StageAll,
                Call::Commit(config.commit.default_message.clone()),
                Call::Push("origin".into(), "main".into(), false),
            ]
        );
    }

    #[test]
    fn test_declined_leaves_existing_ignore_file() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        fs::write(temp.path().join(".gitignore"), "mine\n").unwrap();

        run(&config, FakeVcs::default(), &["no", "msg"]);

        assert_eq!(
            fs::read_to_string(temp.path().join(".gitignore")).unwrap(),
            "mine\n"
        );
    }

    #[test]
    fn test_accepted_secondary_ok() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);

        let (report, vcs) = run(&config, FakeVcs::pushes(&[false, true]), &["y", "Add analyzer"]);

        assert_eq!(report.outcome, PushOutcome::PushedSecondary);
        assert!(report.initialized);
        assert_eq!(report.message, "Add analyzer");
        assert_eq!(
            &vcs.calls[..2],
            &[
                Call::Init,
                Call::SetRemote("origin".into(), "https://example.com/ops/scripts.git".into()),
            ]
        );

        let content = fs::read_to_string(temp.path().join(".gitignore")).unwrap();
        for section in IgnoreRules::standard().sections() {
            assert!(content.contains(&format!("# {}\n", section.title)));
        }
        assert_eq!(report.ignore_file, Some(temp.path().join(".gitignore")));
    }

    #[test]
    fn test_accepted_overwrites_ignore_file() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        fs::write(temp.path().join(".gitignore"), "mine\n").unwrap();

        run(&config, FakeVcs::default(), &["Y", ""]);

        let content = fs::read_to_string(temp.path().join(".gitignore")).unwrap();
        assert!(!content.contains("mine"));
        assert!(content.contains("*.log\n!sample_api.log\n"));
    }

    #[test]
    fn test_both_fail_rename_recovers() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);

        let (report, vcs) = run(&config, FakeVcs::pushes(&[false, false, true]), &["y", ""]);

        assert_eq!(report.outcome, PushOutcome::PushedAfterUpstreamFix);
        assert_eq!(
            pushes(&vcs.calls),
            vec![
                Call::Push("origin".into(), "main".into(), false),
                Call::Push("origin".into(), "master".into(), false),
                Call::Rename("main".into()),
                Call::Push("origin".into(), "main".into(), true),
            ]
        );
    }

    #[test]
    fn test_all_fail() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);

        let (report, _) = run(&config, FakeVcs::pushes(&[false, false, false]), &["n", ""]);

        assert_eq!(report.outcome, PushOutcome::Failed);
        assert_eq!(report.attempts.len(), 3);
        assert!(report.attempts.iter().all(|a| !a.succeeded()));
        assert_eq!(
            report.attempts.iter().map(|a| a.step).collect::<Vec<_>>(),
            vec![PushStep::Primary, PushStep::Secondary, PushStep::RenameAndRetry]
        );
    }

    #[test]
    fn test_attempts_stop_at_first_success() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);

        let (report, vcs) = run(&config, FakeVcs::pushes(&[true]), &["n", ""]);
        assert_eq!(report.attempts.len(), 1);
        assert!(!vcs.calls.iter().any(|c| matches!(c, Call::Rename(_))));

        let (report, vcs) = run(&config, FakeVcs::pushes(&[false, true]), &["n", ""]);
        assert_eq!(report.attempts.len(), 2);
        assert!(!vcs.calls.iter().any(|c| matches!(c, Call::Rename(_))));
    }

    #[test]
    fn test_nothing_to_commit_still_pushes() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let vcs = FakeVcs {
            commit_result: Some(CommitResult::NothingToCommit),
            ..FakeVcs::default()
        };

        let (report, vcs) = run(&config, vcs, &["n", "Add analyzer"]);

        assert_eq!(report.commit, CommitResult::NothingToCommit);
        assert_eq!(report.outcome, PushOutcome::PushedPrimary);
        assert!(vcs.calls.iter().any(|c| matches!(c, Call::Push(..))));
    }

    #[test]
    fn test_stage_failure_is_reported_not_fatal() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let vcs = FakeVcs {
            fail_stage: true,
            ..FakeVcs::default()
        };

        let (report, vcs) = run(&config, vcs, &["n", ""]);

        assert!(matches!(report.commit, CommitResult::Rejected(ref d) if d.contains("index.lock")));
        assert!(!vcs.calls.iter().any(|c| matches!(c, Call::Commit(_))));
        assert_eq!(report.outcome, PushOutcome::PushedPrimary);
    }

    #[test]
    fn test_prompts_asked_in_order() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let mut input = ScriptedInput::new(["n", ""]);

        Publisher::new(&config, FakeVcs::default(), &mut input)
            .run()
            .unwrap();

        assert_eq!(
            input.asked(),
            &[
                Prompt::InitConsent,
                Prompt::CommitMessage {
                    default: config.commit.default_message.clone()
                },
            ]
        );
    }

    #[test]
    fn test_custom_branches_and_remote_name() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(&temp);
        config.remote.name = "upstream".to_string();
        config.push.primary = "trunk".to_string();
        config.push.secondary = "develop".to_string();

        let (_, vcs) = run(&config, FakeVcs::pushes(&[false, false, false]), &["n", ""]);

        assert_eq!(
            pushes(&vcs.calls),
            vec![
                Call::Push("upstream".into(), "trunk".into(), false),
                Call::Push("upstream".into(), "develop".into(), false),
                Call::Rename("trunk".into()),
                Call::Push("upstream".into(), "trunk".into(), true),
            ]
        );
    }

    #[test]
    fn test_extra_patterns_written() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(&temp);
        config.ignore.extra = vec!["reports/".to_string()];

        run(&config, FakeVcs::default(), &["y", ""]);

        let content = fs::read_to_string(temp.path().join(".gitignore")).unwrap();
        assert!(content.contains("# Project\nreports/\n"));
    }

    fn remote_output(remote: &std::path::Path, args: &[&str]) -> String {
        let output = crate::utils::exec::Cmd::new("git")
            .arg("--git-dir")
            .arg(remote)
            .args(args)
            .run()
            .unwrap();
        String::from_utf8_lossy(&output.stdout).into_owned()
    }

    #[test]
    fn test_real_git_run_falls_back_to_secondary() {
        use crate::publish::vcs::{has_git, scratch_repo};
        use crate::utils::exec::Cmd;

        if !has_git() {
            return;
        }
        let temp = TempDir::new().unwrap();
        let remote = temp.path().join("remote.git");
        Cmd::new("git")
            .args(["init", "--bare"])
            .arg(&remote)
            .run()
            .unwrap();

        let work = temp.path().join("work");
        fs::create_dir_all(&work).unwrap();
        // local branch is master, so the push to main has nothing to send
        let git = scratch_repo(&work);
        fs::write(work.join("analyzer.py"), "print('ok')\n").unwrap();
        fs::write(work.join("sample_api.log"), "GET /health 200\n").unwrap();
        fs::write(work.join("other.log"), "noise\n").unwrap();

        let mut config = PublishConfig::default();
        config.root = work.clone();
        config.remote.url = remote.to_string_lossy().into_owned();

        let mut publisher = Publisher::new(&config, git, ScriptedInput::new(["y", ""]));
        let report = publisher.run().unwrap();

        assert!(report.initialized);
        assert_eq!(report.commit, CommitResult::Committed);
        assert_eq!(report.outcome, PushOutcome::PushedSecondary);
        assert_eq!(report.attempts.len(), 2);

        let files = remote_output(&remote, &["ls-tree", "-r", "--name-only", "master"]);
        let files: Vec<&str> = files.lines().collect();
        assert!(files.contains(&".gitignore"));
        assert!(files.contains(&"analyzer.py"));
        assert!(files.contains(&"sample_api.log"));
        assert!(!files.contains(&"other.log"));

        let subject = remote_output(&remote, &["log", "-1", "--format=%s", "master"]);
        assert_eq!(subject.trim(), config.commit.default_message);
    }
}
