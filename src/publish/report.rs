//! Final summary printed after a run.

use super::{
    machine::{PublishReport, PushOutcome},
    vcs::CommitResult,
};
use crate::logger::paint;
use owo_colors::{Stream, Style};
use std::fmt::Write;

/// Suggested follow-ups, printed after every run.
pub const NEXT_STEPS: &[&str] = &[
    "Open the repository page and check that every script is listed",
    "Add a description and topics to the repository",
    "Review the ignore rules before adding new kinds of files",
    "Never commit credentials: keep them in .env or a secrets manager",
];

/// Shown before the next steps when nothing reached the remote.
const RECOVERY_STEPS: &[&str] = &[
    "Check that the remote exists and you have push access",
    "Check your credentials (personal access token or SSH key)",
    "Run `git push -u <remote> <branch>` by hand to see the full error",
];

/// Render the summary block.
pub fn render_summary(report: &PublishReport) -> String {
    let mut out = String::new();

    let headline = match report.outcome {
        PushOutcome::Failed => Style::new().red(),
        _ => Style::new().green(),
    };
    let headline = paint(report.outcome.summary(), headline.bold(), Stream::Stdout);
    let _ = writeln!(out, "\n{} {}", bold("Result:"), headline);
    let _ = writeln!(out, "{} {}", bold("Remote:"), report.remote_url);

    let commit = match &report.commit {
        CommitResult::Committed => format!("committed \"{}\"", report.message),
        CommitResult::NothingToCommit => "nothing new to commit".to_string(),
        CommitResult::Rejected(_) => "commit failed".to_string(),
    };
    let _ = writeln!(out, "{} {}", bold("Commit:"), commit);

    if report.initialized {
        let _ = writeln!(out, "{} new repository, remote registered", bold("Init:"));
    }

    if let Some(path) = &report.ignore_file {
        let _ = writeln!(out, "{} {}", bold("Ignore:"), path.display());
    }

    if let Some(last) = report.attempts.last() {
        let _ = writeln!(
            out,
            "{} {} attempt(s), last {} on `{}`",
            bold("Pushes:"),
            report.attempts.len(),
            last.step.label(),
            last.branch
        );
        // the full error was printed when the step failed
        if let Some(error) = &last.error
            && let Some(first) = error.lines().next()
        {
            let _ = writeln!(out, "{} {}", bold("Error:"), first);
        }
    }

    if !report.outcome.is_success() {
        write_steps(&mut out, "To fix it:", RECOVERY_STEPS);
    }
    write_steps(&mut out, "Next steps:", NEXT_STEPS);
    out
}

fn write_steps(out: &mut String, title: &str, steps: &[&str]) {
    let _ = writeln!(out, "\n{}", bold(title));
    for (i, step) in steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, step);
    }
}

fn bold(text: &str) -> String {
    paint(text, Style::new().bold(), Stream::Stdout)
}

/// Print the summary to stdout.
pub fn print_summary(report: &PublishReport) {
    print!("{}", render_summary(report));
}
