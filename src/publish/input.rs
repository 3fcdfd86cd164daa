//! Answers to the two interactive prompts of a run.
//!
//! The publisher never reads stdin directly; it asks an [`InputProvider`].
//! `StdinInput` prompts on stderr like the rest of the CLI, `ScriptedInput`
//! replays fixed answers, and `Preanswered` short-circuits prompts whose
//! answer was given on the command line.

use std::{
    fmt,
    io::{self, BufRead, Write},
};

/// A question the publisher needs answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Whether to initialize a new repository in the working directory.
    InitConsent,
    /// Free-text commit message; empty means `default`.
    CommitMessage { default: String },
}

impl Prompt {
    /// Short name used in error messages.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::InitConsent => "init consent",
            Self::CommitMessage { .. } => "commit message",
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitConsent => write!(f, "Initialize a new git repository here? [y/N]"),
            Self::CommitMessage { default } => write!(f, "Commit message [{default}]:"),
        }
    }
}

/// Source of prompt answers.
pub trait InputProvider {
    /// Return the raw answer to `prompt`, without the trailing newline.
    fn ask(&mut self, prompt: &Prompt) -> io::Result<String>;
}

impl<T: InputProvider + ?Sized> InputProvider for &mut T {
    fn ask(&mut self, prompt: &Prompt) -> io::Result<String> {
        (**self).ask(prompt)
    }
}

/// `y` / `yes` in any case accept; anything else (including empty) declines.
pub fn parse_consent(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer == "y" || answer == "yes"
}

// ============================================================================
// Providers
// ============================================================================

/// Blocking prompts: question on stderr, answer from stdin.
///
/// End of input counts as an empty answer.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinInput;

impl InputProvider for StdinInput {
    fn ask(&mut self, prompt: &Prompt) -> io::Result<String> {
        eprint!("{prompt} ");
        io::stderr().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Replays answers in order; runs dry as empty answers.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    answers: std::collections::VecDeque<String>,
    asked: Vec<Prompt>,
}

#[cfg(test)]
impl ScriptedInput {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Prompts seen so far, in order.
    pub fn asked(&self) -> &[Prompt] {
        &self.asked
    }
}

#[cfg(test)]
impl InputProvider for ScriptedInput {
    fn ask(&mut self, prompt: &Prompt) -> io::Result<String> {
        self.asked.push(prompt.clone());
        Ok(self.answers.pop_front().unwrap_or_default())
    }
}

/// Answers taken from CLI flags, falling back to `inner` for the rest.
#[derive(Debug, Clone)]
pub struct Preanswered<I> {
    init: Option<bool>,
    message: Option<String>,
    inner: I,
}

impl<I: InputProvider> Preanswered<I> {
    pub fn new(init: Option<bool>, message: Option<String>, inner: I) -> Self {
        Self {
            init,
            message,
            inner,
        }
    }
}

impl<I: InputProvider> InputProvider for Preanswered<I> {
    fn ask(&mut self, prompt: &Prompt) -> io::Result<String> {
        match prompt {
            Prompt::InitConsent => match self.init {
                Some(true) => Ok("y".to_string()),
                Some(false) => Ok("n".to_string()),
                None => self.inner.ask(prompt),
            },
            Prompt::CommitMessage { .. } => match &self.message {
                Some(message) => Ok(message.clone()),
                None => self.inner.ask(prompt),
            },
        }
    }
}
