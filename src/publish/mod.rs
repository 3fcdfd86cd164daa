//! Repository publishing: init, commit, push with branch fallback.
//!
//! # Module Structure
//!
//! - [`input`]: prompt answers (`InputProvider`, stdin or scripted)
//! - [`ignore`]: ignore rules written on initialization
//! - [`vcs`]: `Vcs` trait and the `git` command-line backend
//! - [`machine`]: `Publisher` and the push state machine
//! - [`report`]: final summary

mod error;
pub mod ignore;
pub mod input;
pub mod machine;
pub mod report;
pub mod vcs;

pub use error::PublishError;
pub use ignore::IgnoreRules;
pub use input::{Preanswered, StdinInput};
pub use machine::Publisher;
pub use vcs::GitCli;

use crate::{debug, utils::exec::require_program};

/// Executable every run depends on.
pub const GIT: &str = "git";

/// Check the environment before anything is touched.
pub fn preflight() -> Result<(), PublishError> {
    let path = require_program(GIT).map_err(|_| PublishError::MissingTool(GIT))?;
    debug!("preflight"; "using {}", path.display());
    Ok(())
}
