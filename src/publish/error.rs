//! Fatal publish errors.
//!
//! Everything not listed here is reported and the run moves on: an empty
//! commit, a rejected commit and failed push attempts all end up in the
//! run report instead.

use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("`{0}` not found on PATH, install it and try again")]
    MissingTool(&'static str),

    #[error("failed to read the {0} answer")]
    Prompt(&'static str, #[source] io::Error),

    #[error("failed to write ignore rules to `{}`", .0.display())]
    IgnoreFile(PathBuf, #[source] anyhow::Error),

    #[error("repository initialization failed")]
    Init(#[source] anyhow::Error),
}
