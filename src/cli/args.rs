//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Publish a working directory to a git remote.
///
/// Optionally initializes the repository, commits everything, then pushes
/// to the primary branch, falling back to the secondary branch and finally
/// to renaming the local branch and pushing with upstream tracking.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file name, searched upward from the working directory
    #[arg(
        short = 'C',
        long,
        default_value = "publish.toml",
        value_hint = clap::ValueHint::FilePath
    )]
    pub config: PathBuf,

    /// Working directory to publish (default: current directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub dir: Option<PathBuf>,

    /// Remote URL to push to
    #[arg(short, long, value_hint = clap::ValueHint::Url)]
    pub remote: Option<String>,

    /// Branch tried first
    #[arg(long)]
    pub primary: Option<String>,

    /// Branch tried when the primary push fails
    #[arg(long)]
    pub secondary: Option<String>,

    /// Answer the initialization prompt up front
    #[arg(
        long,
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub init: Option<bool>,

    /// Answer the commit message prompt up front (empty uses the default)
    #[arg(short, long)]
    pub message: Option<String>,

    /// Print the generated ignore rules and exit
    #[arg(long)]
    pub print_ignore: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}
