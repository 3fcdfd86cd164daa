//! publish - put a working directory on a git remote.
//!
//! Asks whether to initialize a repository, commits everything, then pushes
//! to the primary branch, falling back to the secondary branch and finally
//! to a rename-and-retry with upstream tracking.

mod cli;
mod config;
mod logger;
mod publish;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::PublishConfig;
use publish::{GitCli, IgnoreRules, Preanswered, Publisher, StdinInput, report};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = PublishConfig::load(&cli)?;

    if cli.print_ignore {
        let rules = IgnoreRules::standard().with_extra(&config.ignore.extra);
        print!("{}", rules.render());
        return Ok(());
    }

    // Nothing may be mutated before this check
    publish::preflight()?;

    let vcs = GitCli::new(&config.root).interactive(config.push.interactive());
    let input = Preanswered::new(cli.init, cli.message.clone(), StdinInput);
    let published = Publisher::new(&config, vcs, input).run()?;

    report::print_summary(&published);

    if !published.outcome.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
