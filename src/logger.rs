//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro, only shown with `--verbose`
//! - `step_ok` / `step_fail` for the one-line step markers of a publish run
//!
//! # Example
//!
//! ```ignore
//! log!("git"; "pushing to {}", remote);
//! debug!("config"; "loaded {}", path.display());
//! ```

use owo_colors::{OwoColorize, Stream, Style};
use std::{
    io::{Write, stderr, stdout},
    sync::atomic::{AtomicBool, Ordering},
};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix.
///
/// `error` and `warning` go to stderr, everything else to stdout.
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let to_stderr = matches!(module_lower.as_str(), "error" | "warning");
    let stream = if to_stderr { Stream::Stderr } else { Stream::Stdout };
    let prefix = colorize_prefix(module, &module_lower, stream);

    if to_stderr {
        let mut out = stderr().lock();
        writeln!(out, "{prefix} {message}").ok();
        out.flush().ok();
    } else {
        let mut out = stdout().lock();
        writeln!(out, "{prefix} {message}").ok();
        out.flush().ok();
    }
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str, stream: Stream) -> String {
    let style = match module_lower {
        "git" => Style::new().bright_blue(),
        "push" | "done" => Style::new().bright_green(),
        "error" => Style::new().bright_red(),
        "hint" => Style::new().bright_cyan(),
        _ => Style::new().bright_yellow(),
    };
    paint(&format!("[{module}]"), style.bold(), stream)
}

/// Style `text` for `stream`.
///
/// Plain text when `--color never` is in effect, or under `auto` when the
/// stream is not a terminal.
pub fn paint(text: &str, style: Style, stream: Stream) -> String {
    text.if_supports_color(stream, |t| t.style(style)).to_string()
}

// ============================================================================
// Step markers
// ============================================================================

/// Print a successful step (✓ prefix, green).
pub fn step_ok(message: &str) {
    let mut out = stdout().lock();
    let mark = paint("✓", Style::new().green(), Stream::Stdout);
    writeln!(out, "{mark} {message}").ok();
    out.flush().ok();
}

/// Print a failed step (✗ prefix, red) with optional detail.
pub fn step_fail(summary: &str, detail: &str) {
    let mark = paint("✗", Style::new().red(), Stream::Stdout);
    let mut out = stdout().lock();
    if detail.is_empty() {
        writeln!(out, "{mark} {summary}").ok();
    } else {
        let detail = paint(detail, Style::new().dimmed(), Stream::Stdout);
        writeln!(out, "{mark} {summary}\n{detail}").ok();
    }
    out.flush().ok();
}
