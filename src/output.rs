//! Console reporting.
//!
//! All user-visible output goes through a [`Reporter`] handle that is
//! handed to each component at construction time. There is no process-wide
//! logging singleton; tests construct a silenced reporter instead of
//! capturing stdout.

use colored::*;

/// Formats and emits status messages with consistent styling.
///
/// Cloning is cheap; every component keeps its own handle.
#[derive(Debug, Clone)]
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    /// Creates a reporter that writes to stdout/stderr.
    pub fn new() -> Self {
        Reporter { quiet: false }
    }

    /// Creates a reporter that suppresses everything except errors.
    pub fn silent() -> Self {
        Reporter { quiet: true }
    }

    /// Prints a success message in green with a checkmark.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", "✓".green(), message);
        }
    }

    /// Prints an informational message in cyan.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{}", message.cyan());
        }
    }

    /// Prints a warning in yellow with a warning symbol.
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", "⚠".yellow(), message);
        }
    }

    /// Prints an error to stderr in red with an X mark.
    ///
    /// Errors are never suppressed.
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a plain, unstyled message.
    pub fn plain(&self, message: &str) {
        if !self.quiet {
            println!("{}", message);
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
