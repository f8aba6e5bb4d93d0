//! Daemon orchestration.
//!
//! Wires a parsed [`WatchPlan`] to the watch registry, then parks the
//! main thread until an interrupt arrives. Targets that fail validation
//! are logged and skipped; the daemon only refuses to start when nothing
//! at all can be watched.

use crate::config::WatchPlan;
use crate::output::Reporter;
use crate::registry::WatchRegistry;
use crate::sorter::Sorter;
use std::fmt;
use std::sync::mpsc;

/// A startup failure that stops the process.
#[derive(Debug)]
pub enum DaemonError {
    /// Every configured target failed registration; an idle daemon with
    /// zero subscriptions can never do work.
    NothingToWatch,
    /// The interrupt handler could not be installed.
    SignalHandler(ctrlc::Error),
}

impl fmt::Display for DaemonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToWatch => {
                write!(f, "no configured directory could be watched or sorted")
            }
            Self::SignalHandler(source) => {
                write!(f, "cannot install interrupt handler: {}", source)
            }
        }
    }
}

impl std::error::Error for DaemonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NothingToWatch => None,
            Self::SignalHandler(source) => Some(source),
        }
    }
}

/// Registers every command, then blocks until Ctrl-C.
///
/// On interrupt, all subscriptions are closed and in-flight passes
/// drained before this returns, so no directory is left mid-move.
pub fn run(plan: &WatchPlan, reporter: &Reporter) -> Result<(), DaemonError> {
    let mut registry = WatchRegistry::new(reporter.clone());

    for command in plan.commands() {
        if let Err(e) = registry.register(command) {
            reporter.error(&format!("skipping watch entry: {}", e));
        }
    }
    if registry.is_empty() {
        return Err(DaemonError::NothingToWatch);
    }

    let (stop_tx, stop_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })
    .map_err(DaemonError::SignalHandler)?;

    reporter.info(&format!(
        "watching {} director{}; press Ctrl-C to stop",
        registry.len(),
        if registry.len() == 1 { "y" } else { "ies" }
    ));

    // Parks until the interrupt handler fires.
    let _ = stop_rx.recv();

    reporter.plain("interrupt received, shutting down");
    registry.unregister_all();
    Ok(())
}

/// Runs a single reconciliation pass per command and returns.
///
/// No subscriptions are opened; this is the cron-style entry point.
/// Carries the same skip-and-continue semantics as [`run`].
pub fn run_once(plan: &WatchPlan, reporter: &Reporter) -> Result<(), DaemonError> {
    let mut sorted = 0;

    for command in plan.commands() {
        let sorter = Sorter::new(
            command.path.clone(),
            command.mode,
            command.earliest_year,
            reporter.clone(),
        );
        match sorter.sort() {
            Ok(report) => {
                sorted += 1;
                reporter.success(&format!(
                    "{}: {} moved, {} stale, {} failed",
                    command.path.display(),
                    report.moved,
                    report.stale,
                    report.failures.len()
                ));
            }
            Err(e) => reporter.error(&format!("skipping {}: {}", command.path.display(), e)),
        }
    }

    if sorted == 0 {
        return Err(DaemonError::NothingToWatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_run_once_sorts_each_target() {
        let temp_a = TempDir::new().unwrap();
        let temp_b = TempDir::new().unwrap();
        File::create(temp_a.path().join("song.mp3")).unwrap();
        File::create(temp_b.path().join("notes.txt")).unwrap();

        let plan = WatchPlan::parse(&format!(
            "{} file_type\n{} file_type\n",
            temp_a.path().display(),
            temp_b.path().display()
        ))
        .unwrap();

        run_once(&plan, &Reporter::silent()).unwrap();
        assert!(temp_a.path().join("Media/song.mp3").is_file());
        assert!(temp_b.path().join("Text, Documents & Data/notes.txt").is_file());
    }

    #[test]
    fn test_run_once_skips_bad_targets() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("a.zip")).unwrap();

        let plan = WatchPlan::parse(&format!(
            "/nowhere/at/all file_type\n{} file_type\n",
            temp.path().display()
        ))
        .unwrap();

        // The good target is still sorted.
        run_once(&plan, &Reporter::silent()).unwrap();
        assert!(temp.path().join("Folders & Archives/a.zip").is_file());
    }

    #[test]
    fn test_run_once_fails_when_every_target_is_bad() {
        let plan = WatchPlan::parse("/nowhere/one file_type\n/nowhere/two date\n").unwrap();
        assert!(matches!(
            run_once(&plan, &Reporter::silent()),
            Err(DaemonError::NothingToWatch)
        ));
    }
}
