//! The watch registry.
//!
//! Maps each watched directory to its [`Sorter`] and the change
//! subscription driving it. Registration runs one synchronous pass first,
//! so a directory that already contains unsorted entries is corrected the
//! moment watching begins rather than on the next change.
//!
//! Each directory's sorter sits behind its own mutex: change events for
//! the same directory may be delivered concurrently, and each pass must
//! finish its snapshot-and-move cycle before the next begins. Different
//! directories never contend with each other.

use crate::config::WatchCommand;
use crate::output::Reporter;
use crate::sorter::{SortError, Sorter};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Why a watch command could not be registered.
#[derive(Debug)]
pub enum RegistryError {
    /// The initial reconciliation pass reported an invalid target or
    /// could not bootstrap the destination tree.
    InitialPass { path: PathBuf, source: SortError },
    /// The change subscription could not be opened.
    Subscribe {
        path: PathBuf,
        source: notify::Error,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialPass { path, source } => {
                write!(f, "cannot sort {}: {}", path.display(), source)
            }
            Self::Subscribe { path, source } => {
                write!(f, "cannot watch {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InitialPass { source, .. } => Some(source),
            Self::Subscribe { source, .. } => Some(source),
        }
    }
}

struct WatchHandle {
    sorter: Arc<Mutex<Sorter>>,
    watcher: RecommendedWatcher,
}

/// Owns every (directory → sorter, subscription) pair.
pub struct WatchRegistry {
    reporter: Reporter,
    watches: HashMap<PathBuf, WatchHandle>,
}

impl WatchRegistry {
    pub fn new(reporter: Reporter) -> Self {
        WatchRegistry {
            reporter,
            watches: HashMap::new(),
        }
    }

    /// Number of directories currently being watched.
    pub fn len(&self) -> usize {
        self.watches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Whether `path` already has a watch.
    pub fn is_registered(&self, path: &std::path::Path) -> bool {
        self.watches.contains_key(path)
    }

    /// Registers one watch command.
    ///
    /// Duplicate registration is a warned no-op: each directory gets
    /// exactly one sorter. Otherwise this runs an initial `sort()`
    /// synchronously and, only if that pass succeeds, opens a recursive
    /// subscription whose callback re-sorts on every relevant change.
    pub fn register(&mut self, command: &WatchCommand) -> Result<(), RegistryError> {
        if self.watches.contains_key(&command.path) {
            self.reporter.warning(&format!(
                "{} is already being watched; ignoring duplicate entry",
                command.path.display()
            ));
            return Ok(());
        }

        let sorter = Sorter::new(
            command.path.clone(),
            command.mode,
            command.earliest_year,
            self.reporter.clone(),
        );

        // A directory may already hold unsorted entries; correct it now,
        // and reject the registration if its configuration is unusable.
        let report = sorter.sort().map_err(|source| RegistryError::InitialPass {
            path: command.path.clone(),
            source,
        })?;
        if report.moved > 0 {
            self.reporter.info(&format!(
                "initial pass moved {} entr{} in {}",
                report.moved,
                if report.moved == 1 { "y" } else { "ies" },
                command.path.display()
            ));
        }

        let sorter = Arc::new(Mutex::new(sorter));
        let callback_sorter = Arc::clone(&sorter);
        let callback_reporter = self.reporter.clone();

        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            match result {
                Ok(event) if is_relevant(&event) => {
                    let sorter = lock_unpoisoned(&callback_sorter);
                    if let Err(e) = sorter.sort() {
                        callback_reporter.error(&format!("sort pass failed: {}", e));
                    }
                }
                Ok(_) => {}
                Err(e) => callback_reporter.error(&format!("watch error: {}", e)),
            }
        })
        .map_err(|source| RegistryError::Subscribe {
            path: command.path.clone(),
            source,
        })?;

        watcher
            .watch(&command.path, RecursiveMode::Recursive)
            .map_err(|source| RegistryError::Subscribe {
                path: command.path.clone(),
                source,
            })?;

        self.reporter.success(&format!(
            "watching {} ({})",
            command.path.display(),
            command.mode
        ));
        self.watches.insert(
            command.path.clone(),
            WatchHandle { sorter, watcher },
        );
        Ok(())
    }

    /// Closes every subscription and waits for in-flight passes to end.
    ///
    /// Dropping a subscription stops new callbacks; taking each sorter's
    /// mutex afterwards blocks until any pass already running has
    /// finished, so no directory is left mid-move when this returns.
    pub fn unregister_all(&mut self) {
        for (path, handle) in self.watches.drain() {
            let WatchHandle { sorter, mut watcher } = handle;

            if let Err(e) = watcher.unwatch(&path) {
                self.reporter.warning(&format!(
                    "watch on {} did not close cleanly: {}",
                    path.display(),
                    e
                ));
            }
            drop(watcher);

            let _drained = lock_unpoisoned(&sorter);
            self.reporter
                .plain(&format!("stopped watching {}", path.display()));
        }
    }
}

/// Only creations, modifications and removals warrant a pass; access
/// notifications carry no change.
fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

/// A panicked pass must not wedge the directory forever; the sorter holds
/// no in-memory state to corrupt, so a poisoned lock is safe to reclaim.
fn lock_unpoisoned<'a>(sorter: &'a Arc<Mutex<Sorter>>) -> MutexGuard<'a, Sorter> {
    sorter.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorter::{SortMode, ValidationError};
    use std::fs::File;
    use tempfile::TempDir;

    fn command(path: &std::path::Path, mode: SortMode, year: Option<i32>) -> WatchCommand {
        WatchCommand {
            path: path.to_path_buf(),
            mode,
            earliest_year: year,
        }
    }

    #[test]
    fn test_register_runs_initial_pass() {
        let temp = TempDir::new().unwrap();
        File::create(temp.path().join("a.txt")).unwrap();

        let mut registry = WatchRegistry::new(Reporter::silent());
        registry
            .register(&command(temp.path(), SortMode::ByType, None))
            .unwrap();

        // The pre-existing file was sorted synchronously.
        assert!(temp.path().join("Text, Documents & Data/a.txt").is_file());
        assert_eq!(registry.len(), 1);

        registry.unregister_all();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_registration_is_a_noop() {
        let temp = TempDir::new().unwrap();
        let mut registry = WatchRegistry::new(Reporter::silent());

        registry
            .register(&command(temp.path(), SortMode::ByType, None))
            .unwrap();
        registry
            .register(&command(temp.path(), SortMode::ByType, None))
            .unwrap();

        assert_eq!(registry.len(), 1);
        registry.unregister_all();
    }

    #[test]
    fn test_invalid_target_fails_registration() {
        let temp = TempDir::new().unwrap();
        let mut registry = WatchRegistry::new(Reporter::silent());

        let result = registry.register(&command(temp.path(), SortMode::ByDate, Some(1919)));
        match result {
            Err(RegistryError::InitialPass {
                source: SortError::Invalid(ValidationError::YearOutOfRange { year: 1919, .. }),
                ..
            }) => {}
            other => panic!("expected year-range failure, got {:?}", other.err()),
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_missing_directory_fails_registration() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone");
        let mut registry = WatchRegistry::new(Reporter::silent());

        assert!(
            registry
                .register(&command(&missing, SortMode::ByType, None))
                .is_err()
        );
        assert!(!registry.is_registered(&missing));
    }
}
