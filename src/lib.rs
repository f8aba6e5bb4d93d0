//! tidywatch - keep directories continuously organized.
//!
//! This library watches one or more directories and relocates every
//! top-level entry into a deterministic destination sub-folder, chosen
//! either by file-type category or by last-modification date. It provides
//! the classification rules, the sorting engine, the per-directory watch
//! registry, and the daemon loop that drives them from filesystem change
//! notifications.

pub mod config;
pub mod daemon;
pub mod output;
pub mod registry;
pub mod rules;
pub mod sorter;

pub use config::{ConfigError, WatchCommand, WatchPlan};
pub use output::Reporter;
pub use registry::{RegistryError, WatchRegistry};
pub use rules::Category;
pub use sorter::{SortError, SortMode, SortReport, Sorter, ValidationError};

pub use daemon::{DaemonError, run, run_once};
