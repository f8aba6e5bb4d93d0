//! The sorting engine.
//!
//! A [`Sorter`] owns one sort target: a directory it keeps organized by
//! relocating every top-level entry into a deterministic destination
//! sub-folder. File-type mode buckets entries by extension category;
//! date mode buckets them by local last-modification year and month.
//!
//! A pass is `validate` → `ensure_destination_folders` → `reconcile`.
//! Validation failures are inert (no filesystem mutation); per-entry
//! relocation failures are reported and skipped so one bad entry never
//! aborts a pass; destination folders are excluded from every snapshot,
//! which makes repeated passes over a sorted directory no-ops.

use crate::output::Reporter;
use crate::rules::{self, Category, EARLIEST_SUPPORTED_YEAR};
use chrono::{DateTime, Datelike, Local};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// How entries in a sort target are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Bucket by extension category.
    ByType,
    /// Bucket by last-modification year and month.
    ByDate,
}

impl SortMode {
    /// The token naming this mode in watch-list files.
    pub fn token(&self) -> &'static str {
        match self {
            SortMode::ByType => "file_type",
            SortMode::ByDate => "date",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A sort-target invariant that failed validation.
///
/// Mode invalidity has no variant here: the mode is a closed enum, and
/// unrecognized mode text never survives watch-list parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The target path is not absolute.
    PathNotAbsolute(PathBuf),
    /// The target path does not exist.
    PathMissing(PathBuf),
    /// The target path exists but is not a directory.
    NotADirectory(PathBuf),
    /// The earliest year lies outside `[1920, current year]`.
    YearOutOfRange { year: i32, current: i32 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathNotAbsolute(path) => {
                write!(f, "path is not absolute: {}", path.display())
            }
            Self::PathMissing(path) => write!(f, "path does not exist: {}", path.display()),
            Self::NotADirectory(path) => {
                write!(f, "path is not a directory: {}", path.display())
            }
            Self::YearOutOfRange { year, current } => write!(
                f,
                "earliest year {} is outside the supported range {}..={}",
                year, EARLIEST_SUPPORTED_YEAR, current
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A failure that aborts a whole sort pass.
#[derive(Debug)]
pub enum SortError {
    /// The target failed invariant validation; nothing was mutated.
    Invalid(ValidationError),
    /// A destination folder could not be created, so the pass cannot
    /// proceed on a partially-built tree.
    Bootstrap {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The target directory could not be listed.
    Snapshot {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(reason) => write!(f, "invalid sort target: {}", reason),
            Self::Bootstrap { path, source } => write!(
                f,
                "failed to create destination folder {}: {}",
                path.display(),
                source
            ),
            Self::Snapshot { path, source } => {
                write!(f, "failed to list {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for SortError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Invalid(reason) => Some(reason),
            Self::Bootstrap { source, .. } | Self::Snapshot { source, .. } => Some(source),
        }
    }
}

/// Why one entry could not be relocated. The pass continues past it.
#[derive(Debug)]
pub enum EntryError {
    /// The destination already holds an entry of the same name; moving
    /// would overwrite it.
    DestinationExists(PathBuf),
    /// The entry's metadata could not be read (it may have vanished
    /// between the snapshot and the move).
    Inspect {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The rename itself failed.
    Move {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DestinationExists(path) => {
                write!(f, "destination already exists: {}", path.display())
            }
            Self::Inspect { path, source } => {
                write!(f, "could not read metadata of {}: {}", path.display(), source)
            }
            Self::Move { from, to, source } => write!(
                f,
                "failed to move {} to {}: {}",
                from.display(),
                to.display(),
                source
            ),
        }
    }
}

impl std::error::Error for EntryError {}

/// Outcome of one reconciliation pass.
#[derive(Debug, Default)]
pub struct SortReport {
    /// Entries successfully relocated.
    pub moved: usize,
    /// Date-mode entries older than the earliest year, left in place.
    pub stale: usize,
    /// Entries that could not be relocated, with the reason each.
    pub failures: Vec<(String, EntryError)>,
}

impl SortReport {
    /// Whether every eligible entry was relocated.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Keeps one directory organized.
///
/// The sorter never caches directory state: every pass re-validates the
/// target and re-lists its entries, so concurrent external changes are
/// picked up by the next pass rather than corrupting the current one.
pub struct Sorter {
    target: PathBuf,
    mode: SortMode,
    earliest_year: i32,
    reporter: Reporter,
}

impl Sorter {
    /// Creates a sorter for `target`.
    ///
    /// `earliest_year` only matters in date mode and defaults to the
    /// current year. Construction never touches the filesystem; call
    /// [`Sorter::sort`] to run a pass.
    pub fn new(
        target: PathBuf,
        mode: SortMode,
        earliest_year: Option<i32>,
        reporter: Reporter,
    ) -> Self {
        Sorter {
            target,
            mode,
            earliest_year: earliest_year.unwrap_or_else(|| Local::now().year()),
            reporter,
        }
    }

    /// The directory this sorter owns.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The configured sort mode.
    pub fn mode(&self) -> SortMode {
        self.mode
    }

    /// Re-checks the target invariants.
    ///
    /// Checked on every pass rather than once at construction: the
    /// directory may be deleted or replaced while it is being watched.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.target.is_absolute() {
            return Err(ValidationError::PathNotAbsolute(self.target.clone()));
        }
        if !self.target.exists() {
            return Err(ValidationError::PathMissing(self.target.clone()));
        }
        if !self.target.is_dir() {
            return Err(ValidationError::NotADirectory(self.target.clone()));
        }
        let current = Local::now().year();
        if !(EARLIEST_SUPPORTED_YEAR..=current).contains(&self.earliest_year) {
            return Err(ValidationError::YearOutOfRange {
                year: self.earliest_year,
                current,
            });
        }
        Ok(())
    }

    /// Idempotently builds the full destination tree.
    ///
    /// Every folder is checked individually, so a partially-built tree
    /// left behind by an interrupted pass is completed rather than
    /// skipped. Classification must not start before this succeeds.
    pub fn ensure_destination_folders(&self) -> Result<(), SortError> {
        match self.mode {
            SortMode::ByType => {
                for category in Category::LISTED.into_iter().chain([Category::Other]) {
                    self.ensure_dir(&self.target.join(category.folder_name()))?;
                }
            }
            SortMode::ByDate => {
                let current = Local::now().year();
                for year in self.earliest_year..=current {
                    let year_dir = self.target.join(year.to_string());
                    self.ensure_dir(&year_dir)?;
                    for month in 1..=12 {
                        self.ensure_dir(&year_dir.join(rules::month_folder(month)))?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Relocates every eligible top-level entry into its destination.
    ///
    /// Works from a snapshot taken at the start of the pass; entries that
    /// appear afterwards are left for the next pass. Destination folders
    /// are excluded by name, which is what makes sorting idempotent.
    pub fn reconcile(&self) -> Result<SortReport, SortError> {
        let snapshot = self.snapshot()?;
        let mut report = SortReport::default();

        match self.mode {
            SortMode::ByType => self.reconcile_by_type(snapshot, &mut report),
            SortMode::ByDate => self.reconcile_by_date(snapshot, &mut report),
        }

        Ok(report)
    }

    /// Runs one full pass: validate, build destinations, reconcile.
    ///
    /// A validation failure performs no filesystem mutation and names the
    /// violated invariant. Per-entry failures do not fail the pass; they
    /// are collected in the returned [`SortReport`].
    pub fn sort(&self) -> Result<SortReport, SortError> {
        self.validate().map_err(SortError::Invalid)?;
        self.ensure_destination_folders()?;
        self.reconcile()
    }

    fn reconcile_by_type(&self, snapshot: Vec<String>, report: &mut SortReport) {
        for name in snapshot {
            // Never sort the destination folders themselves.
            if Category::is_destination_name(&name) {
                continue;
            }

            let old_path = self.target.join(&name);
            let category = if old_path.is_dir() {
                Category::FoldersAndArchives
            } else {
                Category::for_extension(rules::extension_of(&name))
            };

            let dest_dir = self.target.join(category.folder_name());
            self.relocate(&name, &old_path, &dest_dir, report);
        }
    }

    fn reconcile_by_date(&self, snapshot: Vec<String>, report: &mut SortReport) {
        let current = Local::now().year();

        for name in snapshot {
            if self.is_year_destination(&name, current) {
                continue;
            }

            let old_path = self.target.join(&name);
            let modified: DateTime<Local> =
                match fs::metadata(&old_path).and_then(|meta| meta.modified()) {
                    Ok(time) => time.into(),
                    Err(source) => {
                        let failure = EntryError::Inspect {
                            path: old_path,
                            source,
                        };
                        self.reporter
                            .error(&format!("skipping '{}': {}", name, failure));
                        report.failures.push((name, failure));
                        continue;
                    }
                };

            if modified.year() < self.earliest_year {
                self.reporter.warning(&format!(
                    "'{}' was last modified in {}, earlier than {}; left in place",
                    name,
                    modified.year(),
                    self.earliest_year
                ));
                report.stale += 1;
                continue;
            }

            let dest_dir = self
                .target
                .join(modified.year().to_string())
                .join(rules::month_folder(modified.month()));
            self.relocate(&name, &old_path, &dest_dir, report);
        }
    }

    /// Whether `name` is one of this target's year destination folders.
    fn is_year_destination(&self, name: &str, current: i32) -> bool {
        name.parse::<i32>()
            .is_ok_and(|year| (self.earliest_year..=current).contains(&year))
    }

    /// Moves one entry into `dest_dir`, recording the outcome.
    ///
    /// Never overwrites: an existing destination of the same name is a
    /// per-entry failure and the source stays where it is.
    fn relocate(&self, name: &str, from: &Path, dest_dir: &Path, report: &mut SortReport) {
        let destination = dest_dir.join(name);
        if destination.exists() {
            let failure = EntryError::DestinationExists(destination);
            self.reporter
                .error(&format!("cannot move '{}': {}", name, failure));
            report.failures.push((name.to_string(), failure));
            return;
        }

        match fs::rename(from, &destination) {
            Ok(()) => {
                let bucket = destination
                    .parent()
                    .and_then(|dir| dir.strip_prefix(&self.target).ok())
                    .unwrap_or(dest_dir);
                self.reporter
                    .success(&format!("moved '{}' to {}/", name, bucket.display()));
                report.moved += 1;
            }
            Err(source) => {
                let failure = EntryError::Move {
                    from: from.to_path_buf(),
                    to: destination,
                    source,
                };
                self.reporter
                    .error(&format!("cannot move '{}': {}", name, failure));
                report.failures.push((name.to_string(), failure));
            }
        }
    }

    /// Lists the target's entry names at this instant.
    fn snapshot(&self) -> Result<Vec<String>, SortError> {
        let entries = fs::read_dir(&self.target).map_err(|source| SortError::Snapshot {
            path: self.target.clone(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    fn ensure_dir(&self, path: &Path) -> Result<(), SortError> {
        if path.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(path).map_err(|source| SortError::Bootstrap {
            path: path.to_path_buf(),
            source,
        })
    }
}
