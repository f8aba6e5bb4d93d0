//! Watch-list configuration.
//!
//! A watch list is an ordered text file with one command per line:
//!
//! ```text
//! /home/user/Downloads file_type
//! /home/user/Documents/scans date 2018
//! ```
//!
//! The first form sorts by extension category; the second by
//! last-modification date, with an optional earliest year. Blank lines
//! and lines starting with `#` are ignored. Any other malformed line
//! rejects the whole set before a single watch starts — a daemon must
//! not begin moving files under half a configuration.
//!
//! Mode and year tokens are taken from the right-hand end of each line,
//! so absolute paths containing spaces need no quoting.

use crate::sorter::SortMode;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// One watch command: a directory, a mode, and (date mode only) an
/// optional earliest year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchCommand {
    /// Directory to watch and keep sorted.
    pub path: PathBuf,
    /// How its entries are classified.
    pub mode: SortMode,
    /// Earliest year to build date folders for; `None` means the
    /// current year.
    pub earliest_year: Option<i32>,
}

/// Why a watch list was rejected.
#[derive(Debug)]
pub enum ConfigError {
    /// The watch-list file could not be read.
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A line does not have a path followed by a mode (and at most one
    /// year).
    WrongArity { line_number: usize, line: String },
    /// A line names a mode that is neither `file_type` nor `date`.
    UnknownMode {
        line_number: usize,
        mode: String,
    },
    /// A `file_type` line carries a trailing year argument.
    UnexpectedYear { line_number: usize, line: String },
    /// The file contained no commands at all.
    Empty(PathBuf),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { path, source } => {
                write!(f, "cannot read watch list {}: {}", path.display(), source)
            }
            Self::WrongArity { line_number, line } => write!(
                f,
                "line {}: expected '<path> file_type' or '<path> date [<year>]', got '{}'",
                line_number, line
            ),
            Self::UnknownMode { line_number, mode } => write!(
                f,
                "line {}: unknown sort mode '{}' (expected 'file_type' or 'date')",
                line_number, mode
            ),
            Self::UnexpectedYear { line_number, line } => write!(
                f,
                "line {}: 'file_type' takes no year argument: '{}'",
                line_number, line
            ),
            Self::Empty(path) => {
                write!(f, "watch list {} contains no commands", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The validated, ordered set of watch commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchPlan {
    commands: Vec<WatchCommand>,
}

impl WatchPlan {
    /// Reads and parses a watch-list file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let plan = Self::parse(&content)?;
        if plan.commands.is_empty() {
            return Err(ConfigError::Empty(path.to_path_buf()));
        }
        Ok(plan)
    }

    /// Parses watch-list text. Fails on the first malformed line.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidywatch::config::WatchPlan;
    /// use tidywatch::sorter::SortMode;
    ///
    /// let plan = WatchPlan::parse("/srv/inbox file_type\n/srv/scans date 2018\n").unwrap();
    /// let commands = plan.commands();
    /// assert_eq!(commands.len(), 2);
    /// assert_eq!(commands[1].mode, SortMode::ByDate);
    /// assert_eq!(commands[1].earliest_year, Some(2018));
    /// ```
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut commands = Vec::new();

        for (index, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            commands.push(Self::parse_line(line, index + 1)?);
        }

        Ok(WatchPlan { commands })
    }

    /// The commands in file order.
    pub fn commands(&self) -> &[WatchCommand] {
        &self.commands
    }

    fn parse_line(line: &str, line_number: usize) -> Result<WatchCommand, ConfigError> {
        let (head, last) = split_last_token(line).ok_or_else(|| ConfigError::WrongArity {
            line_number,
            line: line.to_string(),
        })?;

        // The last token is either the mode or a year following "date".
        if last == SortMode::ByType.token() {
            return Ok(WatchCommand {
                path: PathBuf::from(head),
                mode: SortMode::ByType,
                earliest_year: None,
            });
        }
        if last == SortMode::ByDate.token() {
            return Ok(WatchCommand {
                path: PathBuf::from(head),
                mode: SortMode::ByDate,
                earliest_year: None,
            });
        }

        if let Ok(year) = last.parse::<i32>() {
            let (path, mode) = split_last_token(head).ok_or_else(|| ConfigError::WrongArity {
                line_number,
                line: line.to_string(),
            })?;
            if mode == SortMode::ByDate.token() {
                return Ok(WatchCommand {
                    path: PathBuf::from(path),
                    mode: SortMode::ByDate,
                    earliest_year: Some(year),
                });
            }
            if mode == SortMode::ByType.token() {
                return Err(ConfigError::UnexpectedYear {
                    line_number,
                    line: line.to_string(),
                });
            }
            return Err(ConfigError::UnknownMode {
                line_number,
                mode: mode.to_string(),
            });
        }

        Err(ConfigError::UnknownMode {
            line_number,
            mode: last.to_string(),
        })
    }
}

/// Splits `text` into (everything before trailing whitespace, last token).
fn split_last_token(text: &str) -> Option<(&str, &str)> {
    let trimmed = text.trim_end();
    let split_at = trimmed.rfind(char::is_whitespace)?;
    let head = trimmed[..split_at].trim_end();
    let last = trimmed[split_at..].trim_start();
    if head.is_empty() || last.is_empty() {
        return None;
    }
    Some((head, last))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_type_command() {
        let plan = WatchPlan::parse("/watched/inbox file_type\n").unwrap();
        assert_eq!(
            plan.commands(),
            &[WatchCommand {
                path: PathBuf::from("/watched/inbox"),
                mode: SortMode::ByType,
                earliest_year: None,
            }]
        );
    }

    #[test]
    fn test_parse_date_command_without_year() {
        let plan = WatchPlan::parse("/watched/scans date\n").unwrap();
        assert_eq!(plan.commands()[0].mode, SortMode::ByDate);
        assert_eq!(plan.commands()[0].earliest_year, None);
    }

    #[test]
    fn test_parse_date_command_with_year() {
        let plan = WatchPlan::parse("/watched/scans date 2018\n").unwrap();
        assert_eq!(plan.commands()[0].earliest_year, Some(2018));
    }

    #[test]
    fn test_parse_preserves_order() {
        let plan = WatchPlan::parse("/a file_type\n/b date\n/c date 2020\n").unwrap();
        let paths: Vec<_> = plan.commands().iter().map(|c| c.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/a"),
                PathBuf::from("/b"),
                PathBuf::from("/c")
            ]
        );
    }

    #[test]
    fn test_parse_path_with_spaces() {
        let plan = WatchPlan::parse("/watched/Sample Files date 2018\n").unwrap();
        assert_eq!(
            plan.commands()[0].path,
            PathBuf::from("/watched/Sample Files")
        );
        assert_eq!(plan.commands()[0].earliest_year, Some(2018));
    }

    #[test]
    fn test_parse_skips_blank_lines_and_comments() {
        let plan =
            WatchPlan::parse("# folders to keep sorted\n\n/watched/inbox file_type\n").unwrap();
        assert_eq!(plan.commands().len(), 1);
    }

    #[test]
    fn test_unknown_mode_rejects_whole_set() {
        let result = WatchPlan::parse("/a file_type\n/b alphabetical\n");
        assert!(matches!(
            result,
            Err(ConfigError::UnknownMode { line_number: 2, .. })
        ));
    }

    #[test]
    fn test_missing_mode_rejects_whole_set() {
        assert!(matches!(
            WatchPlan::parse("/only-a-path\n"),
            Err(ConfigError::WrongArity { line_number: 1, .. })
        ));
    }

    #[test]
    fn test_non_integer_year_is_rejected() {
        // "date soon" parses as mode "soon" with path "/b date".
        assert!(matches!(
            WatchPlan::parse("/b date soon\n"),
            Err(ConfigError::UnknownMode { .. })
        ));
    }

    #[test]
    fn test_file_type_with_year_is_rejected() {
        assert!(matches!(
            WatchPlan::parse("/a file_type 2018\n"),
            Err(ConfigError::UnexpectedYear { line_number: 1, .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let missing = Path::new("/definitely/not/here.txt");
        assert!(matches!(
            WatchPlan::load(missing),
            Err(ConfigError::ReadFailed { .. })
        ));
    }

    #[test]
    fn test_load_rejects_empty_list() {
        let temp = tempfile::TempDir::new().unwrap();
        let list = temp.path().join("watch.txt");
        fs::write(&list, "# nothing but comments\n").unwrap();
        assert!(matches!(
            WatchPlan::load(&list),
            Err(ConfigError::Empty(_))
        ));
    }
}
