//! Classification rules for sorting directory entries.
//!
//! This module is leaf data: the static mapping from file extension to a
//! named category, and from calendar month to a destination folder name.
//! Extension matching is case-sensitive on the text exactly as stored on
//! disk; the tables hold lower-case extensions to match the lower-case
//! extensions real files overwhelmingly carry.
//!
//! # Examples
//!
//! ```
//! use tidywatch::rules::{Category, month_folder};
//!
//! assert_eq!(Category::for_extension("zip"), Category::FoldersAndArchives);
//! assert_eq!(Category::for_extension("xyz"), Category::Other);
//! assert_eq!(month_folder(3), "(3) Mar");
//! ```

/// Earliest year a date-mode target may be configured for.
pub const EARLIEST_SUPPORTED_YEAR: i32 = 1920;

/// Month abbreviations used in destination folder names, January first.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A named bucket of file extensions used in file-type mode.
///
/// The listed categories each own a fixed extension table; `Other` is the
/// reserved catch-all for extensions no table claims and is never listed
/// itself. Directory entries always classify as `FoldersAndArchives`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Sub-folders and archive formats (zip, rar, packages...).
    FoldersAndArchives,
    /// Executables and scripts.
    Executables,
    /// Text, documents, source code and structured data.
    Documents,
    /// Images, audio, video, fonts and disk images.
    Media,
    /// Anything no other category claims.
    Other,
}

impl Category {
    /// The categories that carry an extension table, in lookup order.
    ///
    /// `Other` is deliberately absent: it is the fallback, not a listed
    /// category.
    pub const LISTED: [Category; 4] = [
        Category::FoldersAndArchives,
        Category::Executables,
        Category::Documents,
        Category::Media,
    ];

    /// Returns the destination folder name for this category.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidywatch::rules::Category;
    ///
    /// assert_eq!(Category::Media.folder_name(), "Media");
    /// assert_eq!(Category::Documents.folder_name(), "Text, Documents & Data");
    /// ```
    pub fn folder_name(&self) -> &'static str {
        match self {
            Category::FoldersAndArchives => "Folders & Archives",
            Category::Executables => "Executables",
            Category::Documents => "Text, Documents & Data",
            Category::Media => "Media",
            Category::Other => "Other",
        }
    }

    /// Returns the extension table for this category.
    ///
    /// Extensions are lower-case, without the leading dot, and globally
    /// unique across categories.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::FoldersAndArchives => {
                &["zip", "z", "gz", "tz", "7z", "lzx", "rar", "pkg", "deb", "rpm"]
            }
            Category::Executables => {
                &["exe", "app", "bat", "sh", "run", "apk", "bin", "com", "wsf"]
            }
            Category::Documents => &[
                "txt", "text", "ini", "doc", "docx", "rtf", "tex", "md", "tar", "json", "csv",
                "xml", "dat", "sql", "py", "pyc", "ipynb", "html", "xhtml", "css", "scss", "js",
                "c", "cpp", "h", "java", "jar", "pps", "ppt", "pptx", "xls", "xlsm", "xlsx",
            ],
            Category::Media => &[
                "iso", "dmg", "vcd", "ttf", "fnt", "fon", "otf", "ai", "bmp", "gif", "jpeg",
                "jpg", "png", "psd", "svg", "pdf", "ico", "mp3", "mp4", "m4v", "mkv", "wav",
                "avi", "flv", "mpg", "mpeg", "wmv", "mov",
            ],
            Category::Other => &[],
        }
    }

    /// Looks up the category owning `ext`, falling back to `Other`.
    ///
    /// Matching is case-sensitive: `"ZIP"` does not match the `"zip"`
    /// table entry. The lookup is total — every extension resolves to
    /// exactly one category.
    pub fn for_extension(ext: &str) -> Category {
        for category in Category::LISTED {
            if category.extensions().contains(&ext) {
                return category;
            }
        }
        Category::Other
    }

    /// Whether `name` is one of the file-type destination folder names.
    pub fn is_destination_name(name: &str) -> bool {
        name == Category::Other.folder_name()
            || Category::LISTED.iter().any(|c| c.folder_name() == name)
    }
}

/// Returns the extension of an entry name: the text after the last `.`,
/// empty if the name contains none.
///
/// # Examples
///
/// ```
/// use tidywatch::rules::extension_of;
///
/// assert_eq!(extension_of("archive.tar.gz"), "gz");
/// assert_eq!(extension_of("noext"), "");
/// ```
pub fn extension_of(name: &str) -> &str {
    name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

/// Returns the destination folder name for a month number.
///
/// The numeric prefix keeps buckets within a year ordered chronologically
/// when sorted by that prefix: `(1) Jan`, `(2) Feb`, ... `(12) Dec`.
///
/// # Panics
///
/// Panics if `month` is outside `1..=12`.
pub fn month_folder(month: u32) -> String {
    let abbreviation = MONTH_ABBREVIATIONS[(month - 1) as usize];
    format!("({month}) {abbreviation}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_folder_names() {
        assert_eq!(
            Category::FoldersAndArchives.folder_name(),
            "Folders & Archives"
        );
        assert_eq!(Category::Executables.folder_name(), "Executables");
        assert_eq!(Category::Documents.folder_name(), "Text, Documents & Data");
        assert_eq!(Category::Media.folder_name(), "Media");
        assert_eq!(Category::Other.folder_name(), "Other");
    }

    #[test]
    fn test_extension_lookup() {
        assert_eq!(Category::for_extension("zip"), Category::FoldersAndArchives);
        assert_eq!(Category::for_extension("sh"), Category::Executables);
        assert_eq!(Category::for_extension("txt"), Category::Documents);
        assert_eq!(Category::for_extension("mp3"), Category::Media);
    }

    #[test]
    fn test_unmatched_extension_routes_to_other() {
        assert_eq!(Category::for_extension("xyz"), Category::Other);
        assert_eq!(Category::for_extension(""), Category::Other);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        // Tables hold lower-case extensions; upper-case text on disk does
        // not match them.
        assert_eq!(Category::for_extension("ZIP"), Category::Other);
        assert_eq!(Category::for_extension("Txt"), Category::Other);
    }

    #[test]
    fn test_extensions_are_globally_unique() {
        let mut seen = HashSet::new();
        for category in Category::LISTED {
            for ext in category.extensions() {
                assert!(
                    seen.insert(*ext),
                    "extension '{}' appears in more than one category",
                    ext
                );
            }
        }
    }

    #[test]
    fn test_other_lists_no_extensions() {
        assert!(Category::Other.extensions().is_empty());
    }

    #[test]
    fn test_destination_names() {
        assert!(Category::is_destination_name("Folders & Archives"));
        assert!(Category::is_destination_name("Other"));
        assert!(!Category::is_destination_name("Downloads"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.txt"), "txt");
        assert_eq!(extension_of("archive.tar.gz"), "gz");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of("trailing."), "");
        assert_eq!(extension_of(".gitignore"), "gitignore");
    }

    #[test]
    fn test_month_folder_format() {
        assert_eq!(month_folder(1), "(1) Jan");
        assert_eq!(month_folder(3), "(3) Mar");
        assert_eq!(month_folder(11), "(11) Nov");
        assert_eq!(month_folder(12), "(12) Dec");
    }

    #[test]
    fn test_month_buckets_order_chronologically_by_prefix() {
        let prefixes: Vec<u32> = (1..=12)
            .map(|m| {
                let name = month_folder(m);
                let inner = &name[1..name.find(')').unwrap()];
                inner.parse().unwrap()
            })
            .collect();
        let mut sorted = prefixes.clone();
        sorted.sort_unstable();
        assert_eq!(prefixes, sorted);
    }
}
