//! Extension based categorization of files.
//!
//! A [`CategoryTable`] maps category names (which double as folder names) to the
//! set of extensions they claim. Lookups are case-insensitive and files whose
//! extension no category claims get a label synthesized from the extension itself.
//!
//! # Examples
//!
//! ```
//! use filesort::file_category::{CategoryLabel, CategoryTable};
//!
//! let table = CategoryTable::default();
//! assert_eq!(table.categorize(".JPG").dir_name(), "Images");
//! assert_eq!(table.categorize(".xyz").dir_name(), "XYZ");
//! assert_eq!(table.categorize(""), CategoryLabel::NoExtension);
//! ```
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Folder name used for files that have no extension at all.
pub const NO_EXTENSION: &str = "NO_EXTENSION";

/// The category a single file was classified into.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryLabel {
    /// A category claimed in the table (e.g. "Images").
    Named(String),
    /// No category claims the extension; holds the upper-cased extension without its dot.
    Unmapped(String),
    /// The file has no extension.
    NoExtension,
}

impl CategoryLabel {
    /// Returns the folder name for this label.
    ///
    /// # Examples
    ///
    /// ```
    /// use filesort::file_category::CategoryLabel;
    ///
    /// assert_eq!(CategoryLabel::Named("Images".into()).dir_name(), "Images");
    /// assert_eq!(CategoryLabel::Unmapped("XYZ".into()).dir_name(), "XYZ");
    /// assert_eq!(CategoryLabel::NoExtension.dir_name(), "NO_EXTENSION");
    /// ```
    pub fn dir_name(&self) -> &str {
        match self {
            CategoryLabel::Named(name) => name,
            CategoryLabel::Unmapped(ext) => ext,
            CategoryLabel::NoExtension => NO_EXTENSION,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            CategoryLabel::Named(_) => 0,
            CategoryLabel::Unmapped(_) => 1,
            CategoryLabel::NoExtension => 2,
        }
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

// Labels sort by folder name so listings come out alphabetically.
impl Ord for CategoryLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dir_name()
            .cmp(other.dir_name())
            .then_with(|| self.rank().cmp(&other.rank()))
    }
}

impl PartialOrd for CategoryLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for CategoryLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.dir_name())
    }
}

/// Normalizes an extension to the lowercase, dot-prefixed form used by the table.
///
/// Returns an empty string for an empty (or dot-only) extension.
///
/// # Examples
///
/// ```
/// use filesort::file_category::normalize_extension;
///
/// assert_eq!(normalize_extension("JPG"), ".jpg");
/// assert_eq!(normalize_extension(".Tar"), ".tar");
/// assert_eq!(normalize_extension(""), "");
/// ```
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(".{}", trimmed.to_lowercase())
    }
}

/// An extension claimed by more than one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionConflict {
    pub extension: String,
    /// The category that wins lookups (first in insertion order).
    pub first: String,
    pub second: String,
}

/// Ordered mapping from category name to the extensions it claims.
///
/// Insertion order is kept for listing output. When two categories claim the same
/// extension, the one inserted first wins.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    categories: Vec<(String, BTreeSet<String>)>,
    index: HashMap<String, usize>,
}

impl CategoryTable {
    /// Creates a table with no categories.
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Creates the standard table.
    pub fn standard() -> Self {
        let mut table = Self::empty();
        table.insert(
            "Images",
            [".jpg", ".jpeg", ".png", ".gif", ".bmp", ".svg", ".webp", ".ico", ".tiff"],
        );
        table.insert(
            "Documents",
            [".pdf", ".doc", ".docx", ".txt", ".rtf", ".odt", ".pages"],
        );
        table.insert("Spreadsheets", [".xls", ".xlsx", ".csv", ".ods", ".numbers"]);
        table.insert("Presentations", [".ppt", ".pptx", ".odp", ".key"]);
        table.insert(
            "Videos",
            [".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".m4v"],
        );
        table.insert("Audio", [".mp3", ".wav", ".flac", ".aac", ".ogg", ".wma", ".m4a"]);
        table.insert("Archives", [".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz"]);
        table.insert(
            "Code",
            [".py", ".js", ".html", ".css", ".java", ".cpp", ".c", ".php", ".rb", ".go"],
        );
        table.insert(
            "Executables",
            [".exe", ".msi", ".deb", ".rpm", ".dmg", ".pkg", ".app"],
        );
        table.insert("Fonts", [".ttf", ".otf", ".woff", ".woff2", ".eot"]);
        table
    }

    /// Adds a category, or replaces the extensions of an existing one in place.
    ///
    /// Extensions are normalized with [`normalize_extension`]; empty ones are dropped.
    pub fn insert<I, S>(&mut self, name: impl Into<String>, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        let extensions: BTreeSet<String> = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .filter(|ext| !ext.is_empty())
            .collect();

        match self.categories.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, set)) => *set = extensions,
            None => self.categories.push((name, extensions)),
        }
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (position, (_, extensions)) in self.categories.iter().enumerate() {
            for ext in extensions {
                self.index.entry(ext.clone()).or_insert(position);
            }
        }
    }

    /// Returns the category claiming `ext`, if any. Case-insensitive; the dot is optional.
    pub fn category_for(&self, ext: &str) -> Option<&str> {
        let ext = normalize_extension(ext);
        self.index
            .get(&ext)
            .map(|&position| self.categories[position].0.as_str())
    }

    /// Classifies an extension.
    ///
    /// Unclaimed extensions map to their upper-cased text without the dot, and an
    /// empty extension maps to [`CategoryLabel::NoExtension`].
    pub fn categorize(&self, ext: &str) -> CategoryLabel {
        if let Some(name) = self.category_for(ext) {
            return CategoryLabel::Named(name.to_string());
        }

        let normalized = normalize_extension(ext);
        match normalized.strip_prefix('.') {
            Some(bare) if !bare.is_empty() => CategoryLabel::Unmapped(bare.to_uppercase()),
            _ => CategoryLabel::NoExtension,
        }
    }

    /// Returns every extension claimed by more than one category.
    pub fn conflicts(&self) -> Vec<ExtensionConflict> {
        let mut conflicts = Vec::new();
        for (position, (name, extensions)) in self.categories.iter().enumerate() {
            for ext in extensions {
                let owner = self.index[ext];
                if owner != position {
                    conflicts.push(ExtensionConflict {
                        extension: ext.clone(),
                        first: self.categories[owner].0.clone(),
                        second: name.clone(),
                    });
                }
            }
        }
        conflicts
    }

    /// Iterates over categories in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.categories
            .iter()
            .map(|(name, extensions)| (name.as_str(), extensions))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> CategoryLabel {
        CategoryLabel::Named(name.to_string())
    }

    #[test]
    fn test_standard_table_lookups() {
        let table = CategoryTable::default();
        assert_eq!(table.categorize(".jpg"), named("Images"));
        assert_eq!(table.categorize(".pdf"), named("Documents"));
        assert_eq!(table.categorize(".csv"), named("Spreadsheets"));
        assert_eq!(table.categorize(".key"), named("Presentations"));
        assert_eq!(table.categorize(".mkv"), named("Videos"));
        assert_eq!(table.categorize(".flac"), named("Audio"));
        assert_eq!(table.categorize(".7z"), named("Archives"));
        assert_eq!(table.categorize(".html"), named("Code"));
        assert_eq!(table.categorize(".deb"), named("Executables"));
        assert_eq!(table.categorize(".woff2"), named("Fonts"));
    }

    #[test]
    fn test_categorize_case_insensitive() {
        let table = CategoryTable::default();
        for (name, extensions) in table.iter() {
            for ext in extensions {
                assert_eq!(table.categorize(&ext.to_uppercase()), named(name));
                assert_eq!(table.categorize(ext), named(name));
            }
        }
    }

    #[test]
    fn test_categorize_without_dot() {
        let table = CategoryTable::default();
        assert_eq!(table.categorize("png"), named("Images"));
        assert_eq!(table.category_for("Mp3"), Some("Audio"));
    }

    #[test]
    fn test_unknown_extension_upper_cased() {
        let table = CategoryTable::default();
        assert_eq!(table.categorize(".xyz"), CategoryLabel::Unmapped("XYZ".into()));
        assert_eq!(table.categorize(".Md").dir_name(), "MD");
    }

    #[test]
    fn test_empty_extension_is_sentinel() {
        let table = CategoryTable::default();
        assert_eq!(table.categorize(""), CategoryLabel::NoExtension);
        assert_eq!(table.categorize("."), CategoryLabel::NoExtension);
        assert_eq!(CategoryLabel::NoExtension.dir_name(), NO_EXTENSION);
    }

    #[test]
    fn test_standard_table_has_no_conflicts() {
        assert!(CategoryTable::standard().conflicts().is_empty());
    }

    #[test]
    fn test_overlapping_table_first_category_wins() {
        let mut table = CategoryTable::empty();
        table.insert("Web", [".html", ".css"]);
        table.insert("Code", [".html", ".rs"]);

        assert_eq!(table.category_for(".html"), Some("Web"));
        assert_eq!(table.category_for(".rs"), Some("Code"));
        assert_eq!(
            table.conflicts(),
            vec![ExtensionConflict {
                extension: ".html".into(),
                first: "Web".into(),
                second: "Code".into(),
            }]
        );
    }

    #[test]
    fn test_insert_replaces_existing_category_in_place() {
        let mut table = CategoryTable::default();
        table.insert("Images", ["raw"]);

        assert_eq!(table.category_for(".raw"), Some("Images"));
        assert_eq!(table.category_for(".jpg"), None);
        assert_eq!(table.iter().next().map(|(name, _)| name), Some("Images"));
        assert_eq!(table.len(), 10);
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let table = CategoryTable::default();
        let names: Vec<&str> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "Images",
                "Documents",
                "Spreadsheets",
                "Presentations",
                "Videos",
                "Audio",
                "Archives",
                "Code",
                "Executables",
                "Fonts"
            ]
        );
    }

    #[test]
    fn test_labels_sort_by_folder_name() {
        let mut labels = vec![
            CategoryLabel::NoExtension,
            named("Images"),
            CategoryLabel::Unmapped("XYZ".into()),
            named("Documents"),
        ];
        labels.sort();
        let names: Vec<&str> = labels.iter().map(|l| l.dir_name()).collect();
        assert_eq!(names, vec!["Documents", "Images", "NO_EXTENSION", "XYZ"]);
    }

    #[test]
    fn test_label_serializes_as_folder_name() {
        let json = serde_json::to_string(&named("Images")).unwrap();
        assert_eq!(json, "\"Images\"");
    }
}
