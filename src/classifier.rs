//! Classification of directory entries.
//!
//! A [`Classifier`] pairs a [`CategoryTable`] with a [`SkipPolicy`]. Both are
//! immutable for the lifetime of a run.

use crate::config::SkipPolicy;
use crate::file_category::{CategoryLabel, CategoryTable};
use crate::fs::FileEntry;

/// Decides which category a file belongs to and whether it is touched at all.
///
/// # Examples
///
/// ```
/// use filesort::Classifier;
/// use filesort::fs::FileEntry;
/// use std::path::Path;
///
/// let classifier = Classifier::default();
/// let entry = FileEntry::from_path(Path::new("/tmp/holiday.JPG")).unwrap();
///
/// assert!(!classifier.should_skip(&entry));
/// assert_eq!(classifier.categorize(&entry.extension).dir_name(), "Images");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    table: CategoryTable,
    skip: SkipPolicy,
}

impl Classifier {
    pub fn new(table: CategoryTable, skip: SkipPolicy) -> Self {
        Self { table, skip }
    }

    /// Maps an extension (dot optional, any case) to its category label.
    pub fn categorize(&self, extension: &str) -> CategoryLabel {
        self.table.categorize(extension)
    }

    /// Returns true if the entry must not be sorted.
    pub fn should_skip(&self, entry: &FileEntry) -> bool {
        self.skip.should_skip(&entry.name)
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }
}
