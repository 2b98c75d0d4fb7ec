//! Sorting files of a directory into category folders.
//!
//! The [`Sorter`] takes one snapshot of the source directory, classifies every
//! eligible file and then either reports what it would do (dry-run), groups the
//! files by category (list) or moves them (execute). Moves never overwrite: a
//! taken destination name gets a `_1`, `_2`, ... suffix on its stem.
use crate::classifier::Classifier;
use crate::file_category::CategoryLabel;
use crate::fs::{FileEntry, FileSystem, StdFs};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Upper bound on `_<n>` candidates tried for one destination.
pub const MAX_COLLISION_ATTEMPTS: u32 = 10_000;

/// What a run does with the eligible files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Report destinations without touching the filesystem.
    DryRun,
    /// Group files by category, read-only.
    List,
    /// Move files into category folders.
    Execute,
}

/// Errors that abort a whole run. Raised before anything is modified.
#[derive(Debug, Error)]
pub enum SortError {
    #[error("Source directory does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Source is not a directory: {}", .0.display())]
    SourceNotADirectory(PathBuf),

    #[error("Error reading directory {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },
}

/// Errors for a single file. The run records them and carries on.
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreationFailed { path: PathBuf, source: io::Error },

    #[error("No free name for {} after {attempts} attempts", path.display())]
    CollisionExhausted { path: PathBuf, attempts: u32 },

    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("Incomplete copy of {}: wrote {written} of {expected} bytes", from.display())]
    IncompleteCopy {
        from: PathBuf,
        written: u64,
        expected: u64,
    },

    #[error("Copied {} but could not remove the original: {source}", from.display())]
    RemoveSourceFailed { from: PathBuf, source: io::Error },
}

/// A move that a dry-run would perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMove {
    pub file_name: String,
    pub category: CategoryLabel,
    pub destination: PathBuf,
}

/// A file and its category, as reported by list mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListedFile {
    pub file_name: String,
    pub category: CategoryLabel,
}

/// A file that could not be moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedMove {
    pub file_name: String,
    pub error: String,
}

/// Counters for one execute run.
///
/// `moved + skipped == eligible` always holds; `skipped` counts files left in
/// place because of an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub eligible: usize,
    pub moved: usize,
    pub skipped: usize,
    pub errors: usize,
    /// Categories that received at least one file, whether or not the folder
    /// existed before the run.
    pub categories_used: BTreeSet<String>,
    pub failures: Vec<FailedMove>,
}

impl RunStats {
    /// Sorted names of the categories touched by the run.
    pub fn categories(&self) -> Vec<&str> {
        self.categories_used.iter().map(String::as_str).collect()
    }

    pub fn is_reconciled(&self) -> bool {
        self.moved + self.skipped == self.eligible
    }
}

/// The result of [`Sorter::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "result", rename_all = "kebab-case")]
pub enum RunReport {
    Preview(Vec<PlannedMove>),
    Listing(Vec<ListedFile>),
    Executed(RunStats),
}

/// Reported for every file an execute run attempts.
#[derive(Debug)]
pub struct MoveEvent<'a> {
    /// 1-based index of this file within the run.
    pub position: usize,
    pub total: usize,
    pub entry: &'a FileEntry,
    pub category: &'a CategoryLabel,
    /// The final destination, or why the file stayed put.
    pub result: Result<&'a Path, &'a MoveError>,
}

/// Groups a listing by category folder, keeping the listing's order inside each group.
///
/// Labels that share a folder name (a category named `PDF` and unmapped `.pdf`
/// files) land in one group, as they do on disk.
pub fn group_by_category(listing: &[ListedFile]) -> BTreeMap<&str, Vec<&str>> {
    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for file in listing {
        groups
            .entry(file.category.dir_name())
            .or_default()
            .push(file.file_name.as_str());
    }
    groups
}

/// Sorts the files of one directory into category folders.
///
/// # Examples
///
/// ```no_run
/// use filesort::{Classifier, Mode, RunReport, Sorter};
/// use std::path::Path;
///
/// let sorter = Sorter::new(Classifier::default());
/// match sorter.run(Path::new("/home/user/Downloads"), None, Mode::Execute) {
///     Ok(RunReport::Executed(stats)) => println!("Moved {} files", stats.moved),
///     Ok(_) => unreachable!(),
///     Err(e) => eprintln!("Sorting failed: {}", e),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Sorter<F: FileSystem = StdFs> {
    classifier: Classifier,
    fs: F,
}

impl Sorter<StdFs> {
    pub fn new(classifier: Classifier) -> Self {
        Self::with_fs(classifier, StdFs)
    }
}

impl Default for Sorter<StdFs> {
    fn default() -> Self {
        Self::new(Classifier::default())
    }
}

impl<F: FileSystem> Sorter<F> {
    /// Creates a sorter that goes through the given filesystem implementation.
    pub fn with_fs(classifier: Classifier, fs: F) -> Self {
        Self { classifier, fs }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Runs one pass over `source` in the given mode.
    ///
    /// `target` defaults to `source`. Category folders are created directly inside it.
    ///
    /// # Errors
    ///
    /// Fails only when `source` is missing, is not a directory, or cannot be listed.
    /// Per-file problems in execute mode end up in [`RunStats`].
    pub fn run(
        &self,
        source: &Path,
        target: Option<&Path>,
        mode: Mode,
    ) -> Result<RunReport, SortError> {
        tracing::info!(
            source = %source.display(),
            target = %target.unwrap_or(source).display(),
            ?mode,
            "starting run"
        );

        match mode {
            Mode::DryRun => self.dry_run(source, target).map(RunReport::Preview),
            Mode::List => self.list(source).map(RunReport::Listing),
            Mode::Execute => self.execute(source, target).map(RunReport::Executed),
        }
    }

    /// Snapshots the eligible files directly inside `source`, in directory order.
    pub fn enumerate(&self, source: &Path) -> Result<Vec<FileEntry>, SortError> {
        if !self.fs.exists(source) {
            return Err(SortError::SourceNotFound(source.to_path_buf()));
        }
        if !self.fs.is_dir(source) {
            return Err(SortError::SourceNotADirectory(source.to_path_buf()));
        }

        let files = self
            .fs
            .list_files(source)
            .map_err(|e| SortError::ReadDir {
                path: source.to_path_buf(),
                source: e,
            })?;

        Ok(files
            .into_iter()
            .filter(|entry| {
                let skip = self.classifier.should_skip(entry);
                if skip {
                    tracing::debug!(file = %entry.name, "skipped by policy");
                }
                !skip
            })
            .collect())
    }

    /// Computes where every eligible file would go, without touching the filesystem.
    ///
    /// Destinations account for files that already exist in the category folders
    /// and for destinations claimed by earlier files of the same preview.
    pub fn dry_run(
        &self,
        source: &Path,
        target: Option<&Path>,
    ) -> Result<Vec<PlannedMove>, SortError> {
        let target = target.unwrap_or(source);
        let files = self.enumerate(source)?;

        let mut claimed: HashSet<PathBuf> = HashSet::new();
        let mut plan = Vec::with_capacity(files.len());
        for entry in files {
            let category = self.classifier.categorize(&entry.extension);
            let wanted = target.join(category.dir_name()).join(&entry.name);
            let destination =
                first_free_name(&wanted, |path| claimed.contains(path) || self.fs.exists(path))
                    .unwrap_or(wanted);
            claimed.insert(destination.clone());
            plan.push(PlannedMove {
                file_name: entry.name,
                category,
                destination,
            });
        }
        Ok(plan)
    }

    /// Lists eligible files sorted by category name, then by file name.
    pub fn list(&self, source: &Path) -> Result<Vec<ListedFile>, SortError> {
        let mut listing: Vec<ListedFile> = self
            .enumerate(source)?
            .into_iter()
            .map(|entry| ListedFile {
                category: self.classifier.categorize(&entry.extension),
                file_name: entry.name,
            })
            .collect();

        listing.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.file_name.cmp(&b.file_name))
        });
        Ok(listing)
    }

    /// Moves every eligible file into its category folder under `target`.
    pub fn execute(&self, source: &Path, target: Option<&Path>) -> Result<RunStats, SortError> {
        self.execute_with(source, target, |_| {})
    }

    /// Like [`Sorter::execute`], calling `on_move` after each file is handled.
    pub fn execute_with<C>(
        &self,
        source: &Path,
        target: Option<&Path>,
        mut on_move: C,
    ) -> Result<RunStats, SortError>
    where
        C: FnMut(MoveEvent<'_>),
    {
        let target = target.unwrap_or(source);
        let files = self.enumerate(source)?;

        let mut stats = RunStats {
            eligible: files.len(),
            ..RunStats::default()
        };

        for (index, entry) in files.iter().enumerate() {
            let category = self.classifier.categorize(&entry.extension);
            let result = self.sort_entry(entry, &category, target);

            match &result {
                Ok(destination) => {
                    tracing::debug!(
                        file = %entry.name,
                        destination = %destination.display(),
                        "moved"
                    );
                    stats.moved += 1;
                    stats.categories_used.insert(category.dir_name().to_string());
                }
                Err(e) => {
                    tracing::warn!(file = %entry.name, error = %e, "could not move file");
                    stats.errors += 1;
                    stats.skipped += 1;
                    stats.failures.push(FailedMove {
                        file_name: entry.name.clone(),
                        error: e.to_string(),
                    });
                }
            }

            on_move(MoveEvent {
                position: index + 1,
                total: files.len(),
                entry,
                category: &category,
                result: result.as_ref().map(PathBuf::as_path),
            });
        }

        Ok(stats)
    }

    fn sort_entry(
        &self,
        entry: &FileEntry,
        category: &CategoryLabel,
        target: &Path,
    ) -> Result<PathBuf, MoveError> {
        let folder = target.join(category.dir_name());
        self.ensure_folder(&folder)?;

        let destination = self.resolve_collision(&folder.join(&entry.name))?;
        self.move_file(&entry.path, &destination)?;
        Ok(destination)
    }

    /// Creates a category folder if it is missing.
    pub fn ensure_folder(&self, folder: &Path) -> Result<(), MoveError> {
        self.fs
            .create_dir_all(folder)
            .map_err(|e| MoveError::DirectoryCreationFailed {
                path: folder.to_path_buf(),
                source: e,
            })
    }

    /// Returns `destination` if it is free, else the first free `stem_<n>.ext`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use filesort::{Classifier, Sorter};
    /// use std::path::Path;
    ///
    /// // With Images/photo.jpg and Images/photo_1.jpg already present:
    /// let free = Sorter::new(Classifier::default()).resolve_collision(Path::new("Images/photo.jpg"));
    /// assert_eq!(free.unwrap(), Path::new("Images/photo_2.jpg"));
    /// ```
    pub fn resolve_collision(&self, destination: &Path) -> Result<PathBuf, MoveError> {
        first_free_name(destination, |path| self.fs.exists(path))
    }

    /// Moves a file, falling back to copy-then-delete across volumes.
    pub fn move_file(&self, from: &Path, to: &Path) -> Result<(), MoveError> {
        match self.fs.rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
                tracing::debug!(file = %from.display(), "rename crosses devices, copying");
                self.copy_then_remove(from, to)
            }
            Err(e) => Err(MoveError::RenameFailed {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
                source: e,
            }),
        }
    }

    fn copy_then_remove(&self, from: &Path, to: &Path) -> Result<(), MoveError> {
        let copy_failed = |e: io::Error| MoveError::CopyFailed {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: e,
        };

        let expected = self.fs.file_len(from).map_err(copy_failed)?;
        let written = self.fs.copy_new(from, to).map_err(copy_failed)?;

        if written != expected {
            if let Err(e) = self.fs.remove_file(to) {
                tracing::warn!(file = %to.display(), error = %e, "could not remove partial copy");
            }
            return Err(MoveError::IncompleteCopy {
                from: from.to_path_buf(),
                written,
                expected,
            });
        }

        self.fs
            .remove_file(from)
            .map_err(|e| MoveError::RemoveSourceFailed {
                from: from.to_path_buf(),
                source: e,
            })
    }
}

/// Returns `destination` unless `is_taken` says so, else the first `stem_<n>.ext`
/// that is not taken.
fn first_free_name(
    destination: &Path,
    is_taken: impl Fn(&Path) -> bool,
) -> Result<PathBuf, MoveError> {
    if !is_taken(destination) {
        return Ok(destination.to_path_buf());
    }

    let parent = destination.parent().unwrap_or_else(|| Path::new(""));
    let stem = destination
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = destination
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    for counter in 1..=MAX_COLLISION_ATTEMPTS {
        let candidate = parent.join(format!("{}_{}{}", stem, counter, suffix));
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
    }

    Err(MoveError::CollisionExhausted {
        path: destination.to_path_buf(),
        attempts: MAX_COLLISION_ATTEMPTS,
    })
}
