//! Filesystem access used by the sorter.
//!
//! Everything the sorter does to the disk goes through [`FileSystem`], so tests can
//! wrap [`StdFs`] and inject failures.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// A regular file found directly inside the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// The file name, e.g. `photo.JPG`.
    pub name: String,
    /// The extension with its leading dot as found on disk (`.JPG`), or empty.
    pub extension: String,
    /// The full path of the file.
    pub path: PathBuf,
}

impl FileEntry {
    /// Builds an entry from a path, deriving name and extension.
    ///
    /// Returns `None` for paths without a file name component.
    ///
    /// # Examples
    ///
    /// ```
    /// use filesort::fs::FileEntry;
    /// use std::path::Path;
    ///
    /// let entry = FileEntry::from_path(Path::new("/tmp/archive.tar.gz")).unwrap();
    /// assert_eq!(entry.name, "archive.tar.gz");
    /// assert_eq!(entry.extension, ".gz");
    ///
    /// let hidden = FileEntry::from_path(Path::new("/tmp/.bashrc")).unwrap();
    /// assert_eq!(hidden.extension, "");
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().into_owned();
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy())
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        Some(Self {
            name,
            extension,
            path: path.to_path_buf(),
        })
    }
}

/// The filesystem operations the sorter relies on.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Lists the regular files directly inside `dir`, in directory order.
    fn list_files(&self, dir: &Path) -> io::Result<Vec<FileEntry>>;

    /// Creates `dir` and any missing parents. Succeeds if it already exists.
    fn create_dir_all(&self, dir: &Path) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Copies `from` to `to`, failing if `to` already exists. Returns the bytes written.
    fn copy_new(&self, from: &Path, to: &Path) -> io::Result<u64>;

    fn file_len(&self, path: &Path) -> io::Result<u64>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl FileSystem for StdFs {
    fn exists(&self, path: &Path) -> bool {
        // Dangling symlinks count as taken names.
        path.symlink_metadata().is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_files(&self, dir: &Path) -> io::Result<Vec<FileEntry>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "unreadable directory entry");
                    continue;
                }
            };

            if let Ok(file_type) = entry.file_type()
                && file_type.is_file()
                && let Some(file) = FileEntry::from_path(&entry.path())
            {
                files.push(file);
            }
        }
        Ok(files)
    }

    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn copy_new(&self, from: &Path, to: &Path) -> io::Result<u64> {
        let mut source = fs::File::open(from)?;
        let mut destination = OpenOptions::new().write(true).create_new(true).open(to)?;
        let copied = io::copy(&mut source, &mut destination)
            .and_then(|written| destination.sync_all().map(|()| written));
        if copied.is_err()
            && let Err(e) = fs::remove_file(to)
        {
            tracing::warn!(file = %to.display(), error = %e, "could not remove partial copy");
        }
        copied
    }

    fn file_len(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entry_without_extension() {
        let entry = FileEntry::from_path(Path::new("/data/Makefile")).unwrap();
        assert_eq!(entry.name, "Makefile");
        assert_eq!(entry.extension, "");
    }

    #[test]
    fn test_entry_keeps_extension_case() {
        let entry = FileEntry::from_path(Path::new("/data/IMG_0001.JPG")).unwrap();
        assert_eq!(entry.extension, ".JPG");
    }

    #[test]
    fn test_entry_trailing_dot_has_no_extension() {
        let entry = FileEntry::from_path(Path::new("/data/notes.")).unwrap();
        assert_eq!(entry.extension, "");
    }

    #[test]
    fn test_list_files_skips_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        fs::write(temp_dir.path().join("b.jpg"), "b").unwrap();
        fs::create_dir(temp_dir.path().join("Images")).unwrap();

        let mut names: Vec<String> = StdFs
            .list_files(temp_dir.path())
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        names.sort();

        assert_eq!(names, vec!["a.txt", "b.jpg"]);
    }

    #[test]
    fn test_copy_new_refuses_existing_destination() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let from = temp_dir.path().join("from.txt");
        let to = temp_dir.path().join("to.txt");
        fs::write(&from, "new").unwrap();
        fs::write(&to, "old").unwrap();

        let err = StdFs.copy_new(&from, &to).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&to).unwrap(), "old");
    }

    #[test]
    fn test_create_dir_all_is_idempotent() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().join("Images");
        StdFs.create_dir_all(&dir).unwrap();
        StdFs.create_dir_all(&dir).unwrap();
        assert!(StdFs.is_dir(&dir));
    }

    #[test]
    fn test_copy_new_removes_partial_destination_on_read_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let unreadable = temp_dir.path().join("folder");
        let to = temp_dir.path().join("copy.bin");
        fs::create_dir(&unreadable).unwrap();

        assert!(StdFs.copy_new(&unreadable, &to).is_err());
        assert!(!to.exists());
    }
}
