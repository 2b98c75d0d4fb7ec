//! filesort - sort the files of a directory into category folders
//!
//! This library classifies files by extension, decides which files are never
//! touched, and moves the rest into one sub-folder per category without ever
//! overwriting an existing file. Dry-run and listing modes report without
//! modifying anything.

pub mod classifier;
pub mod cli;
pub mod config;
pub mod file_category;
pub mod file_organizer;
pub mod fs;
pub mod output;

pub use classifier::Classifier;
pub use config::{ConfigError, SkipPolicy, SorterConfig};
pub use file_category::{CategoryLabel, CategoryTable};
pub use file_organizer::{Mode, MoveError, RunReport, RunStats, SortError, Sorter};

pub use cli::{Cli, run_cli};
