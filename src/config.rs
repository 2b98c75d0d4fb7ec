//! Sorter configuration: category table overrides and skip rules.
//!
//! Configuration is read from TOML and compiled into a [`Classifier`]. All fields
//! are optional; an empty file yields the standard category table and skip rules.
//!
//! # Configuration File Format
//!
//! ```toml
//! replace_default_categories = false
//!
//! [categories]
//! Ebooks = [".epub", "mobi"]
//!
//! [skip]
//! names = [".DS_Store", "Thumbs.db"]
//! extensions = ["tmp", ".part"]
//! patterns = ["~$*"]
//! regex = ['^backup_\d+']
//! allow_hidden = [".env.sample"]
//! include_hidden = false
//! ```
//!
//! A category listed under `[categories]` replaces the extensions of a standard
//! category with the same name, or is appended after the standard ones. `names`
//! and `extensions` replace the standard skip sets when present.

use crate::classifier::Classifier;
use crate::file_category::{CategoryTable, normalize_extension};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".filesortrc.toml";

/// Filenames skipped unless the configuration says otherwise.
pub const DEFAULT_SKIP_NAMES: [&str; 5] =
    [".DS_Store", "Thumbs.db", "desktop.ini", ".gitignore", ".gitkeep"];

/// Extensions skipped unless the configuration says otherwise.
pub const DEFAULT_SKIP_EXTENSIONS: [&str; 3] = [".tmp", ".temp", ".log"];

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    #[error("Invalid category name '{0}': must be a plain folder name")]
    InvalidCategoryName(String),

    #[error("Invalid extension '{extension}' in category '{category}'")]
    InvalidExtension { category: String, extension: String },

    #[error("Extension '{extension}' is claimed by both '{first}' and '{second}'")]
    DuplicateExtension {
        extension: String,
        first: String,
        second: String,
    },

    #[error("IO error reading configuration: {0}")]
    IoError(#[from] std::io::Error),
}

/// Top-level configuration as deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SorterConfig {
    /// Start from an empty category table instead of the standard one.
    #[serde(default)]
    pub replace_default_categories: bool,

    /// Category name to extensions (with or without the leading dot).
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub skip: SkipRules,
}

/// Rules deciding which directory entries are never touched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkipRules {
    /// Exact filenames to skip. `None` keeps [`DEFAULT_SKIP_NAMES`].
    #[serde(default)]
    pub names: Option<Vec<String>>,

    /// Extensions to skip. `None` keeps [`DEFAULT_SKIP_EXTENSIONS`].
    #[serde(default)]
    pub extensions: Option<Vec<String>>,

    /// Glob patterns matched against the filename.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regexes matched against the filename.
    #[serde(default)]
    pub regex: Vec<String>,

    /// Hidden filenames that are sorted anyway.
    #[serde(default)]
    pub allow_hidden: Vec<String>,

    /// Sort every hidden file.
    #[serde(default)]
    pub include_hidden: bool,
}

impl SorterConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if provided
    /// 2. `.filesortrc.toml` in the current directory
    /// 3. `~/.config/filesort/config.toml`
    /// 4. The built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly provided file is missing, or if any file
    /// found cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("filesort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile the configuration into a [`Classifier`].
    ///
    /// # Errors
    ///
    /// Returns an error for unusable category names or extensions, for an extension
    /// claimed by two categories, and for invalid glob or regex patterns.
    pub fn compile(self) -> Result<Classifier, ConfigError> {
        let table = self.build_table()?;
        let skip = SkipPolicy::from_rules(self.skip)?;
        Ok(Classifier::new(table, skip))
    }

    fn build_table(&self) -> Result<CategoryTable, ConfigError> {
        let mut table = if self.replace_default_categories {
            CategoryTable::empty()
        } else {
            CategoryTable::standard()
        };

        for (name, extensions) in &self.categories {
            validate_category_name(name)?;
            for ext in extensions {
                let normalized = normalize_extension(ext);
                if normalized.is_empty() || normalized.contains(['/', '\\']) {
                    return Err(ConfigError::InvalidExtension {
                        category: name.clone(),
                        extension: ext.clone(),
                    });
                }
            }
            table.insert(name.clone(), extensions);
        }

        if let Some(conflict) = table.conflicts().into_iter().next() {
            return Err(ConfigError::DuplicateExtension {
                extension: conflict.extension,
                first: conflict.first,
                second: conflict.second,
            });
        }

        Ok(table)
    }
}

fn validate_category_name(name: &str) -> Result<(), ConfigError> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed != name || name == "." || name == ".." {
        return Err(ConfigError::InvalidCategoryName(name.to_string()));
    }
    if name.contains(['/', '\\']) {
        return Err(ConfigError::InvalidCategoryName(name.to_string()));
    }
    Ok(())
}

/// Compiled skip rules.
///
/// Checks, in order: skip-name set, hidden files, skip-extension set, the running
/// executable's own name, glob patterns, regexes.
#[derive(Debug, Clone)]
pub struct SkipPolicy {
    include_hidden: bool,
    names: HashSet<String>,
    extensions: HashSet<String>,
    allow_hidden: HashSet<String>,
    self_names: HashSet<String>,
    patterns: Vec<Pattern>,
    regexes: Vec<Regex>,
}

impl SkipPolicy {
    fn from_rules(rules: SkipRules) -> Result<Self, ConfigError> {
        let patterns = rules
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = rules
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let names = match rules.names {
            Some(names) => names.into_iter().collect(),
            None => DEFAULT_SKIP_NAMES.iter().map(|n| n.to_string()).collect(),
        };

        let extensions = match rules.extensions {
            Some(exts) => exts.iter().map(|e| normalize_extension(e)).collect(),
            None => DEFAULT_SKIP_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        };

        Ok(Self {
            include_hidden: rules.include_hidden,
            names,
            extensions,
            allow_hidden: rules.allow_hidden.into_iter().collect(),
            self_names: current_exe_name().into_iter().collect(),
            patterns,
            regexes,
        })
    }

    /// Adds a filename that identifies this tool and must never be sorted.
    pub fn with_self_name(mut self, name: impl Into<String>) -> Self {
        self.self_names.insert(name.into());
        self
    }

    /// Returns true if a file with this name must be left where it is.
    pub fn should_skip(&self, file_name: &str) -> bool {
        if self.names.contains(file_name) {
            return true;
        }

        if file_name.starts_with('.')
            && !self.include_hidden
            && !self.allow_hidden.contains(file_name)
        {
            return true;
        }

        if let Some(ext) = Path::new(file_name).extension() {
            let ext = normalize_extension(&ext.to_string_lossy());
            if !ext.is_empty() && self.extensions.contains(&ext) {
                return true;
            }
        }

        if self.self_names.contains(file_name) {
            return true;
        }

        if self.patterns.iter().any(|pattern| pattern.matches(file_name)) {
            return true;
        }

        self.regexes.iter().any(|regex| regex.is_match(file_name))
    }
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self {
            include_hidden: false,
            names: DEFAULT_SKIP_NAMES.iter().map(|n| n.to_string()).collect(),
            extensions: DEFAULT_SKIP_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            allow_hidden: HashSet::new(),
            self_names: current_exe_name().into_iter().collect(),
            patterns: Vec::new(),
            regexes: Vec::new(),
        }
    }
}

fn current_exe_name() -> Option<String> {
    std::env::current_exe()
        .ok()?
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(toml: &str) -> SkipPolicy {
        let config = SorterConfig::from_toml_str(toml).unwrap();
        SkipPolicy::from_rules(config.skip).unwrap()
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SorterConfig::from_toml_str("").unwrap();
        assert!(!config.replace_default_categories);
        assert!(config.categories.is_empty());

        let classifier = config.compile().unwrap();
        assert_eq!(classifier.categorize(".jpg").dir_name(), "Images");
    }

    #[test]
    fn test_default_policy_skips_hidden_files() {
        let policy = SkipPolicy::default();
        assert!(policy.should_skip(".DS_Store"));
        assert!(policy.should_skip(".gitignore"));
        assert!(policy.should_skip(".hidden"));
        assert!(!policy.should_skip("photo.jpg"));
    }

    #[test]
    fn test_default_policy_skips_names_and_extensions() {
        let policy = SkipPolicy::default();
        assert!(policy.should_skip("Thumbs.db"));
        assert!(policy.should_skip("desktop.ini"));
        assert!(policy.should_skip("report.tmp"));
        assert!(policy.should_skip("build.LOG"));
        assert!(!policy.should_skip("report.txt"));
    }

    #[test]
    fn test_self_name_is_skipped() {
        let policy = SkipPolicy::default().with_self_name("filesort");
        assert!(policy.should_skip("filesort"));
        assert!(!policy.should_skip("filesort.txt"));
    }

    #[test]
    fn test_allow_hidden_overrides_hidden_rule_only() {
        let policy = policy(
            r#"
[skip]
allow_hidden = [".env.sample", ".gitignore"]
"#,
        );
        assert!(!policy.should_skip(".env.sample"));
        // still in the skip-name set
        assert!(policy.should_skip(".gitignore"));
        assert!(policy.should_skip(".other"));
    }

    #[test]
    fn test_include_hidden() {
        let policy = policy(
            r#"
[skip]
include_hidden = true
"#,
        );
        assert!(!policy.should_skip(".profile"));
        assert!(policy.should_skip(".DS_Store"));
    }

    #[test]
    fn test_configured_sets_replace_defaults() {
        let policy = policy(
            r#"
[skip]
names = ["LICENSE"]
extensions = ["BAK", ".part"]
"#,
        );
        assert!(policy.should_skip("LICENSE"));
        assert!(policy.should_skip("old.bak"));
        assert!(policy.should_skip("movie.mkv.part"));
        assert!(!policy.should_skip("Thumbs.db"));
        assert!(!policy.should_skip("debug.log"));
    }

    #[test]
    fn test_skip_patterns_and_regex() {
        let policy = policy(
            r#"
[skip]
patterns = ["~$*", "*.crdownload"]
regex = ['^backup_\d+']
"#,
        );
        assert!(policy.should_skip("~$report.docx"));
        assert!(policy.should_skip("setup.exe.crdownload"));
        assert!(policy.should_skip("backup_2024.zip"));
        assert!(!policy.should_skip("backup_notes.txt"));
    }

    #[test]
    fn test_invalid_patterns_return_errors() {
        let config = SorterConfig::from_toml_str("[skip]\npatterns = [\"[invalid\"]").unwrap();
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidGlobPattern(_))
        ));

        let config = SorterConfig::from_toml_str("[skip]\nregex = [\"[invalid(\"]").unwrap();
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidRegexPattern { .. })
        ));
    }

    #[test]
    fn test_custom_category_extends_table() {
        let config = SorterConfig::from_toml_str(
            r#"
[categories]
Ebooks = [".EPUB", "mobi"]
"#,
        )
        .unwrap();
        let classifier = config.compile().unwrap();

        assert_eq!(classifier.categorize(".epub").dir_name(), "Ebooks");
        assert_eq!(classifier.categorize(".mobi").dir_name(), "Ebooks");
        assert_eq!(classifier.categorize(".png").dir_name(), "Images");
        assert_eq!(classifier.table().iter().last().map(|(n, _)| n), Some("Ebooks"));
    }

    #[test]
    fn test_custom_category_overrides_standard_one() {
        let config = SorterConfig::from_toml_str(
            r#"
[categories]
Images = [".jpg", ".heic"]
"#,
        )
        .unwrap();
        let classifier = config.compile().unwrap();

        assert_eq!(classifier.categorize(".heic").dir_name(), "Images");
        assert_eq!(classifier.categorize(".png").dir_name(), "PNG");
    }

    #[test]
    fn test_replace_default_categories() {
        let config = SorterConfig::from_toml_str(
            r#"
replace_default_categories = true

[categories]
Pictures = ["jpg"]
"#,
        )
        .unwrap();
        let classifier = config.compile().unwrap();

        assert_eq!(classifier.table().len(), 1);
        assert_eq!(classifier.categorize(".JPG").dir_name(), "Pictures");
        assert_eq!(classifier.categorize(".pdf").dir_name(), "PDF");
    }

    #[test]
    fn test_duplicate_extension_is_rejected() {
        let config = SorterConfig::from_toml_str(
            r#"
[categories]
Web = [".html"]
"#,
        )
        .unwrap();

        match config.compile() {
            Err(ConfigError::DuplicateExtension {
                extension,
                first,
                second,
            }) => {
                assert_eq!(extension, ".html");
                assert_eq!(first, "Code");
                assert_eq!(second, "Web");
            }
            other => panic!("expected duplicate extension error, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_invalid_category_names_are_rejected() {
        for name in ["", "..", "a/b", " padded"] {
            let mut config = SorterConfig::default();
            config.categories.insert(name.to_string(), vec![".x".to_string()]);
            assert!(
                matches!(config.compile(), Err(ConfigError::InvalidCategoryName(_))),
                "name {:?} should be rejected",
                name
            );
        }
    }

    #[test]
    fn test_empty_extension_is_rejected() {
        let config = SorterConfig::from_toml_str(
            r#"
[categories]
Misc = ["."]
"#,
        )
        .unwrap();
        assert!(matches!(
            config.compile(),
            Err(ConfigError::InvalidExtension { .. })
        ));
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = SorterConfig::from_toml_str("categories = 3");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let result = SorterConfig::load(Some(Path::new("/non/existent/filesort.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }
}
