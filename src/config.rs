//! Startup configuration.
//!
//! Configuration is read once from a TOML file and never written back. It can
//! pre-register folder names, preselect a folder per category, add extensions to
//! categories and exclude files from arrangement.
//!
//! # Configuration File Format
//!
//! ```toml
//! folders = ["Docs", "Pics"]
//!
//! [selections]
//! documents = "Docs"
//! images = "Pics"
//!
//! [extensions]
//! images = [".webp", ".heic"]
//!
//! [filters]
//! skip_hidden = false
//! exclude_filenames = ["desktop.ini"]
//! exclude_patterns = ["*.part", "~$*"]
//! exclude_regex = []
//! ```

use crate::file_category::{Category, CategoryRegistry};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".arrangifyrc.toml";

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern.
    InvalidGlobPattern(String),
    /// Invalid regex pattern.
    InvalidRegexPattern {
        /// The pattern that failed to compile.
        pattern: String,
        /// Why it failed.
        reason: String,
    },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything the configuration file may set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Folder names registered at startup, in order.
    #[serde(default)]
    pub folders: Vec<String>,

    /// Default folder per category. Categories left out route to the sentinel.
    #[serde(default)]
    pub selections: BTreeMap<Category, String>,

    /// Extra extensions appended to each category's list.
    #[serde(default)]
    pub extensions: BTreeMap<Category, Vec<String>>,

    /// Files the arranger must leave alone.
    #[serde(default)]
    pub filters: FilterRules,
}

/// Exclusion rules. A file matching any rule stays in the source folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterRules {
    /// Leave files whose name starts with `.` untouched.
    #[serde(default)]
    pub skip_hidden: bool,

    /// Exact file names to leave alone.
    #[serde(default)]
    pub exclude_filenames: Vec<String>,

    /// Glob patterns matched against the file name.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Regular expressions matched against the file name.
    #[serde(default)]
    pub exclude_regex: Vec<String>,
}

impl AppConfig {
    /// Loads configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if given (it must exist)
    /// 2. `.arrangifyrc.toml` in the current directory
    /// 3. `~/.config/arrangify/config.toml`
    /// 4. Built-in defaults
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
                .join("arrangify")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Loads configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Builds the category registry: defaults plus configured extensions.
    pub fn category_registry(&self) -> CategoryRegistry {
        let mut registry = CategoryRegistry::default();
        for (category, exts) in &self.extensions {
            for ext in exts {
                if !registry.add_extension(*category, ext) {
                    tracing::debug!(%category, ext = %ext, "Extension already listed");
                }
            }
        }
        registry
    }

    /// Compiles the exclusion rules.
    pub fn exclusions(&self) -> Result<Exclusions, ConfigError> {
        Exclusions::new(&self.filters)
    }
}

/// Compiled exclusion rules, ready to test file names.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    skip_hidden: bool,
    filenames: HashSet<String>,
    patterns: Vec<Pattern>,
    regexes: Vec<Regex>,
}

impl Exclusions {
    /// Compiles filter rules.
    ///
    /// # Errors
    ///
    /// Returns an error for the first glob or regex that fails to compile.
    pub fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let patterns = rules
            .exclude_patterns
            .iter()
            .map(|p| Pattern::new(p).map_err(|_| ConfigError::InvalidGlobPattern(p.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = rules
            .exclude_regex
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden: rules.skip_hidden,
            filenames: rules.exclude_filenames.iter().cloned().collect(),
            patterns,
            regexes,
        })
    }

    /// Returns true if the file must be left where it is.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        (self.skip_hidden && file_name.starts_with('.'))
            || self.filenames.contains(file_name)
            || self.patterns.iter().any(|p| p.matches(file_name))
            || self.regexes.iter().any(|r| r.is_match(file_name))
    }
}
