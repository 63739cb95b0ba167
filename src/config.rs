//! Run settings and file filtering rules.
//!
//! [`Settings`] carries the directory a run operates on. It defaults to the
//! user's Downloads folder but can point anywhere, which is how tests keep away
//! from real user data.
//!
//! [`FilterConfig`] is an optional TOML file listing files that must be left in
//! place (half-finished downloads, OS metadata files). It cannot add or change
//! categories. Supported rules:
//! - Exact filename matching
//! - Glob pattern matching on the file name
//! - File extension matching
//! - Regex matching on the file name
//! - Include patterns that override every exclude rule
//!
//! # Configuration File Format
//!
//! ```toml
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["desktop.ini", ".DS_Store"]
//! patterns = ["*.crdownload", "*.part"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while resolving settings or loading filters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{0}': expected something like *.part")]
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
    /// No directory was given and the platform has no Downloads folder.
    #[error("Could not determine the Downloads directory; pass a directory explicitly")]
    NoDownloadDir,
}

/// Everything a single organize run needs to know about its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory whose immediate children are organized.
    pub target_dir: PathBuf,
    /// Report destinations without creating folders or moving files.
    pub dry_run: bool,
}

impl Settings {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Uses `target_dir` when given, otherwise the user's Downloads folder.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoDownloadDir` if no directory was given and none
    /// can be determined for the current user.
    pub fn resolve(target_dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        match target_dir {
            Some(dir) => Ok(Self::new(dir)),
            None => default_download_dir()
                .map(Self::new)
                .ok_or(ConfigError::NoDownloadDir),
        }
    }
}

/// The current user's Downloads folder, falling back to `~/Downloads`.
pub fn default_download_dir() -> Option<PathBuf> {
    dirs::download_dir().or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
}

/// Configuration for file filtering and exclusion rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub filters: FilterRules,
}

/// Root-level filter rules configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether files starting with "." are organized. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including files (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

fn default_enable_hidden_files() -> bool {
    true
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

/// Rules for leaving files where they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., "desktop.ini").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name (e.g., "*.crdownload").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude, without the dot (e.g., "tmp", "part").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including files, overriding exclude rules (whitelist).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl FilterConfig {
    /// Load the configuration at `config_path`, or the built-in defaults when none is given.
    ///
    /// No file is ever picked up implicitly; filters apply only when asked for.
    ///
    /// # Errors
    ///
    /// Returns an error if the given file cannot be read or is malformed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::IoError` if file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile configuration into filter structures ready for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile(self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(self.filters)
    }
}

/// Pre-compiled filter rules.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl Default for CompiledFilters {
    /// Filters that let every file through.
    fn default() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Whether the file at `file_path` should be organized.
    ///
    /// Only the file name is inspected. Checks run in this order:
    /// 1. Include patterns: a match always includes
    /// 2. Hidden files, when disabled
    /// 3. Exact filenames
    /// 4. Extensions (case-insensitive)
    /// 5. Glob patterns
    /// 6. Regex patterns
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.include_patterns.iter().any(|p| p.matches(&file_name)) {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension()
            && self
                .exclude_extensions
                .contains(&ext.to_string_lossy().to_lowercase())
        {
            return false;
        }

        if self.exclude_patterns.iter().any(|p| p.matches(&file_name)) {
            return false;
        }

        !self.exclude_regexes.iter().any(|re| re.is_match(&file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn filters_from(toml: &str) -> CompiledFilters {
        FilterConfig::from_toml(toml)
            .expect("valid toml")
            .compile()
            .expect("valid filters")
    }

    #[test]
    fn test_settings_explicit_directory() {
        let settings = Settings::resolve(Some(PathBuf::from("/tmp/inbox"))).unwrap();
        assert_eq!(settings.target_dir, PathBuf::from("/tmp/inbox"));
        assert!(!settings.dry_run);
        assert!(settings.with_dry_run(true).dry_run);
    }

    #[test]
    fn test_resolve_without_directory_uses_downloads() {
        match Settings::resolve(None) {
            Ok(settings) => {
                assert_eq!(Some(settings.target_dir.clone()), default_download_dir());
                assert!(settings.target_dir.file_name().is_some());
                assert!(!settings.dry_run);
            }
            Err(e) => {
                assert_eq!(e, ConfigError::NoDownloadDir);
                assert_eq!(default_download_dir(), None);
            }
        }
    }

    #[test]
    fn test_load_without_path_is_default() {
        assert_eq!(FilterConfig::load(None), Ok(FilterConfig::default()));
    }

    #[test]
    fn test_default_config_lets_everything_through() {
        let config = FilterConfig::default();
        assert!(config.filters.enable_hidden_files);

        let compiled = config.compile().unwrap();
        assert!(compiled.should_include(Path::new(".bashrc")));
        assert!(compiled.should_include(Path::new("photo.jpg")));
        assert!(compiled.should_include(Path::new("README")));
    }

    #[test]
    fn test_compiled_default_matches_default_config() {
        let from_config = FilterConfig::default().compile().unwrap();
        let direct = CompiledFilters::default();
        for name in [".hidden", "a.tmp", "b.part", "c"] {
            assert_eq!(
                from_config.should_include(Path::new(name)),
                direct.should_include(Path::new(name))
            );
        }
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        assert_eq!(FilterConfig::from_toml("").unwrap(), FilterConfig::default());
    }

    #[test]
    fn test_hidden_files_can_be_disabled() {
        let compiled = filters_from("[filters]\nenable_hidden_files = false\n");
        assert!(!compiled.should_include(Path::new(".DS_Store")));
        assert!(compiled.should_include(Path::new("notes.txt")));
    }

    #[test]
    fn test_exclude_exact_filename() {
        let compiled = filters_from(
            r#"
            [filters.exclude]
            filenames = ["desktop.ini", "Thumbs.db"]
            "#,
        );
        assert!(!compiled.should_include(Path::new("/downloads/desktop.ini")));
        assert!(!compiled.should_include(Path::new("Thumbs.db")));
        assert!(compiled.should_include(Path::new("thumbs.png")));
    }

    #[test]
    fn test_exclude_extensions_ignores_case_and_dot() {
        let compiled = filters_from(
            r#"
            [filters.exclude]
            extensions = ["tmp", ".PART"]
            "#,
        );
        assert!(!compiled.should_include(Path::new("a.TMP")));
        assert!(!compiled.should_include(Path::new("movie.mkv.part")));
        assert!(compiled.should_include(Path::new("movie.mkv")));
    }

    #[test]
    fn test_exclude_glob_matches_file_name_only() {
        let compiled = filters_from(
            r#"
            [filters.exclude]
            patterns = ["*.crdownload", "Unconfirmed ?*"]
            "#,
        );
        assert!(!compiled.should_include(Path::new("/home/u/Downloads/setup.exe.crdownload")));
        assert!(!compiled.should_include(Path::new("Unconfirmed 1234.crdownload")));
        assert!(!compiled.should_include(Path::new("Unconfirmed 55")));
        assert!(compiled.should_include(Path::new("setup.exe")));
    }

    #[test]
    fn test_exclude_regex() {
        let compiled = filters_from(
            r#"
            [filters.exclude]
            regex = ['^~\$']
            "#,
        );
        assert!(!compiled.should_include(Path::new("~$report.docx")));
        assert!(compiled.should_include(Path::new("report.docx")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let compiled = filters_from(
            r#"
            [filters]
            enable_hidden_files = false

            [filters.exclude]
            extensions = ["tmp"]

            [filters.include]
            patterns = ["keep*", ".env"]
            "#,
        );
        assert!(compiled.should_include(Path::new("keep-me.tmp")));
        assert!(compiled.should_include(Path::new(".env")));
        assert!(!compiled.should_include(Path::new("scratch.tmp")));
        assert!(!compiled.should_include(Path::new(".cache")));
    }

    #[test]
    fn test_invalid_regex_returns_error() {
        let config = FilterConfig::from_toml("[filters.exclude]\nregex = [\"(unclosed\"]\n").unwrap();
        match config.compile() {
            Err(ConfigError::InvalidRegexPattern { pattern, .. }) => assert_eq!(pattern, "(unclosed"),
            other => panic!("expected regex error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_invalid_glob_returns_error() {
        let config = FilterConfig::from_toml("[filters.exclude]\npatterns = [\"[unclosed\"]\n").unwrap();
        assert!(matches!(
            config.compile().map(|_| ()),
            Err(ConfigError::InvalidGlobPattern(p)) if p == "[unclosed"
        ));
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        assert!(matches!(
            FilterConfig::from_toml("[filters\nenable_hidden_files = maybe"),
            Err(ConfigError::ConfigInvalid(_))
        ));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("filters.toml");
        fs::write(&path, "[filters.exclude]\nfilenames = [\"desktop.ini\"]\n").unwrap();

        let config = FilterConfig::load(Some(&path)).unwrap();
        assert_eq!(config.filters.exclude.filenames, vec!["desktop.ini".to_string()]);
        assert!(config.filters.enable_hidden_files);
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let missing = dir.path().join("nope.toml");
        assert_eq!(
            FilterConfig::load(Some(&missing)),
            Err(ConfigError::ConfigNotFound(missing.clone()))
        );
    }
}
