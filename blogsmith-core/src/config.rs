//! Configuration parsing and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// What to do when a single document fails to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log the failure, leave the document out and keep going
    #[default]
    Skip,
    /// Stop the build at the first bad document
    Abort,
}

/// Main configuration struct matching the blogsmith.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    #[serde(default)]
    pub on_error: ErrorPolicy,

    #[serde(default = "default_true")]
    pub clean_output: bool,

    #[serde(default = "default_true")]
    pub enable_rss: bool,

    #[serde(default = "default_true")]
    pub enable_sitemap: bool,

    #[serde(default = "default_highlight_theme")]
    pub highlight_theme: String,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_base_url() -> String {
    String::from("/")
}

fn default_true() -> bool {
    true
}

fn default_highlight_theme() -> String {
    String::from("InspiredGitHub")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_title")]
    pub title: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub url: String,
}

fn default_site_title() -> String {
    String::from("Blog")
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            author: String::new(),
            description: String::new(),
            url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_input")]
    pub input: PathBuf,

    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_input() -> PathBuf {
    PathBuf::from("_posts")
}

fn default_output() -> PathBuf {
    PathBuf::from("_site")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            paths: PathsConfig::default(),
            base_url: default_base_url(),
            ignore_patterns: Vec::new(),
            on_error: ErrorPolicy::default(),
            clean_output: true,
            enable_rss: true,
            enable_sitemap: true,
            highlight_theme: default_highlight_theme(),
            config_path: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_yaml(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Parse configuration from YAML text. Relative paths resolve against the
    /// working directory.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Configuration with defaults and explicit input/output directories
    pub fn from_dirs(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            paths: PathsConfig {
                input: input.into(),
                output: output.into(),
            },
            ..Self::default()
        }
    }

    /// Override the input directory (CLI flags win over the config file)
    pub fn set_input_dir(&mut self, dir: impl Into<PathBuf>) {
        self.paths.input = dir.into();
    }

    /// Override the output directory
    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) {
        self.paths.output = dir.into();
    }

    /// Get the input directory, resolved relative to config file
    pub fn input_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.input)
    }

    /// Get the output directory, resolved relative to config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match self.config_path.as_ref().and_then(|p| p.parent()) {
            Some(parent) => parent.join(path),
            None => path.to_path_buf(),
        }
    }

    /// Normalized base URL with leading and trailing slash ("/foo/" or "/")
    pub fn normalized_base_url(&self) -> String {
        normalize_base_url(&self.base_url)
    }
}

/// Ensure base URLs have a leading and trailing slash
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "/".to_string();
    }

    let mut s = trimmed.to_string();
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    if !s.ends_with('/') {
        s.push('/');
    }

    // Collapse duplicate slashes
    while s.contains("//") {
        s = s.replace("//", "/");
    }

    s
}
