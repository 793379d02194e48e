//! Renderer configuration.
//!
//! A [`ViewConfig`] names the directory views are loaded from and the file
//! extension appended to view names that do not carry one. It can be built in
//! code or read from YAML:
//!
//! ```yaml
//! view_dir: ./views
//! extension: html
//! ```
//!
//! The directory is only validated when a [`Renderer`](crate::Renderer) is
//! constructed from the configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Extension used when none is configured.
pub const DEFAULT_EXTENSION: &str = "html";

/// Where views live and how their file names are completed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewConfig {
    /// Root directory that dotted view names are resolved against.
    pub view_dir: PathBuf,

    /// Extension appended to extensionless view paths, without the dot.
    /// An empty string disables appending.
    #[serde(default = "default_extension", deserialize_with = "deserialize_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn deserialize_extension<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_extension(&raw))
}

/// Strips leading dots, so `"."` becomes `""` and `".html"` becomes `"html"`.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_string()
}

impl ViewConfig {
    /// Creates a configuration with the default extension.
    pub fn new(view_dir: impl Into<PathBuf>) -> Self {
        Self {
            view_dir: view_dir.into(),
            extension: default_extension(),
        }
    }

    /// Sets the extension appended to view names.
    pub fn with_extension(mut self, extension: impl AsRef<str>) -> Self {
        self.extension = normalize_extension(extension.as_ref());
        self
    }

    /// Parses a configuration from YAML text.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Reads a configuration from a YAML file.
    ///
    /// A relative `view_dir` is taken relative to the file's directory.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config = Self::from_yaml_str(&source)?;

        if config.view_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.view_dir = parent.join(&config.view_dir);
            }
        }

        Ok(config)
    }
}
