//! View name resolution.
//!
//! Views are addressed by dotted logical names. [`ViewResolver`] maps a name
//! onto a file below the configured view directory:
//!
//! | View name | Extension | Resolved path |
//! |-----------|-----------|---------------|
//! | `home` | `html` | `<root>/home.html` |
//! | `user.profile` | `html` | `<root>/user/profile.html` |
//! | `emails.welcome` | `""` | `<root>/emails/welcome` |
//!
//! Dots, forward slashes and backslashes all separate segments, and empty
//! segments are dropped. A view name therefore can never climb out of the
//! view directory or turn into an absolute path.

use std::path::{Path, PathBuf};

use crate::config::ViewConfig;
use crate::error::{Error, Result};

/// Resolves dotted view names to files under a root directory.
#[derive(Debug, Clone)]
pub struct ViewResolver {
    root: PathBuf,
    extension: String,
}

impl ViewResolver {
    /// Creates a resolver, checking that the view directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the directory is missing or is not a
    /// directory.
    pub fn new(config: &ViewConfig) -> Result<Self> {
        if !config.view_dir.is_dir() {
            return Err(Error::Config {
                path: config.view_dir.clone(),
            });
        }

        Ok(Self {
            root: config.view_dir.clone(),
            extension: config.extension.clone(),
        })
    }

    /// The view directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The extension appended to extensionless view paths.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Maps a view name to a path without touching the filesystem.
    pub fn path_for(&self, view: &str) -> PathBuf {
        let mut path = self.root.clone();
        let mut pushed = false;

        for segment in view
            .split(|c| matches!(c, '.' | '/' | '\\'))
            .filter(|s| !s.is_empty())
        {
            path.push(segment);
            pushed = true;
        }

        if pushed && path.extension().is_none() && !self.extension.is_empty() {
            path.set_extension(&self.extension);
        }

        path
    }

    /// Maps a view name to an existing file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ViewNotFound`] if the name is empty or the resolved
    /// path is not a regular file.
    pub fn resolve(&self, view: &str) -> Result<PathBuf> {
        let path = self.path_for(view);

        if path == self.root || !path.is_file() {
            return Err(Error::ViewNotFound {
                view: view.to_string(),
                path,
            });
        }

        Ok(path)
    }
}
