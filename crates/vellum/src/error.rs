//! Error types for view rendering.
//!
//! This module provides [`Error`], the error type for every operation the
//! renderer performs itself. Engines choose their own error type (see
//! [`ViewEngine::Error`](crate::engine::ViewEngine::Error)); it only has to
//! be constructible from [`Error`] so renderer failures can flow through it.

use std::io;
use std::path::PathBuf;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error type for renderer operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured view directory is missing or is not a directory.
    #[error("the view directory \"{}\" does not exist or is not a directory", .path.display())]
    Config { path: PathBuf },

    /// A configuration file could not be parsed.
    #[error("invalid view configuration: {0}")]
    ConfigFile(#[from] serde_yaml::Error),

    /// A global with this name was already registered.
    #[error("unable to add \"{name}\": this global variable has already been added")]
    DuplicateGlobal { name: String },

    /// Bulk globals did not serialize to a map keyed by strings.
    #[error("global names must be strings: expected a map of globals, got {found}")]
    InvalidGlobalKey { found: &'static str },

    /// Render parameters did not serialize to a map keyed by strings.
    #[error("view parameters must be a map, got {found}")]
    InvalidParams { found: &'static str },

    /// `begin_block` was called while another capture was open.
    #[error("cannot begin block \"{requested}\" inside block \"{open}\": blocks do not nest")]
    NestedBlock { open: String, requested: String },

    /// `end_block` was called with no capture open.
    #[error("no block is open: begin a block before ending it")]
    BlockNotOpen,

    /// The `content` block name is reserved for layout chaining.
    #[error("the block name \"content\" is reserved")]
    ReservedBlockName,

    /// A view finished executing with a block capture still open.
    #[error("view finished with block \"{name}\" still open")]
    UnclosedBlock { name: String },

    /// The resolved view path does not exist or is not a regular file.
    #[error("view \"{view}\" not found: \"{}\" does not exist or is not a file", .path.display())]
    ViewNotFound { view: String, path: PathBuf },

    /// A layout chain did not terminate.
    #[error("layout chain exceeded {limit} levels at view \"{view}\"")]
    LayoutDepth { view: String, limit: usize },

    /// The MiniJinja engine failed to compile or render a template.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Parameters or globals could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading a view or configuration file failed.
    #[error("I/O error on \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing rendered output failed.
    #[error("failed to write rendered output: {0}")]
    Output(#[source] io::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Names the JSON kind of a value for error messages.
pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a sequence",
        serde_json::Value::Object(_) => "a map",
    }
}
