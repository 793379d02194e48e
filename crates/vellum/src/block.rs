//! Named blocks and the capture state machine.
//!
//! A block is a named fragment of text that a view defines and a layout
//! prints. Blocks are write-once: the first definition of a name wins and
//! later definitions are ignored, which lets a child view override what its
//! layout would otherwise define.
//!
//! The name [`CONTENT_BLOCK`] is reserved. The renderer stores a child view's
//! output under it before rendering the child's layout.
//!
//! # Capture
//!
//! Besides [`BlockStore::define`], a block can be captured from output:
//!
//! ```text
//! Idle --begin("sidebar")--> Capturing("sidebar") --end()--> Idle
//! ```
//!
//! Only one capture can be open at a time; [`Capture`] tracks it along with
//! the output level its buffer was opened at.

use crate::error::{Error, Result};

/// The block name a layout reads its child's output from.
pub const CONTENT_BLOCK: &str = "content";

/// Insertion-ordered, write-once block storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockStore {
    entries: Vec<(String, String)>,
}

impl BlockStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a block.
    ///
    /// Returns `Ok(true)` if the block was stored. An empty name or a name
    /// that is already defined is ignored and returns `Ok(false)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedBlockName`] for [`CONTENT_BLOCK`].
    pub fn define(&mut self, name: &str, content: impl Into<String>) -> Result<bool> {
        if name == CONTENT_BLOCK {
            return Err(Error::ReservedBlockName);
        }

        if name.is_empty() || self.contains(name) {
            tracing::trace!(block = name, "block already defined, keeping first definition");
            return Ok(false);
        }

        self.entries.push((name.to_string(), content.into()));
        Ok(true)
    }

    /// Stores a child view's output under [`CONTENT_BLOCK`], replacing any
    /// previous value.
    pub(crate) fn set_content(&mut self, content: String) {
        match self.entries.iter_mut().find(|(name, _)| name == CONTENT_BLOCK) {
            Some((_, existing)) => *existing = content,
            None => self.entries.push((CONTENT_BLOCK.to_string(), content)),
        }
    }

    /// Text of a block, if defined.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, content)| content.as_str())
    }

    /// Text of a block, or `default` if it is not defined.
    pub fn render<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Block names in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// State of an in-progress block capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Capture {
    #[default]
    Idle,
    /// Capturing output into `name`. The capture buffer is the output frame
    /// at `level`.
    Capturing { name: String, level: usize },
}

impl Capture {
    /// Starts capturing into `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NestedBlock`] if a capture is already open; the open
    /// capture is left untouched.
    pub fn begin(&mut self, name: &str, level: usize) -> Result<()> {
        if let Capture::Capturing { name: open, .. } = self {
            return Err(Error::NestedBlock {
                open: open.clone(),
                requested: name.to_string(),
            });
        }

        *self = Capture::Capturing {
            name: name.to_string(),
            level,
        };
        Ok(())
    }

    /// Finishes the open capture, returning its name and buffer level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BlockNotOpen`] if no capture is open.
    pub fn end(&mut self) -> Result<(String, usize)> {
        match std::mem::take(self) {
            Capture::Capturing { name, level } => Ok((name, level)),
            Capture::Idle => Err(Error::BlockNotOpen),
        }
    }

    /// Name of the block being captured.
    pub fn name(&self) -> Option<&str> {
        match self {
            Capture::Capturing { name, .. } => Some(name),
            Capture::Idle => None,
        }
    }

    /// Output level of the capture buffer.
    pub fn level(&self) -> Option<usize> {
        match self {
            Capture::Capturing { level, .. } => Some(*level),
            Capture::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Capture::Idle)
    }
}
