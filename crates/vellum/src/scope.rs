//! The handle a view uses while it executes.
//!
//! An engine receives a [`Scope`] alongside the view's path and context.
//! Everything a view can do to the renderer goes through it:
//!
//! - [`write`](Scope::write) text (or use `write!`, `Scope` implements
//!   [`std::fmt::Write`])
//! - choose a [`layout`](Scope::layout)
//! - define blocks with [`block`](Scope::block) or capture them with
//!   [`begin_block`](Scope::begin_block) / [`end_block`](Scope::end_block)
//! - print blocks with [`render_block`](Scope::render_block)
//!
//! ```rust
//! use std::fmt::Write;
//! use vellum::Scope;
//!
//! fn sidebar(scope: &mut Scope<'_>) -> vellum::Result<()> {
//!     scope.layout("layouts.main");
//!     let label = scope.esc("Home & Away");
//!     scope.begin_block("sidebar")?;
//!     let _ = write!(scope, "<nav>{}</nav>", label);
//!     scope.end_block()?;
//!     scope.write("<p>body</p>");
//!     Ok(())
//! }
//! ```

use std::fmt;

use crate::block::{BlockStore, Capture};
use crate::error::{Error, Result};
use crate::escape;
use crate::output::OutputStack;

/// Mutable access to renderer state for the duration of one execution.
pub struct Scope<'a> {
    output: &'a mut OutputStack,
    blocks: &'a mut BlockStore,
    capture: &'a mut Capture,
    layout: &'a mut Option<String>,
    floor: usize,
}

impl<'a> Scope<'a> {
    /// `floor` is the lowest output level this scope may close; captures
    /// opened below it belong to an outer caller.
    pub(crate) fn new(
        output: &'a mut OutputStack,
        blocks: &'a mut BlockStore,
        capture: &'a mut Capture,
        layout: &'a mut Option<String>,
        floor: usize,
    ) -> Self {
        Self {
            output,
            blocks,
            capture,
            layout,
            floor,
        }
    }

    /// Appends text to the current output frame.
    pub fn write(&mut self, text: &str) {
        self.output.write(text);
    }

    /// Wraps the current view in `view` once it finishes.
    ///
    /// Calling this again replaces the earlier choice.
    pub fn layout(&mut self, view: impl Into<String>) {
        *self.layout = Some(view.into());
    }

    /// The layout chosen so far by the executing view.
    pub fn current_layout(&self) -> Option<&str> {
        self.layout.as_deref()
    }

    /// Defines a block. The first definition of a name wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedBlockName`] for `content`.
    pub fn block(&mut self, name: &str, content: impl Into<String>) -> Result<()> {
        self.blocks.define(name, content)?;
        Ok(())
    }

    /// Starts capturing output into the block `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NestedBlock`] if a capture is already open.
    pub fn begin_block(&mut self, name: &str) -> Result<()> {
        self.capture.begin(name, self.output.depth())?;
        self.output.push();
        Ok(())
    }

    /// Finishes the open capture and defines its block from the captured
    /// output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BlockNotOpen`] if no capture is open (or the open one
    /// was started outside this scope), and [`Error::ReservedBlockName`] if
    /// the capture was named `content`. The capture is closed either way in
    /// the latter case.
    pub fn end_block(&mut self) -> Result<()> {
        match self.capture.level() {
            Some(level) if level >= self.floor => {}
            _ => return Err(Error::BlockNotOpen),
        }

        let (name, level) = self.capture.end()?;
        let text = self.output.collect_from(level);
        tracing::trace!(block = %name, bytes = text.len(), "captured block");
        self.blocks.define(&name, text)?;
        Ok(())
    }

    /// Text of a block, or `default` if it is not defined.
    pub fn render_block<'s>(&'s self, name: &str, default: &'s str) -> &'s str {
        self.blocks.render(name, default)
    }

    /// Escapes text for HTML. See [`esc`](crate::esc).
    pub fn esc(&self, text: &str) -> String {
        escape::esc(text)
    }

    pub fn capture(&self) -> &Capture {
        self.capture
    }

    pub fn blocks(&self) -> &BlockStore {
        self.blocks
    }

    /// Direct access to the block store, for engines that hand blocks to
    /// template code running behind their own synchronization.
    pub fn blocks_mut(&mut self) -> &mut BlockStore {
        self.blocks
    }

    /// Current output nesting depth.
    pub fn depth(&self) -> usize {
        self.output.depth()
    }
}

impl fmt::Write for Scope<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s);
        Ok(())
    }
}
