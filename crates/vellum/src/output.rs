//! Nestable output capture.
//!
//! Everything a view produces is written into the innermost open frame of an
//! [`OutputStack`]. Rendering a view opens one frame, block captures open
//! another on top of it, and layouts repeat the process once the child's
//! frame has been closed.
//!
//! Frames opened for a render are held by a [`Frame`] guard. Dropping the
//! guard discards the frame and everything opened above it, so an early
//! return or `?` always leaves the stack at the depth it had before the
//! frame was opened:
//!
//! ```rust
//! use vellum::output::OutputStack;
//!
//! let mut stack = OutputStack::new();
//! {
//!     let mut frame = stack.open();
//!     frame.push();
//!     frame.write("lost");
//!     assert_eq!(frame.depth(), 2);
//! }
//! assert_eq!(stack.depth(), 0);
//! ```

use std::ops::{Deref, DerefMut};

/// An ordered stack of text buffers.
#[derive(Debug, Default)]
pub struct OutputStack {
    frames: Vec<String>,
}

impl OutputStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Opens a frame and returns its level (the depth before opening).
    pub fn push(&mut self) -> usize {
        self.frames.push(String::new());
        self.frames.len() - 1
    }

    /// Closes the innermost frame, returning its text.
    pub fn pop(&mut self) -> Option<String> {
        self.frames.pop()
    }

    /// Appends text to the innermost frame.
    ///
    /// Returns `false` when no frame is open; the text is discarded.
    pub fn write(&mut self, text: &str) -> bool {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.push_str(text);
                true
            }
            None => false,
        }
    }

    /// Text buffered so far in the innermost frame.
    pub fn current(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }

    /// Discards frames until the stack is `depth` deep.
    pub fn unwind_to(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    /// Closes the frame at `level` and every frame above it, returning their
    /// text concatenated from the bottom up.
    pub fn collect_from(&mut self, level: usize) -> String {
        if level >= self.frames.len() {
            return String::new();
        }
        let mut text = std::mem::take(&mut self.frames[level]);
        for frame in self.frames.drain(level + 1..) {
            text.push_str(&frame);
        }
        self.frames.truncate(level);
        text
    }

    /// Opens a frame held by a guard.
    pub fn open(&mut self) -> Frame<'_> {
        let level = self.push();
        Frame { stack: self, level }
    }
}

/// A scoped output frame.
///
/// [`finish`](Frame::finish) closes the frame and yields its text. Dropping
/// the guard without finishing discards the frame's text.
#[derive(Debug)]
pub struct Frame<'a> {
    stack: &'a mut OutputStack,
    level: usize,
}

impl Frame<'_> {
    /// Depth of the stack before this frame was opened.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Closes the frame, returning everything written into it.
    pub fn finish(mut self) -> String {
        let level = self.level;
        self.stack.collect_from(level)
    }
}

impl Deref for Frame<'_> {
    type Target = OutputStack;

    fn deref(&self) -> &OutputStack {
        self.stack
    }
}

impl DerefMut for Frame<'_> {
    fn deref_mut(&mut self) -> &mut OutputStack {
        self.stack
    }
}

impl Drop for Frame<'_> {
    fn drop(&mut self) {
        self.stack.unwind_to(self.level);
    }
}
