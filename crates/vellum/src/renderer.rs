//! The view renderer.
//!
//! [`Renderer`] ties the pieces together: it resolves a view name to a file,
//! opens an output frame, lets its [`ViewEngine`] execute the file with the
//! caller's parameters merged over the globals, and closes the frame to get
//! the view's output.
//!
//! # Layouts
//!
//! A view may pick a layout while it executes. Once the view finishes, its
//! output is stored in the reserved `content` block and the layout is
//! rendered with the globals only (the child's parameters are not passed
//! on). Layouts may pick layouts of their own; the chain ends at the first
//! view that picks none.
//!
//! ```text
//! render("user.profile", params)
//!   user/profile.html  -- layout("layouts.app"), block("title", ...)
//!   layouts/app.html   -- layout("layouts.base"), render_block("content")
//!   layouts/base.html  -- render_block("title"), render_block("content")
//! ```
//!
//! # Failure
//!
//! If the engine fails, every output frame opened since the call started is
//! discarded and the engine's error is returned unchanged. Frames opened by
//! the caller are left alone.

use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::block::{BlockStore, Capture};
use crate::config::ViewConfig;
use crate::context::{params_to_map, Context};
use crate::engine::ViewEngine;
use crate::error::{Error, Result};
use crate::escape;
use crate::globals::Globals;
use crate::jinja::MiniJinjaEngine;
use crate::output::OutputStack;
use crate::resolver::ViewResolver;
use crate::scope::Scope;

/// Maximum number of layouts a single render may chain through.
pub const MAX_LAYOUT_DEPTH: usize = 64;

#[derive(Debug, Default)]
struct ViewState {
    output: OutputStack,
    blocks: BlockStore,
    capture: Capture,
    layout: Option<String>,
}

/// Renders views from a directory, with layouts, blocks and globals.
///
/// A renderer is stateful: blocks defined while rendering stay defined for
/// later renders (see [`clear_blocks`](Self::clear_blocks)), and every call
/// needs `&mut self`. Share one across threads behind a lock.
///
/// # Example
///
/// ```rust,ignore
/// use vellum::{Renderer, ViewConfig};
/// use serde_json::json;
///
/// let mut renderer = Renderer::new(ViewConfig::new("./views"))?;
/// renderer.add_global("site", &"Example")?;
///
/// // views/user/profile.html, wrapped in whatever layout it picks
/// let html = renderer.render("user.profile", &json!({"name": "Ada"}))?;
/// ```
#[derive(Debug)]
pub struct Renderer<E = MiniJinjaEngine> {
    resolver: ViewResolver,
    globals: Globals,
    state: ViewState,
    engine: E,
}

impl Renderer<MiniJinjaEngine> {
    /// Creates a renderer using the MiniJinja engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the view directory does not exist.
    pub fn new(config: ViewConfig) -> Result<Self> {
        Self::with_engine(config, MiniJinjaEngine::new())
    }
}

impl<E: ViewEngine> Renderer<E> {
    /// Creates a renderer with a custom engine.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the view directory does not exist.
    pub fn with_engine(config: ViewConfig, engine: E) -> Result<Self> {
        let resolver = ViewResolver::new(&config)?;
        tracing::debug!(
            view_dir = %resolver.root().display(),
            extension = resolver.extension(),
            "renderer ready"
        );

        Ok(Self {
            resolver,
            globals: Globals::new(),
            state: ViewState::default(),
            engine,
        })
    }

    /// The engine views are executed with.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the engine, e.g. to register MiniJinja filters.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// The resolver mapping view names to files.
    pub fn resolver(&self) -> &ViewResolver {
        &self.resolver
    }

    /// Resolves a view name to its file. See [`ViewResolver::resolve`].
    pub fn resolve(&self, view: &str) -> Result<PathBuf> {
        self.resolver.resolve(view)
    }

    // =========================================================================
    // Globals
    // =========================================================================

    /// Adds a variable visible to every view. See [`Globals::add`].
    pub fn add_global<T: Serialize + ?Sized>(
        &mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<()> {
        self.globals.add(name, value)
    }

    /// Adds every entry of a map as a global. See [`Globals::add_many`].
    pub fn add_globals<T: Serialize + ?Sized>(&mut self, values: &T) -> Result<()> {
        self.globals.add_many(values)
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    /// Defines a block. The first definition of a name wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReservedBlockName`] for `content`.
    pub fn block(&mut self, name: &str, content: impl Into<String>) -> Result<()> {
        self.scope().block(name, content)
    }

    /// Starts capturing output into a block. See [`Scope::begin_block`].
    pub fn begin_block(&mut self, name: &str) -> Result<()> {
        self.scope().begin_block(name)
    }

    /// Finishes the open capture. See [`Scope::end_block`].
    pub fn end_block(&mut self) -> Result<()> {
        self.scope().end_block()
    }

    /// Text of a block, or `default` if it is not defined.
    pub fn render_block<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.state.blocks.render(name, default)
    }

    pub fn blocks(&self) -> &BlockStore {
        &self.state.blocks
    }

    /// Forgets every block, including `content`.
    pub fn clear_blocks(&mut self) {
        self.state.blocks.clear();
    }

    pub fn capture(&self) -> &Capture {
        &self.state.capture
    }

    /// A [`Scope`] over the renderer's state outside of any render.
    ///
    /// Text written through it lands in the innermost open frame, or is
    /// discarded when none is open.
    pub fn scope(&mut self) -> Scope<'_> {
        let ViewState {
            output,
            blocks,
            capture,
            layout,
        } = &mut self.state;
        Scope::new(output, blocks, capture, layout, 0)
    }

    /// Number of open output frames.
    pub fn buffer_depth(&self) -> usize {
        self.state.output.depth()
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Renders a view and any layouts it chains to.
    ///
    /// `params` must serialize to a map (or to unit/null for none).
    ///
    /// # Errors
    ///
    /// - [`Error::ViewNotFound`] if the view or one of its layouts is missing
    /// - [`Error::InvalidParams`] if `params` is not a map
    /// - [`Error::UnclosedBlock`] if a view ends with a capture still open
    /// - [`Error::LayoutDepth`] if layouts chain more than
    ///   [`MAX_LAYOUT_DEPTH`] times
    /// - whatever the engine returns, unchanged
    pub fn render<P: Serialize + ?Sized>(
        &mut self,
        view: &str,
        params: &P,
    ) -> Result<String, E::Error> {
        let params = params_to_map(params)?;
        let mut content = self.execute(view, params)?;

        let mut hops = 0;
        while let Some(layout) = self.state.layout.take() {
            hops += 1;
            if hops > MAX_LAYOUT_DEPTH {
                return Err(Error::LayoutDepth {
                    view: layout,
                    limit: MAX_LAYOUT_DEPTH,
                }
                .into());
            }

            tracing::debug!(layout = %layout, bytes = content.len(), "wrapping in layout");
            self.state.blocks.set_content(content);
            content = self.execute(&layout, Map::new())?;
        }

        Ok(content)
    }

    /// Renders a view to stdout.
    pub fn display<P: Serialize + ?Sized>(&mut self, view: &str, params: &P) -> Result<(), E::Error> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.display_to(&mut handle, view, params)
    }

    /// Renders a view into `writer`.
    pub fn display_to<W: Write + ?Sized, P: Serialize + ?Sized>(
        &mut self,
        writer: &mut W,
        view: &str,
        params: &P,
    ) -> Result<(), E::Error> {
        let content = self.render(view, params)?;
        writer
            .write_all(content.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(Error::Output)?;
        Ok(())
    }

    /// Escapes text for HTML. See [`esc`](crate::esc).
    pub fn esc(&self, text: &str) -> String {
        escape::esc(text)
    }

    /// Executes one view inside its own output frame.
    fn execute(&mut self, view: &str, params: Map<String, Value>) -> Result<String, E::Error> {
        let path = self.resolver.resolve(view)?;
        let context = Context::merged(&self.globals, params);
        tracing::debug!(view, path = %path.display(), vars = context.len(), "rendering view");

        let ViewState {
            output,
            blocks,
            capture,
            layout,
        } = &mut self.state;
        *layout = None;

        let mut frame = output.open();
        let level = frame.level();
        let result = {
            let mut scope = Scope::new(&mut frame, blocks, capture, layout, level);
            self.engine.execute(&path, &context, &mut scope)
        };
        let opened_here = capture.level().is_some_and(|at| at > level);

        if let Err(err) = result {
            if opened_here {
                *capture = Capture::Idle;
            }
            *layout = None;
            drop(frame);
            tracing::debug!(view, "view failed, output discarded");
            return Err(err);
        }

        if opened_here {
            if let Ok((name, _)) = capture.end() {
                *layout = None;
                drop(frame);
                return Err(Error::UnclosedBlock { name }.into());
            }
        }

        Ok(frame.finish())
    }
}
