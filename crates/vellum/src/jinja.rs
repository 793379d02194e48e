//! MiniJinja-backed view engine.
//!
//! [`MiniJinjaEngine`] reads a view file and renders it with MiniJinja. Every
//! context entry becomes a top-level template variable, and the renderer's
//! view operations are available as functions:
//!
//! | Function | Effect |
//! |----------|--------|
//! | `layout(name)` | wrap this view in the layout view `name` |
//! | `block(name, text)` | define a block (first definition wins) |
//! | `render_block(name, default="")` | print a block, e.g. `content` in a layout |
//! | `esc(text)` | HTML-escape text (also available as the `esc` filter) |
//!
//! MiniJinja renders a template to a string in one go, so blocks are
//! captured with `set` blocks rather than `begin_block`/`end_block`:
//!
//! ```jinja
//! {{ layout("layouts.main") }}
//! {% set sidebar %}<nav>{{ user.name | esc }}</nav>{% endset %}
//! {{ block("sidebar", sidebar) }}
//! <p>Hello {{ user.name | esc }}</p>
//! ```
//!
//! ```jinja
//! <html><aside>{{ render_block("sidebar") }}</aside>{{ render_block("content") }}</html>
//! ```
//!
//! Views named `*.html`, `*.htm` or `*.xml` are auto-escaped by MiniJinja.
//! In those views `block()` and the `render_block()` default escape values
//! that are not marked safe (`set` blocks and the `esc` filter produce safe
//! values). Stored block text is printed verbatim, so a layout does not
//! escape its child's markup a second time. Blocks defined from Rust through
//! [`Renderer::block`](crate::Renderer::block) are trusted as markup.
//!
//! Incremental capture with `begin_block`/`end_block` needs a streaming
//! engine. Views that want it can be written as Rust closures with
//! [`FnEngine`](crate::FnEngine), which receive the full
//! [`Scope`](crate::Scope):
//!
//! ```rust
//! use std::path::Path;
//! use vellum::{Context, FnEngine, Scope};
//!
//! let engine = FnEngine::new(|_: &Path, _: &Context, scope: &mut Scope<'_>| {
//!     scope.layout("layouts.main");
//!     scope.begin_block("sidebar")?;
//!     scope.write("<nav>home</nav>");
//!     scope.end_block()?;
//!     scope.write("<p>body</p>");
//!     Ok::<_, vellum::Error>(())
//! });
//! ```

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use minijinja::{AutoEscape, Environment, ErrorKind, State, Value};

use crate::block::BlockStore;
use crate::context::Context;
use crate::engine::ViewEngine;
use crate::error::Error;
use crate::escape;
use crate::scope::Scope;

/// The default view engine.
///
/// # Example
///
/// ```rust,ignore
/// use vellum::{MiniJinjaEngine, Renderer, ViewConfig};
///
/// let mut engine = MiniJinjaEngine::new();
/// engine.environment_mut().add_filter("shout", |s: String| s.to_uppercase());
///
/// let mut renderer = Renderer::with_engine(ViewConfig::new("./views"), engine)?;
/// let html = renderer.render("home", &serde_json::json!({"name": "Ada"}))?;
/// ```
#[derive(Debug, Clone)]
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Creates an engine with the view filters registered.
    pub fn new() -> Self {
        let mut env = Environment::new();
        register_filters(&mut env);
        Self { env }
    }

    /// Returns the base environment each view is rendered with.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns a mutable reference to the base environment, for registering
    /// custom filters, functions and tests.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Renderer state shared with template functions while one view renders.
#[derive(Debug, Default)]
struct Bridge {
    blocks: BlockStore,
    layout: Option<String>,
    /// First renderer error raised from template code. Reported instead of
    /// the MiniJinja error that carried it out of the template.
    fault: Option<Error>,
}

type SharedBridge = Arc<Mutex<Bridge>>;

fn lock(bridge: &SharedBridge) -> MutexGuard<'_, Bridge> {
    bridge.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ViewEngine for MiniJinjaEngine {
    type Error = Error;

    fn execute(&self, path: &Path, context: &Context, scope: &mut Scope<'_>) -> Result<(), Error> {
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;

        let bridge = Arc::new(Mutex::new(Bridge {
            blocks: std::mem::take(scope.blocks_mut()),
            layout: scope.current_layout().map(str::to_string),
            fault: None,
        }));

        let rendered = {
            let mut env = self.env.clone();
            register_view_functions(&mut env, &bridge);
            let name = path.to_string_lossy();
            env.render_named_str(&name, &source, Value::from_serialize(context))
        };

        let Bridge {
            blocks,
            layout,
            fault,
        } = std::mem::take(&mut *lock(&bridge));

        *scope.blocks_mut() = blocks;
        if let Some(layout) = layout {
            scope.layout(layout);
        }
        if let Some(fault) = fault {
            return Err(fault);
        }

        scope.write(&rendered?);
        Ok(())
    }
}

/// Registers the view filters with a MiniJinja environment.
///
/// This is called automatically by [`MiniJinjaEngine::new`].
pub fn register_filters(env: &mut Environment<'static>) {
    env.add_filter("esc", |value: Value| -> Value {
        Value::from_safe_string(escape::esc(&value.to_string()))
    });
}

fn register_view_functions(env: &mut Environment<'static>, bridge: &SharedBridge) {
    let shared = Arc::clone(bridge);
    env.add_function("layout", move |name: String| -> String {
        lock(&shared).layout = Some(name);
        String::new()
    });

    let shared = Arc::clone(bridge);
    env.add_function(
        "block",
        move |state: &State, name: String, content: Value| -> Result<String, minijinja::Error> {
            let text = block_text(state, &content);
            let mut bridge = lock(&shared);
            match bridge.blocks.define(&name, text) {
                Ok(_) => Ok(String::new()),
                Err(err) => {
                    let message = err.to_string();
                    bridge.fault.get_or_insert(err);
                    Err(minijinja::Error::new(ErrorKind::InvalidOperation, message))
                }
            }
        },
    );

    let shared = Arc::clone(bridge);
    env.add_function(
        "render_block",
        move |state: &State, name: String, default: Option<Value>| -> Value {
            let bridge = lock(&shared);
            let text = match bridge.blocks.get(&name) {
                Some(text) => text.to_string(),
                None => default.map(|d| block_text(state, &d)).unwrap_or_default(),
            };
            Value::from_safe_string(text)
        },
    );

    env.add_function("esc", |value: Value| -> Value {
        Value::from_safe_string(escape::esc(&value.to_string()))
    });
}

/// Text stored for a block. Values the template has not marked safe are
/// escaped when the view is auto-escaped, since the block is printed as-is.
fn block_text(state: &State, value: &Value) -> String {
    let text = value.to_string();
    if value.is_safe() || matches!(state.auto_escape(), AutoEscape::None) {
        text
    } else {
        escape::esc(&text)
    }
}
