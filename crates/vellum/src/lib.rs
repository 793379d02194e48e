//! # Vellum - File-Based Views with Layouts
//!
//! `vellum` renders views: template files addressed by dotted names such as
//! `user.profile`, executed with a context of variables, and optionally
//! wrapped in layouts that receive the view's output through named blocks.
//!
//! ## Core Concepts
//!
//! - [`Renderer`]: resolves views, captures their output and follows layouts
//! - [`ViewEngine`]: the strategy that executes one view file
//!   ([`MiniJinjaEngine`] by default, [`FnEngine`] for Rust closures)
//! - [`Scope`]: what a view uses while it runs (write output, pick a layout,
//!   define and print blocks)
//! - Globals: variables every view sees, added once per name
//! - [`esc`]: HTML escaping
//!
//! ## Quick Start
//!
//! With `views/home.html`:
//!
//! ```jinja
//! {{ layout("layouts.main") }}
//! {% set title %}Welcome, {{ name }}{% endset %}{{ block("title", title) }}
//! <p>Hello {{ name }} from {{ site }}</p>
//! ```
//!
//! and `views/layouts/main.html`:
//!
//! ```jinja
//! <title>{{ render_block("title", site) }}</title>
//! <main>{{ render_block("content") }}</main>
//! ```
//!
//! ```rust,ignore
//! use vellum::{Renderer, ViewConfig};
//! use serde_json::json;
//!
//! let mut renderer = Renderer::new(ViewConfig::new("views"))?;
//! renderer.add_global("site", &"Example")?;
//!
//! let html = renderer.render("home", &json!({"name": "Ada"}))?;
//! ```
//!
//! The layout sees the globals and the blocks, but not the parameters passed
//! to `home`.
//!
//! ## Custom Engines
//!
//! Anything implementing [`ViewEngine`] can execute views. Errors from the
//! engine reach the caller of [`Renderer::render`] unchanged:
//!
//! ```rust
//! use std::path::Path;
//! use vellum::{Context, FnEngine, Scope};
//!
//! let engine = FnEngine::new(|path: &Path, context: &Context, scope: &mut Scope<'_>| {
//!     if path.ends_with("page.html") {
//!         scope.layout("layout");
//!     }
//!     scope.write(&format!("{} vars", context.len()));
//!     Ok::<_, vellum::Error>(())
//! });
//! ```

pub mod block;
pub mod config;
pub mod context;
pub mod engine;
mod error;
pub mod escape;
pub mod globals;
pub mod jinja;
pub mod output;
mod renderer;
pub mod resolver;
pub mod scope;

pub use block::{BlockStore, Capture, CONTENT_BLOCK};
pub use config::{ViewConfig, DEFAULT_EXTENSION};
pub use context::Context;
pub use engine::{FnEngine, ViewEngine};
pub use error::{Error, Result};
pub use escape::{esc, esc_bytes};
pub use globals::Globals;
pub use jinja::MiniJinjaEngine;
pub use renderer::{Renderer, MAX_LAYOUT_DEPTH};
pub use scope::Scope;
