//! View engine abstraction.
//!
//! This module defines the [`ViewEngine`] trait, the strategy a
//! [`Renderer`](crate::Renderer) uses to execute a view file. The renderer
//! owns path resolution, output frames, blocks, layouts and globals; the
//! engine only turns one file plus a context into output written through the
//! [`Scope`].
//!
//! Two implementations ship with the crate:
//!
//! - [`MiniJinjaEngine`](crate::jinja::MiniJinjaEngine), the default, which
//!   renders view files as MiniJinja templates
//! - [`FnEngine`], which runs a closure, for views produced by Rust code
//!   and for tests

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use crate::context::Context;
use crate::error::Error;
use crate::scope::Scope;

/// Executes a view file.
pub trait ViewEngine {
    /// Error produced by the engine.
    ///
    /// [`Renderer::render`](crate::Renderer::render) returns errors of this
    /// type. Failures returned from [`execute`](Self::execute) are passed to
    /// the caller unchanged; the renderer's own failures are converted with
    /// `From`.
    type Error: From<Error>;

    /// Executes the view at `path`.
    ///
    /// Every entry in `context` must be addressable by its own name from the
    /// view's code. Output is written through `scope`.
    fn execute(
        &self,
        path: &Path,
        context: &Context,
        scope: &mut Scope<'_>,
    ) -> Result<(), Self::Error>;
}

/// A [`ViewEngine`] backed by a closure.
///
/// ```rust
/// use std::path::Path;
/// use vellum::{Context, FnEngine, Scope};
///
/// let engine = FnEngine::new(|path: &Path, context: &Context, scope: &mut Scope<'_>| {
///     scope.write(&format!("{} with {} vars", path.display(), context.len()));
///     Ok::<_, vellum::Error>(())
/// });
/// ```
pub struct FnEngine<F, E = Error> {
    f: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> FnEngine<F, E>
where
    F: Fn(&Path, &Context, &mut Scope<'_>) -> Result<(), E>,
    E: From<Error>,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _error: PhantomData,
        }
    }
}

impl<F, E> ViewEngine for FnEngine<F, E>
where
    F: Fn(&Path, &Context, &mut Scope<'_>) -> Result<(), E>,
    E: From<Error>,
{
    type Error = E;

    fn execute(&self, path: &Path, context: &Context, scope: &mut Scope<'_>) -> Result<(), E> {
        (self.f)(path, context, scope)
    }
}

impl<F, E> fmt::Debug for FnEngine<F, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnEngine").finish_non_exhaustive()
    }
}
