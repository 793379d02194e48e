//! Variables visible to a view.
//!
//! A [`Context`] is what an engine receives for one execution: the caller's
//! parameters merged over the renderer's globals. Every entry is a top-level
//! name; engines must make each one directly addressable from template code
//! (MiniJinja exposes them as template variables).
//!
//! Parameters are anything that serializes to a map, such as a
//! `#[derive(Serialize)]` struct, a `HashMap<String, T>` or a
//! `serde_json::json!({...})` object. Unit and `null` mean "no parameters".

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{kind_of, Error, Result};
use crate::globals::Globals;

/// Named variables for one view execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context {
    vars: Map<String, Value>,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the context for one execution. Parameters shadow globals with
    /// the same name.
    pub fn merged(globals: &Globals, params: Map<String, Value>) -> Self {
        let mut vars = globals.as_map().clone();
        for (name, value) in params {
            vars.insert(name, value);
        }
        Self { vars }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Variables in order: globals first, then parameters that are not
    /// globals.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.vars.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.vars
    }
}

impl From<Map<String, Value>> for Context {
    fn from(vars: Map<String, Value>) -> Self {
        Self { vars }
    }
}

/// Serializes view parameters into a map.
///
/// # Errors
///
/// Returns [`Error::InvalidParams`] if the value is not a map, unit or null.
pub fn params_to_map<P: Serialize + ?Sized>(params: &P) -> Result<Map<String, Value>> {
    match serde_json::to_value(params)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(Error::InvalidParams {
            found: kind_of(&other),
        }),
    }
}
