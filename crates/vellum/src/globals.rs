//! Renderer-wide variables.
//!
//! Globals are merged into the context of every view a renderer executes,
//! including layouts. Each name can be added once; there is no way to
//! replace or remove a global afterwards.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{kind_of, Error, Result};

/// Write-once registry of global variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Globals {
    vars: Map<String, Value>,
}

impl Globals {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a global.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateGlobal`] if `name` is already registered and
    /// [`Error::Serialization`] if `value` cannot be serialized.
    pub fn add<T: Serialize + ?Sized>(&mut self, name: impl Into<String>, value: &T) -> Result<()> {
        let name = name.into();
        if self.vars.contains_key(&name) {
            return Err(Error::DuplicateGlobal { name });
        }
        let value = serde_json::to_value(value)?;
        tracing::trace!(global = %name, "adding global");
        self.vars.insert(name, value);
        Ok(())
    }

    /// Adds every entry of a map, in the map's iteration order.
    ///
    /// Stops at the first failure. Entries added before it stay registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGlobalKey`] if `values` does not serialize to a
    /// map keyed by strings (nothing is added in that case), or
    /// [`Error::DuplicateGlobal`] for the first name that is already
    /// registered.
    pub fn add_many<T: Serialize + ?Sized>(&mut self, values: &T) -> Result<()> {
        check_names(values)?;

        let map = match serde_json::to_value(values)? {
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidGlobalKey {
                    found: kind_of(&other),
                })
            }
        };

        for (name, value) in map {
            self.add(name, &value)?;
        }
        Ok(())
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

    /// Global names in the order they were added.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.vars
    }
}

/// Rejects maps with keys that are not strings.
///
/// `serde_json` turns integer keys into strings, so the keys are checked on a
/// YAML value, which keeps them as they were serialized.
fn check_names<T: Serialize + ?Sized>(values: &T) -> Result<()> {
    let value = serde_yaml::to_value(values)
        .map_err(|e| Error::Serialization(serde::ser::Error::custom(e)))?;

    let serde_yaml::Value::Mapping(mapping) = value else {
        return Ok(());
    };

    match mapping.iter().find(|(key, _)| !key.is_string()) {
        Some((key, _)) => Err(Error::InvalidGlobalKey {
            found: key_kind(key),
        }),
        None => Ok(()),
    }
}

fn key_kind(key: &serde_yaml::Value) -> &'static str {
    match key {
        serde_yaml::Value::Null => "a map with a null key",
        serde_yaml::Value::Bool(_) => "a map with a boolean key",
        serde_yaml::Value::Number(_) => "a map with a number key",
        serde_yaml::Value::Sequence(_) => "a map with a sequence key",
        serde_yaml::Value::Mapping(_) => "a map with a map key",
        serde_yaml::Value::String(_) => "a map with a string key",
        serde_yaml::Value::Tagged(_) => "a map with a tagged key",
    }
}
