//! Properties store.
//!
//! A plain string-valued table used as the `prop.` side of
//! [`Combined`](crate::lookup::Combined) and as the backing store for `-p`/`-D`
//! on the command line.
//!
//! The text format is deliberately small:
//!
//! | Line                     | Action                          |
//! |--------------------------|---------------------------------|
//! | `key=value`              | set `key`                       |
//! | `key: value`             | same, alternate separator       |
//! | blank                    | ignored                         |
//! | starting with `#`, `!`, `;` | comment, ignored             |
//!
//! The first `=` or `:` on a line separates key from value; both sides are
//! trimmed.  Later definitions overwrite earlier ones.

use std::borrow::Cow;
use std::collections::HashMap;
use std::convert::Infallible;
use std::path::Path;

use crate::error::{Error, PropertyError};
use crate::lookup::Lookup;

/// String key/value store.
#[derive(Debug, Default, Clone)]
pub struct Properties {
    vars: HashMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) a property.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Get the value of a property.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Remove a property.  Returns `true` if it existed.
    pub fn unset(&mut self, name: &str) -> bool {
        self.vars.remove(name).is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Merge `other` into `self`; keys in `other` win.
    pub fn extend(&mut self, other: Properties) {
        self.vars.extend(other.vars);
    }

    /// Parse a single `key=value` definition.
    ///
    /// Returns the error message on a malformed definition.
    pub fn define(&mut self, definition: &str) -> Result<(), String> {
        let (key, value) = split_definition(definition)?;
        self.set(key, value);
        Ok(())
    }

    /// Parse a properties string.
    ///
    /// Malformed lines are skipped and reported; everything else is loaded.
    pub fn load_str(s: &str) -> (Self, Vec<PropertyError>) {
        let mut props = Properties::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(['#', '!', ';']) {
                continue;
            }
            if let Err(message) = props.define(line) {
                errors.push(PropertyError { line: i + 1, message });
            }
        }

        (props, errors)
    }

    /// Read and parse a properties file from disk.
    pub fn load_file(path: &Path) -> Result<(Self, Vec<PropertyError>), Error> {
        let s = std::fs::read_to_string(path)
            .map_err(|source| Error::Io { path: path.to_owned(), source })?;
        Ok(Self::load_str(&s))
    }
}

fn split_definition(definition: &str) -> Result<(&str, &str), String> {
    let Some(at) = definition.find(['=', ':']) else {
        return Err(format!("expected `key=value`, got `{definition}`"));
    };
    let key = definition[..at].trim();
    if key.is_empty() {
        return Err("empty property name".to_owned());
    }
    Ok((key, definition[at + 1..].trim()))
}

impl Lookup for Properties {
    type Error = Infallible;

    fn lookup(&self, name: &str) -> Result<Option<Cow<'_, str>>, Self::Error> {
        Ok(self.get(name).map(Cow::Borrowed))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Properties::new();
        for (k, v) in iter {
            props.set(k, v);
        }
        props
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
