//! Lookup sources: the name → value capability consulted by the interpolator.
//!
//! A source answers `Ok(Some(value))` for a known name, `Ok(None)` for an
//! unknown one, and `Err(_)` only when the query itself failed.  The
//! interpolator never caches answers and never mutates the source.
//!
//! | Source              | Resolves                                          |
//! |---------------------|---------------------------------------------------|
//! | `HashMap`/`BTreeMap`| keys of the map                                   |
//! | [`FromFn`]          | whatever the wrapped closure returns              |
//! | [`Environment`]     | process environment variables                     |
//! | [`Properties`]      | an in-memory properties store                     |
//! | [`Combined`]        | `env.NAME` from the environment, `prop.NAME` and bare `NAME` from properties |
//!
//! [`Properties`]: crate::props::Properties

use std::borrow::{Borrow, Cow};
use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::hash::{BuildHasher, Hash};

use crate::error::LookupError;

/// A read-only mapping from variable names to values.
pub trait Lookup {
    /// Error raised when a query cannot be answered.  Infallible sources use
    /// [`Infallible`].
    type Error;

    /// Returns the value associated with `name`, or `None` if there is none.
    fn lookup(&self, name: &str) -> Result<Option<Cow<'_, str>>, Self::Error>;
}

impl<L: Lookup + ?Sized> Lookup for &L {
    type Error = L::Error;

    fn lookup(&self, name: &str) -> Result<Option<Cow<'_, str>>, Self::Error> {
        (**self).lookup(name)
    }
}

impl<K, V, S> Lookup for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    S: BuildHasher,
{
    type Error = Infallible;

    fn lookup(&self, name: &str) -> Result<Option<Cow<'_, str>>, Self::Error> {
        Ok(self.get(name).map(|v| Cow::Borrowed(v.as_ref())))
    }
}

impl<K, V> Lookup for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsRef<str>,
{
    type Error = Infallible;

    fn lookup(&self, name: &str) -> Result<Option<Cow<'_, str>>, Self::Error> {
        Ok(self.get(name).map(|v| Cow::Borrowed(v.as_ref())))
    }
}

// ── Closures ──────────────────────────────────────────────────────────────────

/// Lookup source backed by an infallible closure.  See [`from_fn`].
#[derive(Clone, Copy)]
pub struct FromFn<F>(F);

/// Wrap `f` as a lookup source.
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: Fn(&str) -> Option<String>,
{
    FromFn(f)
}

impl<F> Lookup for FromFn<F>
where
    F: Fn(&str) -> Option<String>,
{
    type Error = Infallible;

    fn lookup(&self, name: &str) -> Result<Option<Cow<'_, str>>, Self::Error> {
        Ok((self.0)(name).map(Cow::Owned))
    }
}

/// Lookup source backed by a fallible closure.  See [`try_from_fn`].
#[derive(Clone, Copy)]
pub struct TryFromFn<F>(F);

/// Wrap a fallible `f` as a lookup source; its errors abort interpolation.
pub fn try_from_fn<F, E>(f: F) -> TryFromFn<F>
where
    F: Fn(&str) -> Result<Option<String>, E>,
{
    TryFromFn(f)
}

impl<F, E> Lookup for TryFromFn<F>
where
    F: Fn(&str) -> Result<Option<String>, E>,
{
    type Error = E;

    fn lookup(&self, name: &str) -> Result<Option<Cow<'_, str>>, Self::Error> {
        Ok((self.0)(name)?.map(Cow::Owned))
    }
}

// ── Environment ───────────────────────────────────────────────────────────────

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct Environment;

impl Lookup for Environment {
    type Error = LookupError;

    fn lookup(&self, name: &str) -> Result<Option<Cow<'_, str>>, Self::Error> {
        Ok(env_var(name)?.map(Cow::Owned))
    }
}

fn env_var(name: &str) -> Result<Option<String>, LookupError> {
    // Names the platform cannot store are simply unset.
    if name.is_empty() || name.contains(['=', '\0']) {
        return Ok(None);
    }
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => {
            Err(LookupError::NotUnicode { name: name.to_owned() })
        }
    }
}

// ── Combined ──────────────────────────────────────────────────────────────────

const ENV_PREFIX: &str = "env.";
const PROP_PREFIX: &str = "prop.";

/// Routes names by prefix: `env.NAME` reads the environment variable `NAME`,
/// `prop.NAME` reads `NAME` from the wrapped properties source, and any other
/// name is read from the properties source unchanged.
///
/// Prefixes are matched ASCII case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Combined<P> {
    properties: P,
}

impl<P> Combined<P> {
    pub fn new(properties: P) -> Self {
        Self { properties }
    }

    pub fn properties(&self) -> &P {
        &self.properties
    }
}

impl<P> Lookup for Combined<P>
where
    P: Lookup,
    LookupError: From<P::Error>,
{
    type Error = LookupError;

    fn lookup(&self, name: &str) -> Result<Option<Cow<'_, str>>, Self::Error> {
        if let Some(key) = strip_prefix_ignore_case(name, ENV_PREFIX) {
            return Ok(env_var(key)?.map(Cow::Owned));
        }
        let key = strip_prefix_ignore_case(name, PROP_PREFIX).unwrap_or(name);
        Ok(self.properties.lookup(key)?)
    }
}

fn strip_prefix_ignore_case<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    let head = name.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &name[prefix.len()..])
}

// ── Tests ─────────────────────────────────────────────────────────────────────
