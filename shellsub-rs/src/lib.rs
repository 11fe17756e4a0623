//! Shell-style variable interpolation.
//!
//! Replaces `${NAME}`, `${NAME:default}` and `%NAME%` expressions in a
//! template with values from a [`Lookup`] source, in a single left-to-right
//! pass.  Anything that does not resolve is left exactly as written.
//!
//! # Quick start
//!
//! ```rust
//! use std::collections::HashMap;
//! use shellsub::{Config, Interpolator};
//!
//! let vars = HashMap::from([("ONE", "1"), ("TWO", "2")]);
//! let interp = Interpolator::new();
//! assert_eq!(interp.interpolate("%ONE%%TWO%%% ${THREE:3}", &vars), "12% 3");
//!
//! let no_dos = Interpolator::with_config(Config::default().with_dos(false));
//! assert_eq!(no_dos.interpolate("%ONE% ${TWO}", &vars), "%ONE% 2");
//! ```

pub mod cli;
pub mod error;
pub mod interpolate;
pub mod lookup;
pub mod props;

// Re-exports for convenience.
pub use error::{Error, LookupError, PropertyError};
pub use interpolate::{Bound, Config, Interpolator};
pub use lookup::{from_fn, try_from_fn, Combined, Environment, Lookup};
pub use props::Properties;
