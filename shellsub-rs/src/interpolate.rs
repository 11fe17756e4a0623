//! Single-pass variable interpolation.
//!
//! Two expression syntaxes are recognised, each of which can be switched off
//! through [`Config`]:
//!
//! | Sequence          | Meaning                                                 |
//! |-------------------|---------------------------------------------------------|
//! | `%NAME%`          | DOS-style variable; `NAME` is alphanumeric              |
//! | `%%`              | Literal `%`                                             |
//! | `${NAME}`         | sh-style variable; surrounding whitespace is ignored    |
//! | `${NAME:default}` | sh-style variable, or `default` if `NAME` is unset       |
//! | `\$`              | Literal `$`                                             |
//! | `\:` (in a name)  | Literal `:` that does not start a default value         |
//! | `\{` `\}` (in a default) | Literal brace                                    |
//!
//! Anything that does not resolve is copied to the output as it was written:
//! `${MISSING}` stays `${MISSING}`, `a ${B` stays `a ${B`.  Substituted values
//! are never scanned again.
//!
//! The template is read left to right exactly once.  The only time the cursor
//! does not move past a character it has looked at is when a DOS-style
//! expression is cut short by a non-alphanumeric character, which is then
//! handed back to the outer scan.

use std::convert::Infallible;

use tracing::trace;

use crate::lookup::Lookup;

const DOS_BORDER: char = '%';
const SH_SENTINEL: char = '$';
const SH_ESCAPE: char = '\\';
const SH_OPENER: char = '{';
const SH_CLOSER: char = '}';
const SH_DEFAULT_SEPARATOR: char = ':';

// ── Configuration ─────────────────────────────────────────────────────────────

/// Which expression syntaxes an [`Interpolator`] understands.
///
/// A disabled syntax's special characters are ordinary text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Interpolate `${NAME}` expressions (and honour `\$`).
    pub sh: bool,
    /// Interpret `:` inside `${…}` as the start of a default value.
    /// Has no effect when `sh` is off.
    pub sh_defaults: bool,
    /// Interpolate `%NAME%` expressions.
    pub dos: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { sh: true, sh_defaults: true, dos: true }
    }
}

impl Config {
    pub fn with_sh(mut self, enable: bool) -> Self {
        self.sh = enable;
        self
    }

    pub fn with_sh_defaults(mut self, enable: bool) -> Self {
        self.sh_defaults = enable;
        self
    }

    pub fn with_dos(mut self, enable: bool) -> Self {
        self.dos = enable;
        self
    }
}

// ── Interpolator ──────────────────────────────────────────────────────────────

/// Shell-style string interpolator.
///
/// ```rust
/// use std::collections::HashMap;
/// use shellsub::Interpolator;
///
/// let vars = HashMap::from([("HOME", "/home/liz")]);
/// let out = Interpolator::new().interpolate("${HOME}/bin:${OPT:/opt}/bin", &vars);
/// assert_eq!(out, "/home/liz/bin:/opt/bin");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interpolator {
    config: Config,
}

impl Interpolator {
    /// An interpolator with every syntax enabled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> Config {
        self.config
    }

    pub fn supports_sh(&self) -> bool {
        self.config.sh
    }

    pub fn supports_sh_defaults(&self) -> bool {
        self.config.sh_defaults
    }

    pub fn supports_dos(&self) -> bool {
        self.config.dos
    }

    /// Interpolate `template` against an infallible lookup source.
    pub fn interpolate<L>(&self, template: &str, lookup: &L) -> String
    where
        L: Lookup<Error = Infallible> + ?Sized,
    {
        match self.try_interpolate(template, lookup) {
            Ok(out) => out,
            Err(never) => match never {},
        }
    }

    /// Interpolate `template`, stopping at the first failed lookup.
    ///
    /// Malformed expressions are never an error; only `lookup` can fail.
    pub fn try_interpolate<L>(&self, template: &str, lookup: &L) -> Result<String, L::Error>
    where
        L: Lookup + ?Sized,
    {
        Scanner::new(self.config, template, lookup).run()
    }

    /// Fix the lookup source, giving a one-argument interpolator.
    pub fn bind<L: Lookup>(self, lookup: L) -> Bound<L> {
        Bound { interpolator: self, lookup }
    }
}

/// An [`Interpolator`] paired with one lookup source.
#[derive(Debug, Clone)]
pub struct Bound<L> {
    interpolator: Interpolator,
    lookup: L,
}

impl<L: Lookup> Bound<L> {
    pub fn interpolator(&self) -> &Interpolator {
        &self.interpolator
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn try_interpolate(&self, template: &str) -> Result<String, L::Error> {
        self.interpolator.try_interpolate(template, &self.lookup)
    }
}

impl<L: Lookup<Error = Infallible>> Bound<L> {
    pub fn interpolate(&self, template: &str) -> String {
        self.interpolator.interpolate(template, &self.lookup)
    }
}

// ── Scanner ───────────────────────────────────────────────────────────────────

/// Outer scan state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scan,
    /// A `\` was read and not yet emitted.
    EscapePending,
}

/// One interpolation call: cursor, output and the borrowed inputs.
struct Scanner<'a, L: ?Sized> {
    config: Config,
    src: &'a str,
    lookup: &'a L,
    /// Byte offset of the next unread character; always on a char boundary.
    pos: usize,
    out: String,
}

impl<'a, L: Lookup + ?Sized> Scanner<'a, L> {
    fn new(config: Config, src: &'a str, lookup: &'a L) -> Self {
        Self { config, src, lookup, pos: 0, out: String::with_capacity(src.len()) }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn run(mut self) -> Result<String, L::Error> {
        let mut state = State::Scan;

        while let Some(ch) = self.peek() {
            if state == State::EscapePending {
                // `\$` is a literal `$`; any other escape stays as written.
                if ch != SH_SENTINEL {
                    self.out.push(SH_ESCAPE);
                }
                self.out.push(ch);
                self.pos += ch.len_utf8();
                state = State::Scan;
                continue;
            }

            match ch {
                DOS_BORDER if self.config.dos => self.dos_expression()?,
                SH_SENTINEL if self.config.sh => self.sh_expression()?,
                SH_ESCAPE if self.config.sh => {
                    state = State::EscapePending;
                    self.pos += ch.len_utf8();
                }
                _ => {
                    self.out.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }

        if state == State::EscapePending {
            self.out.push(SH_ESCAPE);
        }
        Ok(self.out)
    }

    /// `%NAME%`, starting on the opening border.
    fn dos_expression(&mut self) -> Result<(), L::Error> {
        let start = self.pos;
        let name_start = start + DOS_BORDER.len_utf8();

        for (offset, ch) in self.src[name_start..].char_indices() {
            let at = name_start + offset;

            if ch == DOS_BORDER {
                let name = &self.src[name_start..at];
                if name.is_empty() {
                    self.out.push(DOS_BORDER);
                } else {
                    match self.lookup.lookup(name)? {
                        Some(value) => self.out.push_str(&value),
                        None => {
                            trace!(name = %name, "unresolved DOS-style expression");
                            self.out.push_str(&self.src[start..=at]);
                        }
                    }
                }
                self.pos = at + ch.len_utf8();
                return Ok(());
            }

            if !ch.is_alphanumeric() {
                // Not an expression after all; rescan `ch` from the outer loop.
                self.out.push_str(&self.src[start..at]);
                self.pos = at;
                return Ok(());
            }
        }

        self.out.push_str(&self.src[start..]);
        self.pos = self.src.len();
        Ok(())
    }

    /// `${NAME}` or `${NAME:default}`, starting on the sentinel.
    fn sh_expression(&mut self) -> Result<(), L::Error> {
        let start = self.pos;
        let after_sentinel = start + SH_SENTINEL.len_utf8();

        match self.src[after_sentinel..].chars().next() {
            None => {
                self.out.push(SH_SENTINEL);
                self.pos = after_sentinel;
                return Ok(());
            }
            Some(ch) if ch != SH_OPENER => {
                self.out.push(SH_SENTINEL);
                self.out.push(ch);
                self.pos = after_sentinel + ch.len_utf8();
                return Ok(());
            }
            Some(_) => {}
        }

        let mut pos = after_sentinel + SH_OPENER.len_utf8();
        let mut name = String::new();
        let mut escaped = false;
        let mut default: Option<String> = None;

        while let Some(ch) = self.src[pos..].chars().next() {
            if escaped {
                // Only the separator loses its escape inside a name.
                if ch != SH_DEFAULT_SEPARATOR {
                    name.push(SH_ESCAPE);
                }
                name.push(ch);
                escaped = false;
            } else if ch == SH_CLOSER {
                let name = name.trim();
                match self.lookup.lookup(name)? {
                    Some(value) => self.out.push_str(&value),
                    None => match &default {
                        Some(text) => self.out.push_str(text),
                        None => {
                            trace!(name = %name, "unresolved sh-style expression");
                            self.out.push(SH_SENTINEL);
                            self.out.push(SH_OPENER);
                            self.out.push_str(name);
                            self.out.push(SH_CLOSER);
                        }
                    },
                }
                self.pos = pos + ch.len_utf8();
                return Ok(());
            } else if ch == SH_DEFAULT_SEPARATOR && self.config.sh_defaults {
                let (text, next) = self.sh_default_value(pos);
                default = Some(text);
                pos = next;
                continue;
            } else if ch == SH_ESCAPE {
                escaped = true;
            } else {
                name.push(ch);
            }

            pos += ch.len_utf8();
        }

        // Unterminated: give back what was read.
        self.out.push(SH_SENTINEL);
        self.out.push(SH_OPENER);
        self.out.push_str(&name);
        if escaped {
            self.out.push(SH_ESCAPE);
        }
        if let Some(text) = default {
            self.out.push_str(&text);
        }
        self.pos = self.src.len();
        Ok(())
    }

    /// Default value text, starting on the separator.
    ///
    /// Returns the text and the offset of the closer, which is left unread.
    /// Without a closer the text is the raw remainder of the template,
    /// separator included, and the offset is the end of input.
    fn sh_default_value(&self, start: usize) -> (String, usize) {
        let body = start + SH_DEFAULT_SEPARATOR.len_utf8();
        let mut text = String::new();
        let mut escaped = false;

        for (offset, ch) in self.src[body..].char_indices() {
            if escaped {
                // Only braces lose their escape inside a default.
                if ch != SH_OPENER && ch != SH_CLOSER {
                    text.push(SH_ESCAPE);
                }
                text.push(ch);
                escaped = false;
            } else if ch == SH_CLOSER {
                return (text, body + offset);
            } else if ch == SH_ESCAPE {
                escaped = true;
            } else {
                text.push(ch);
            }
        }

        (self.src[start..].to_owned(), self.src.len())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
