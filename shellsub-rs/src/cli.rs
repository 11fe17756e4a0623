//! Command-line argument parsing and the `shellsub` driver.
//!
//! Usage:
//!   shellsub [-SPNdh] [-s <source>] [-p <file>]... [-D <name=value>]... [<file>...]

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::interpolate::{Config, Interpolator};
use crate::lookup::{Combined, Environment};
use crate::props::Properties;

pub const USAGE: &str = "\
Usage: shellsub [-SPNdh] [-s <source>] [-p <file>]... [-D <name=value>]... [<file>...]

Interpolate ${NAME}, ${NAME:default} and %NAME% in each <file> (or stdin)
and write the result to stdout.

  -s <source>      where values come from: env (default), props, combined
  -p <file>        load properties from <file>
  -D <name=value>  define a property
  -S               do not interpolate ${NAME} expressions
  -P               do not interpolate %NAME% expressions
  -N               do not interpret ${NAME:default} defaults
  -d               debug logging (otherwise SHELLSUB_LOG, default `warn`)
  -h               show this help
";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Where lookups are answered from (`-s`).
    pub source: Source,
    /// Property files and definitions, in command-line order (`-p`, `-D`).
    pub properties: Vec<PropertySpec>,
    /// Expression syntaxes to honour (`-S`, `-P`, `-N`).
    pub config: Config,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Print usage and exit (`-h`).
    pub help: bool,
    /// Templates to interpolate; empty means stdin.
    pub inputs: Vec<Input>,
}

/// Lookup source selected with `-s`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Process environment.
    #[default]
    Env,
    /// Only the properties given with `-p`/`-D`.
    Props,
    /// `env.NAME` from the environment, everything else from properties.
    Combined,
}

/// One `-p` or `-D` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertySpec {
    File(PathBuf),
    Define(String),
}

/// A template to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Stdin => f.write_str("<stdin>"),
            Input::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> std::result::Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> std::result::Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            args.inputs.extend(argv[i + 1..].iter().map(|a| input_from(a)));
            break;
        }

        // Non-flag argument.
        if !arg.starts_with('-') || arg == "-" {
            args.inputs.push(input_from(arg));
            i += 1;
            continue;
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,
                'h' => args.help = true,
                'S' => args.config.sh = false,
                'P' => args.config.dos = false,
                'N' => args.config.sh_defaults = false,

                // Value flags: the rest of this argument, or the next one.
                c @ ('s' | 'p' | 'D') => {
                    let value = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err(format!("-{c} requires an argument"));
                    };
                    match c {
                        's' => args.source = parse_source(&value)?,
                        'p' => args.properties.push(PropertySpec::File(PathBuf::from(value))),
                        _ => args.properties.push(PropertySpec::Define(value)),
                    }
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    Ok(args)
}

fn input_from(arg: &str) -> Input {
    if arg == "-" {
        Input::Stdin
    } else {
        Input::File(PathBuf::from(arg))
    }
}

fn parse_source(s: &str) -> std::result::Result<Source, String> {
    match s {
        "env" => Ok(Source::Env),
        "props" => Ok(Source::Props),
        "combined" => Ok(Source::Combined),
        other => Err(format!("unknown source `{other}` (expected env, props or combined)")),
    }
}

// ── Driver ────────────────────────────────────────────────────────────────────

/// Build the property table from `-p` files and `-D` definitions, in order.
///
/// Malformed lines in files are logged and skipped; a malformed `-D` is a
/// usage error.
pub fn load_properties(specs: &[PropertySpec]) -> Result<Properties> {
    let mut props = Properties::new();

    for spec in specs {
        match spec {
            PropertySpec::File(path) => {
                let (loaded, errors) = Properties::load_file(path)?;
                for e in &errors {
                    warn!(file = %path.display(), "{e}");
                }
                debug!(file = %path.display(), count = loaded.len(), "loaded properties");
                props.extend(loaded);
            }
            PropertySpec::Define(definition) => {
                props.define(definition).map_err(|msg| Error::Usage(format!("-D: {msg}")))?;
            }
        }
    }

    Ok(props)
}

fn read_input(input: &Input) -> Result<String> {
    match input {
        Input::Stdin => std::io::read_to_string(std::io::stdin())
            .map_err(|source| Error::Io { path: PathBuf::from("<stdin>"), source }),
        Input::File(path) => std::fs::read_to_string(path)
            .map_err(|source| Error::Io { path: path.clone(), source }),
    }
}

/// Interpolate every input named in `args` and write the results to `out`.
pub fn run<W: Write>(args: &CliArgs, out: &mut W) -> Result<()> {
    let props = load_properties(&args.properties)?;
    let interpolator = Interpolator::with_config(args.config);

    let stdin_only = [Input::Stdin];
    let inputs = if args.inputs.is_empty() { &stdin_only[..] } else { &args.inputs[..] };

    for input in inputs {
        let template = read_input(input)?;
        debug!(%input, bytes = template.len(), source = ?args.source, "interpolating");

        let result = match args.source {
            Source::Env => interpolator.try_interpolate(&template, &Environment)?,
            Source::Props => interpolator.interpolate(&template, &props),
            Source::Combined => interpolator.try_interpolate(&template, &Combined::new(&props))?,
        };

        out.write_all(result.as_bytes())
            .map_err(|source| Error::Io { path: PathBuf::from("<stdout>"), source })?;
    }

    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn empty_args() {
        let a = parse_argv(&argv(&[])).unwrap();
        assert_eq!(a.source, Source::Env);
        assert_eq!(a.config, Config::default());
        assert!(a.inputs.is_empty());
        assert!(!a.help && !a.debug);
    }

    #[test]
    fn positional_inputs() {
        let a = parse_argv(&argv(&["a.tmpl", "-", "b.tmpl"])).unwrap();
        assert_eq!(
            a.inputs,
            vec![
                Input::File(PathBuf::from("a.tmpl")),
                Input::Stdin,
                Input::File(PathBuf::from("b.tmpl")),
            ]
        );
    }

    #[test]
    fn syntax_flags() {
        let a = parse_argv(&argv(&["-S", "-P", "-N"])).unwrap();
        assert_eq!(a.config, Config { sh: false, sh_defaults: false, dos: false });
    }

    #[test]
    fn combined_bool_flags() {
        let a = parse_argv(&argv(&["-Pdh"])).unwrap();
        assert!(!a.config.dos && a.config.sh && a.debug && a.help);
    }

    #[test]
    fn source_embedded_and_separate() {
        assert_eq!(parse_argv(&argv(&["-sprops"])).unwrap().source, Source::Props);
        assert_eq!(parse_argv(&argv(&["-s", "combined"])).unwrap().source, Source::Combined);
        assert!(parse_argv(&argv(&["-s", "ldap"])).is_err());
    }

    #[test]
    fn value_flag_after_bools() {
        let a = parse_argv(&argv(&["-dsprops"])).unwrap();
        assert!(a.debug);
        assert_eq!(a.source, Source::Props);
    }

    #[test]
    fn properties_keep_order() {
        let a = parse_argv(&argv(&["-p", "a.properties", "-DX=1", "-pb.properties"])).unwrap();
        assert_eq!(
            a.properties,
            vec![
                PropertySpec::File(PathBuf::from("a.properties")),
                PropertySpec::Define("X=1".to_owned()),
                PropertySpec::File(PathBuf::from("b.properties")),
            ]
        );
    }

    #[test]
    fn missing_value() {
        assert!(parse_argv(&argv(&["-p"])).is_err());
        assert!(parse_argv(&argv(&["-D"])).is_err());
    }

    #[test]
    fn double_dash_ends_flags() {
        let a = parse_argv(&argv(&["--", "-S", "-"])).unwrap();
        assert!(a.config.sh);
        assert_eq!(a.inputs, vec![Input::File(PathBuf::from("-S")), Input::Stdin]);
    }

    #[test]
    fn unknown_flag() {
        assert!(parse_argv(&argv(&["-z"])).is_err());
    }

    #[test]
    fn load_properties_later_wins() {
        let specs = vec![
            PropertySpec::Define("X=first".to_owned()),
            PropertySpec::Define("X=second".to_owned()),
            PropertySpec::Define("Y = spaced ".to_owned()),
        ];
        let props = load_properties(&specs).unwrap();
        assert_eq!(props.get("X"), Some("second"));
        assert_eq!(props.get("Y"), Some("spaced"));
    }

    #[test]
    fn bad_define_is_usage_error() {
        let err = load_properties(&[PropertySpec::Define("novalue".to_owned())]).unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
    }

    #[test]
    fn run_with_props_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.tmpl");
        std::fs::write(&path, "hello ${WHO}, %WHAT%! ${MISSING:ok}").unwrap();

        let args = CliArgs {
            source: Source::Props,
            properties: vec![
                PropertySpec::Define("WHO=world".to_owned()),
                PropertySpec::Define("WHAT=bye".to_owned()),
            ],
            inputs: vec![Input::File(path)],
            ..CliArgs::default()
        };
        let mut out = Vec::new();
        run(&args, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "hello world, bye! ok");
    }

    #[test]
    fn run_missing_input_is_io_error() {
        let args = CliArgs {
            inputs: vec![Input::File(PathBuf::from("/nonexistent/shellsub/in.tmpl"))],
            ..CliArgs::default()
        };
        let err = run(&args, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
