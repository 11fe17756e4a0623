use std::io::Write;

use shellsub::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("shellsub: {e}");
            eprint!("{}", cli::USAGE);
            std::process::exit(1);
        }
    };

    if args.help {
        print!("{}", cli::USAGE);
        return;
    }

    init_logging(args.debug);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = cli::run(&args, &mut out).and_then(|()| {
        out.flush().map_err(|source| shellsub::Error::Io { path: "<stdout>".into(), source })
    });

    if let Err(e) = result {
        eprintln!("shellsub: {e}");
        std::process::exit(1);
    }
}

/// Log to stderr; `-d` forces `debug`, otherwise `SHELLSUB_LOG` or `warn`.
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("SHELLSUB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
