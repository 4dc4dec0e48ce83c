mod cli;
mod extract_cmd;
mod info_cmd;
mod markers_cmd;
mod page_range;
mod shared;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

/// Log to stderr so stdout stays machine-readable. `RUST_LOG` wins over the
/// verbosity flag when set.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        cli::Commands::Extract {
            ref file,
            ref pages,
            threshold,
            compact,
        } => extract_cmd::run(file, pages.as_deref(), threshold, compact),
        cli::Commands::Markers {
            ref file,
            ref pages,
            ref format,
            threshold,
        } => markers_cmd::run(file, pages.as_deref(), format, threshold),
        cli::Commands::Info {
            ref file,
            ref format,
        } => info_cmd::run(file, format),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
