//! radiotrace - radio drive-test log extraction and analysis
//!
//! Initializes logging and hands the parsed command line to [`radiotrace::cli`].

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    let cli = radiotrace::cli::parse_cli();

    // A valid RUST_LOG takes precedence over --log-level
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    // Logs go to stderr so a report on stdout stays valid JSON
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    radiotrace::cli::run(cli)
}
