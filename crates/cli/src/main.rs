//! `mynota` binary.
//!
//! Encodes notes into share links, inspects them, and keeps a local session
//! in a file-backed store that mirrors the browser's snapshot.

mod cli;
mod commands;

use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let mut stdout = std::io::stdout();
	commands::run(cli, &mut stdout).await
}

/// Logs to stderr. `RUST_LOG` overrides the level picked by `--verbose`.
fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("mynota=debug,mynota_sync=debug,mynota_codec=debug,info")
		} else {
			EnvFilter::new("warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(verbose)
		.init();
}
