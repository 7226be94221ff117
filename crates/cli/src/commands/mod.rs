//! Subcommand implementations.
//!
//! The CLI stands in for the browser page: the snapshot lives in a
//! [`FileStore`] and the fragment is the URL passed on the command line,
//! held in memory for the length of one invocation.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use mynota_config::Config;
use mynota_sync::env::{FileStore, MemoryFragment};
use mynota_sync::{Environment, Export, LoadOutcome, Location, QrPayload, Stats, SyncController};
use tracing::{debug, info};

use crate::cli::{Cli, Command, token_arg};

/// Printed by `open` when there is nothing to show.
pub const WELCOME: &str = "No note yet. Start one with `mynota save FILE`.";

/// Runs one subcommand, writing its result to `out`.
pub async fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
	let config = Config::load_or_default(cli.config.as_deref())?;
	let location = Location::from_config(&config.share);

	match cli.command {
		Command::Encode { file } => {
			let text = read_input(file.as_deref())?;
			writeln!(out, "{}", mynota_codec::encode(&text))?;
		}
		Command::Decode { input } => {
			let token = token_arg(&input)?;
			let text = mynota_codec::decode(&token).context("not a valid mynota link")?;
			write!(out, "{text}")?;
		}
		Command::Stats { file } => {
			let text = read_input(file.as_deref())?;
			let stats = Stats::compute(&text, &mynota_codec::encode(&text));
			write_stats(out, &stats)?;
		}
		Command::Share { file, qr } => {
			let text = read_input(file.as_deref())?;
			let url = location.share_url(&mynota_codec::encode(&text));
			if qr {
				let payload = QrPayload::new(url, config.share.qr_level)?;
				writeln!(out, "{}", payload.as_str())?;
			} else {
				writeln!(out, "{url}")?;
			}
		}
		Command::Export { file, out_dir } => {
			let text = read_input(file.as_deref())?;
			let path = export_to(&out_dir, &text, &config.export.default_name)?;
			writeln!(out, "{}", path.display())?;
		}
		Command::Open { url } => {
			let (location, fragment) = match url {
				Some(url) => Location::parse(&url)?,
				None => (location, None),
			};
			let (controller, outcome) = open_session(cli.store, &config, fragment).await?;
			if outcome.show_welcome {
				writeln!(out, "{WELCOME}")?;
			} else {
				writeln!(out, "{}", controller.share_url(&location))?;
			}
		}
		Command::Save { file } => {
			let text = read_input(Some(file.as_path()))?;
			let (controller, _) = open_session(cli.store, &config, None).await?;
			controller.edit(text);
			controller.force_sync().await;
			if controller.text().is_empty() {
				writeln!(out, "{WELCOME}")?;
			} else {
				writeln!(out, "{}", controller.share_url(&location))?;
			}
		}
		Command::New => {
			let (controller, _) = open_session(cli.store, &config, None).await?;
			controller.new_document();
		}
	}
	Ok(())
}

/// Loads the session stored under `store` (or the platform data directory).
async fn open_session(
	store: Option<PathBuf>,
	config: &Config,
	fragment: Option<String>,
) -> Result<(SyncController, LoadOutcome)> {
	let dir = match store {
		Some(dir) => dir,
		None => mynota_config::default_data_dir().context("no data directory on this platform; pass --store")?,
	};
	debug!(store = %dir.display(), has_fragment = fragment.is_some(), "cli.session.open");

	let fragment = Arc::new(match fragment {
		Some(fragment) => MemoryFragment::with_fragment(fragment),
		None => MemoryFragment::new(),
	});
	let env = Environment::new(fragment, Arc::new(FileStore::new(dir)));
	Ok(SyncController::load(env, &config.sync).await)
}

/// FILE contents, or stdin for `None` and `-`.
fn read_input(file: Option<&Path>) -> Result<String> {
	match file {
		Some(path) if path != Path::new("-") => {
			std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
		}
		_ => std::io::read_to_string(std::io::stdin()).context("reading stdin"),
	}
}

/// Writes `text` to `dir/<slug>.txt` and returns the path.
pub fn export_to(dir: &Path, text: &str, default_name: &str) -> Result<PathBuf> {
	let export = Export::new(text, default_name);
	let path = dir.join(&export.filename);
	std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
	std::fs::write(&path, export.contents).with_context(|| format!("writing {}", path.display()))?;
	info!(path = %path.display(), "cli.export");
	Ok(path)
}

fn write_stats(out: &mut dyn Write, stats: &Stats) -> std::io::Result<()> {
	writeln!(out, "words   {}", stats.words)?;
	writeln!(out, "chars   {}", stats.chars)?;
	writeln!(out, "lines   {}", stats.lines)?;
	writeln!(out, "size    {}", stats.bytes_display())?;
	writeln!(out, "token   {}", stats.token_len)?;
	writeln!(out, "ratio   {}%", stats.ratio)
}

#[cfg(test)]
mod tests;
