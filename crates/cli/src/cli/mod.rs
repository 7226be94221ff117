//! Argument schema for the `mynota` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mynota_sync::{Location, ShareError};

/// Notes that live in the URL.
#[derive(Parser, Debug)]
#[command(name = "mynota", version)]
#[command(about = "Compress notes into shareable URLs and keep a local copy")]
pub struct Cli {
	/// Config file (defaults to <config dir>/mynota/config.toml)
	#[arg(long, global = true, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Directory holding the local snapshot (defaults to <data dir>/mynota)
	#[arg(long, global = true, value_name = "DIR")]
	pub store: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

/// Subcommands. A missing or `-` FILE reads stdin.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
	/// Print the token for a note
	Encode { file: Option<PathBuf> },

	/// Print the note behind a token or share URL
	Decode {
		#[arg(value_name = "TOKEN|URL")]
		input: String,
	},

	/// Print word, character, line and size counters
	Stats { file: Option<PathBuf> },

	/// Print the share URL for a note
	Share {
		file: Option<PathBuf>,

		/// Fail unless the URL fits in a QR code at the configured level
		#[arg(long)]
		qr: bool,
	},

	/// Write a note to `<slug>.txt`, named after its first heading
	Export {
		file: Option<PathBuf>,

		#[arg(long, value_name = "DIR", default_value = ".")]
		out_dir: PathBuf,
	},

	/// Load the local session, optionally from a share URL, and print its link
	Open { url: Option<String> },

	/// Replace the local session's text with FILE and print the new link
	Save { file: PathBuf },

	/// Discard the local session
	New,
}

/// Extracts the token from a bare token, a `#token`, or a full share URL.
pub fn token_arg(input: &str) -> Result<String, ShareError> {
	let input = input.trim();
	if input.contains("://") {
		let (_, fragment) = Location::parse(input)?;
		return Ok(fragment.unwrap_or_default());
	}
	Ok(input.strip_prefix('#').unwrap_or(input).to_string())
}

#[cfg(test)]
mod tests;
