//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing TOML syntax or mapping it onto the config schema.
	#[error("TOML parse error: {0}")]
	Parse(#[from] toml::de::Error),

	/// A value parsed but is outside its allowed range.
	#[error("invalid value for '{key}': {reason}")]
	InvalidValue {
		/// Dotted key of the offending option.
		key: &'static str,
		/// Why the value was rejected.
		reason: &'static str,
	},
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
