//! Configuration for mynota.
//!
//! Read from `config.toml` in the user's config directory
//! (`$XDG_CONFIG_HOME/mynota/config.toml` on Linux). Every field has a
//! default, so an absent file and an empty file both yield [`Config::default`].
//!
//! ```toml
//! [sync]
//! debounce_ms = 500
//! storage_key = "mynota-content"
//!
//! [share]
//! origin = "https://mynota.app"
//! path = "/"
//! qr_level = "L"
//!
//! [export]
//! default_name = "mynota-document"
//! ```

mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use error::{ConfigError, Result};
use serde::Deserialize;
use tracing::debug;

/// Directory name used under the platform config and data directories.
pub const APP_NAME: &str = "mynota";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	pub sync: SyncConfig,
	pub share: ShareConfig,
	pub export: ExportConfig,
}

/// Debounced persistence settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
	/// Quiet period after the last edit before a commit runs.
	pub debounce_ms: u64,
	/// Key under which the plain-text snapshot is stored.
	pub storage_key: String,
}

impl SyncConfig {
	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}
}

impl Default for SyncConfig {
	fn default() -> Self {
		Self {
			debounce_ms: 500,
			storage_key: "mynota-content".to_string(),
		}
	}
}

/// Where share links point.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShareConfig {
	pub origin: String,
	pub path: String,
	pub qr_level: QrLevel,
}

impl Default for ShareConfig {
	fn default() -> Self {
		Self {
			origin: "https://mynota.app".to_string(),
			path: "/".to_string(),
			qr_level: QrLevel::default(),
		}
	}
}

/// QR error-correction level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum QrLevel {
	#[default]
	L,
	M,
	Q,
	H,
}

impl QrLevel {
	/// Byte-mode capacity of the largest (version 40) symbol at this level.
	pub const fn max_bytes(self) -> usize {
		match self {
			QrLevel::L => 2953,
			QrLevel::M => 2331,
			QrLevel::Q => 1663,
			QrLevel::H => 1273,
		}
	}
}

/// Plain-text export settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
	/// Filename stem used when the document has no heading.
	pub default_name: String,
}

impl Default for ExportConfig {
	fn default() -> Self {
		Self {
			default_name: "mynota-document".to_string(),
		}
	}
}

impl Config {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(source: &str) -> Result<Self> {
		let config: Config = toml::from_str(source)?;
		config.validate()?;
		Ok(config)
	}

	/// Loads and validates the file at `path`.
	pub fn load(path: &Path) -> Result<Self> {
		let source = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		debug!(path = %path.display(), "config.load");
		Self::from_toml_str(&source)
	}

	/// Loads the user config file, falling back to defaults when it does not exist.
	pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
		if let Some(path) = path {
			return Self::load(path);
		}
		match default_config_path() {
			Some(path) if path.exists() => Self::load(&path),
			_ => {
				debug!("config.defaults");
				Ok(Self::default())
			}
		}
	}

	fn validate(&self) -> Result<()> {
		if self.sync.debounce_ms == 0 {
			return Err(ConfigError::InvalidValue {
				key: "sync.debounce_ms",
				reason: "must be greater than zero",
			});
		}
		if self.sync.storage_key.is_empty() {
			return Err(ConfigError::InvalidValue {
				key: "sync.storage_key",
				reason: "must not be empty",
			});
		}
		if !self.share.path.starts_with('/') {
			return Err(ConfigError::InvalidValue {
				key: "share.path",
				reason: "must start with '/'",
			});
		}
		if self.export.default_name.is_empty() {
			return Err(ConfigError::InvalidValue {
				key: "export.default_name",
				reason: "must not be empty",
			});
		}
		Ok(())
	}
}

/// `<config dir>/mynota/config.toml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join(APP_NAME).join("config.toml"))
}

/// `<data dir>/mynota`, where the CLI keeps its snapshot store.
pub fn default_data_dir() -> Option<PathBuf> {
	dirs::data_dir().map(|dir| dir.join(APP_NAME))
}
