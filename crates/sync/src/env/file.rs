use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::trace;

use super::{SnapshotStore, StoreError};

/// Snapshot store keeping one file per key in a directory.
///
/// Writes go through a temporary file in the same directory and are renamed
/// into place, so a reader never sees a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileStore {
	dir: PathBuf,
}

impl FileStore {
	/// The directory is created on first write.
	pub fn new(dir: impl Into<PathBuf>) -> Self {
		Self { dir: dir.into() }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// File backing `key`. Characters outside `[A-Za-z0-9._-]` map to `_`.
	pub fn path_for(&self, key: &str) -> PathBuf {
		let name: String = key
			.chars()
			.map(|c| {
				if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
					c
				} else {
					'_'
				}
			})
			.collect();
		self.dir.join(format!("{name}.txt"))
	}
}

fn io_error(path: &Path, error: std::io::Error) -> StoreError {
	StoreError::Io {
		path: path.to_path_buf(),
		error,
	}
}

impl SnapshotStore for FileStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		let path = self.path_for(key);
		match std::fs::read_to_string(&path) {
			Ok(value) => Ok(Some(value)),
			Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
			Err(error) => Err(io_error(&path, error)),
		}
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		let path = self.path_for(key);
		std::fs::create_dir_all(&self.dir).map_err(|error| io_error(&self.dir, error))?;

		let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(|error| io_error(&self.dir, error))?;
		tmp.write_all(value.as_bytes())
			.map_err(|error| io_error(tmp.path(), error))?;
		tmp.persist(&path).map_err(|err| io_error(&path, err.error))?;

		trace!(path = %path.display(), bytes = value.len(), "sync.file_store.set");
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		let path = self.path_for(key);
		match std::fs::remove_file(&path) {
			Ok(()) => Ok(()),
			Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
			Err(error) => Err(io_error(&path, error)),
		}
	}
}
