//! Environment seams the controller reads from and writes to.
//!
//! A browser front end backs [`Fragment`] with `location.hash` /
//! `history.replaceState`, [`SnapshotStore`] with `localStorage`, and
//! [`Clipboard`] with the async clipboard API. The in-memory implementations
//! here record every write and back the tests and the headless CLI.

mod file;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

pub use file::FileStore;
use parking_lot::Mutex;
use thiserror::Error;

/// The URL fragment (the part after `#`).
pub trait Fragment: Send + Sync {
	/// Current fragment without the leading `#`, `None` when there is none.
	fn read(&self) -> Option<String>;

	/// Replaces the fragment without navigating.
	fn replace(&self, token: &str);

	/// Removes the fragment, leaving origin and path.
	fn clear(&self);
}

/// Local key-value storage holding the plain-text snapshot.
pub trait SnapshotStore: Send + Sync {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
	fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
	fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// System clipboard.
pub trait Clipboard: Send + Sync {
	fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Storage failures. Reported where they happen and otherwise ignored.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The write would exceed the store's quota.
	#[error("storage quota exceeded: {needed} bytes needed, quota is {quota}")]
	QuotaExceeded {
		/// Total bytes the store would hold after the write.
		needed: usize,
		/// Maximum bytes the store accepts.
		quota: usize,
	},

	/// Filesystem error from a file-backed store.
	#[error("I/O error on {path}: {error}")]
	Io {
		/// File being accessed.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}

/// Clipboard failures.
#[derive(Debug, Error)]
pub enum ClipboardError {
	#[error("clipboard access denied")]
	Denied,
}

/// The two stores a controller keeps in sync.
#[derive(Clone)]
pub struct Environment {
	pub fragment: Arc<dyn Fragment>,
	pub store: Arc<dyn SnapshotStore>,
}

impl Environment {
	pub fn new(fragment: Arc<dyn Fragment>, store: Arc<dyn SnapshotStore>) -> Self {
		Self { fragment, store }
	}
}

impl std::fmt::Debug for Environment {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Environment").finish_non_exhaustive()
	}
}

/// A write observed by [`MemoryFragment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentWrite {
	Replace(String),
	Clear,
}

/// In-memory URL fragment.
#[derive(Debug, Default)]
pub struct MemoryFragment {
	current: Mutex<Option<String>>,
	writes: Mutex<Vec<FragmentWrite>>,
}

impl MemoryFragment {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts with `fragment` already in the URL, as if the page was opened from a link.
	pub fn with_fragment(fragment: impl Into<String>) -> Self {
		Self {
			current: Mutex::new(Some(fragment.into())),
			writes: Mutex::default(),
		}
	}

	pub fn current(&self) -> Option<String> {
		self.current.lock().clone()
	}

	/// Every write since construction, oldest first.
	pub fn writes(&self) -> Vec<FragmentWrite> {
		self.writes.lock().clone()
	}
}

impl Fragment for MemoryFragment {
	fn read(&self) -> Option<String> {
		self.current()
	}

	fn replace(&self, token: &str) {
		*self.current.lock() = Some(token.to_string());
		self.writes.lock().push(FragmentWrite::Replace(token.to_string()));
	}

	fn clear(&self) {
		*self.current.lock() = None;
		self.writes.lock().push(FragmentWrite::Clear);
	}
}

/// In-memory snapshot store with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: Mutex<HashMap<String, String>>,
	quota: Option<usize>,
	sets: Mutex<Vec<String>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Rejects writes that would make the store hold more than `quota` bytes.
	pub fn with_quota(quota: usize) -> Self {
		Self {
			quota: Some(quota),
			..Self::default()
		}
	}

	pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.entries.lock().insert(key.into(), value.into());
		self
	}

	pub fn value(&self, key: &str) -> Option<String> {
		self.entries.lock().get(key).cloned()
	}

	/// Values passed to successful [`SnapshotStore::set`] calls, oldest first.
	pub fn sets(&self) -> Vec<String> {
		self.sets.lock().clone()
	}
}

impl SnapshotStore for MemoryStore {
	fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
		Ok(self.value(key))
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		let mut entries = self.entries.lock();
		if let Some(quota) = self.quota {
			let others: usize = entries
				.iter()
				.filter(|(k, _)| k.as_str() != key)
				.map(|(k, v)| k.len() + v.len())
				.sum();
			let needed = others + key.len() + value.len();
			if needed > quota {
				return Err(StoreError::QuotaExceeded { needed, quota });
			}
		}
		entries.insert(key.to_string(), value.to_string());
		self.sets.lock().push(value.to_string());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.entries.lock().remove(key);
		Ok(())
	}
}

/// In-memory clipboard. Can be built to deny access.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
	contents: Mutex<Option<String>>,
	deny: bool,
}

impl MemoryClipboard {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn denied() -> Self {
		Self {
			contents: Mutex::default(),
			deny: true,
		}
	}

	pub fn contents(&self) -> Option<String> {
		self.contents.lock().clone()
	}
}

impl Clipboard for MemoryClipboard {
	fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
		if self.deny {
			return Err(ClipboardError::Denied);
		}
		*self.contents.lock() = Some(text.to_string());
		Ok(())
	}
}
