//! Load-time arbitration between the URL fragment and the local snapshot.
//!
//! Sources are tried in a fixed order and the first probe that yields a
//! document wins:
//!
//! 1. a fragment that decodes (the URL beats a stale local copy)
//! 2. the snapshot, when the fragment is present but malformed
//! 3. the snapshot, when there is no fragment
//!
//! When no probe matches the document starts empty and the front end shows
//! its first-run prompt.

use std::sync::Arc;

use mynota_codec::{DecodeError, Token};
use tracing::{debug, warn};

use crate::env::Environment;
use crate::offload::run_codec;

/// Which source the loaded document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
	/// The URL fragment decoded successfully.
	Fragment,
	/// The fragment was malformed; the local snapshot was used instead.
	SnapshotAfterInvalidFragment,
	/// No fragment; the local snapshot was used.
	Snapshot,
	/// Neither source had content.
	Empty,
}

/// Result of loading, for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
	pub source: LoadSource,
	/// Neither source yielded a document; show the welcome prompt. A fragment
	/// that decodes to the empty text is still a document.
	pub show_welcome: bool,
}

/// Raw inputs gathered once before probing.
pub(crate) struct Candidates {
	fragment: Option<Token>,
	decoded: Option<Result<Arc<str>, DecodeError>>,
	snapshot: Option<Arc<str>>,
}

impl Candidates {
	/// Reads both sources and decodes the fragment, if any.
	pub(crate) async fn gather(env: &Environment, key: &str) -> Self {
		let fragment = env
			.fragment
			.read()
			.filter(|f| !f.is_empty())
			.map(Token::from_fragment);

		let snapshot = match env.store.get(key) {
			Ok(value) => value.filter(|v| !v.is_empty()).map(Arc::from),
			Err(err) => {
				warn!(key, error = %err, "sync.load.snapshot_unreadable");
				None
			}
		};

		let decoded = match &fragment {
			Some(token) => Some(
				run_codec(Arc::from(token.as_str()), mynota_codec::decode)
					.await
					.map(Arc::from),
			),
			None => None,
		};

		if let Some(Err(err)) = &decoded {
			debug!(error = %err, token_len = fragment.as_ref().map_or(0, Token::len), "sync.load.fragment_rejected");
		}

		Self {
			fragment,
			decoded,
			snapshot,
		}
	}

	pub(crate) fn has_fragment(&self) -> bool {
		self.fragment.is_some()
	}
}

/// The document a probe settled on.
#[derive(Debug)]
pub(crate) struct Resolution {
	pub text: Arc<str>,
	/// Token already known to encode `text`; `None` when it must be derived.
	pub token: Option<Token>,
	pub source: LoadSource,
}

impl Resolution {
	fn empty() -> Self {
		Self {
			text: Arc::from(""),
			token: Some(Token::empty()),
			source: LoadSource::Empty,
		}
	}
}

type Probe = fn(&Candidates) -> Option<Resolution>;

/// Tried in order; the first `Some` wins.
const PROBES: [Probe; 3] = [adopt_fragment, recover_from_snapshot, adopt_snapshot];

fn adopt_fragment(candidates: &Candidates) -> Option<Resolution> {
	let Some(Ok(text)) = &candidates.decoded else {
		return None;
	};
	Some(Resolution {
		text: Arc::clone(text),
		token: candidates.fragment.clone(),
		source: LoadSource::Fragment,
	})
}

fn recover_from_snapshot(candidates: &Candidates) -> Option<Resolution> {
	let Some(Err(_)) = &candidates.decoded else {
		return None;
	};
	Some(Resolution {
		text: Arc::clone(candidates.snapshot.as_ref()?),
		token: None,
		source: LoadSource::SnapshotAfterInvalidFragment,
	})
}

fn adopt_snapshot(candidates: &Candidates) -> Option<Resolution> {
	if candidates.fragment.is_some() {
		return None;
	}
	Some(Resolution {
		text: Arc::clone(candidates.snapshot.as_ref()?),
		token: None,
		source: LoadSource::Snapshot,
	})
}

/// Runs the probe chain.
pub(crate) fn resolve(candidates: &Candidates) -> Resolution {
	PROBES
		.iter()
		.find_map(|probe| probe(candidates))
		.unwrap_or_else(Resolution::empty)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn candidates(fragment: Option<&str>, snapshot: Option<&str>) -> Candidates {
		let fragment = fragment.map(Token::from_fragment);
		let decoded = fragment
			.as_ref()
			.map(|t| mynota_codec::decode(t.as_str()).map(Arc::from));
		Candidates {
			fragment,
			decoded,
			snapshot: snapshot.map(Arc::from),
		}
	}

	#[test]
	fn valid_fragment_beats_snapshot() {
		let token = mynota_codec::encode("from url");
		let resolution = resolve(&candidates(Some(token.as_str()), Some("from storage")));
		assert_eq!(&*resolution.text, "from url");
		assert_eq!(resolution.token, Some(token));
		assert_eq!(resolution.source, LoadSource::Fragment);
	}

	#[test]
	fn malformed_fragment_falls_back_to_snapshot() {
		let resolution = resolve(&candidates(Some("!!!"), Some("hello")));
		assert_eq!(&*resolution.text, "hello");
		assert_eq!(resolution.token, None);
		assert_eq!(resolution.source, LoadSource::SnapshotAfterInvalidFragment);
	}

	#[test]
	fn malformed_fragment_without_snapshot_is_empty() {
		let resolution = resolve(&candidates(Some("!!!"), None));
		assert_eq!(resolution.source, LoadSource::Empty);
		assert!(resolution.text.is_empty());
	}

	#[test]
	fn snapshot_used_without_fragment() {
		let resolution = resolve(&candidates(None, Some("stored")));
		assert_eq!(&*resolution.text, "stored");
		assert_eq!(resolution.source, LoadSource::Snapshot);
	}

	#[test]
	fn nothing_yields_empty() {
		let resolution = resolve(&candidates(None, None));
		assert_eq!(resolution.source, LoadSource::Empty);
		assert_eq!(resolution.token, Some(Token::empty()));
	}
}
