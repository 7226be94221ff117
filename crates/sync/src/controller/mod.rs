//! The sync controller: owner of the document text.
//!
//! [`SyncController`] holds the authoritative text and keeps the URL fragment
//! and the local snapshot eventually consistent with it:
//!
//! - Edits apply synchronously and mark the document [`SyncState::Dirty`]
//! - A single debounce timer commits the text current when it fires
//! - [`force_sync`](SyncController::force_sync) cancels the timer and commits now
//! - [`new_document`](SyncController::new_document) clears everything at once
//!
//! # Ordering
//!
//! Every text change bumps a revision. A commit records the revision it
//! encoded and is dropped if a newer revision has already been written, so a
//! slow encode can never overwrite newer state.
//!
//! The state lock only guards the in-memory document. Fragment and snapshot
//! writes happen after it is released, under a separate write lock that
//! re-checks the revision, so a slow store never delays an edit.
//!
//! # Error Handling
//!
//! Store and clipboard failures are logged where they happen. They never touch
//! the text and never cancel a pending commit.

use std::sync::Arc;
use std::time::Duration;

use mynota_codec::Token;
use mynota_config::SyncConfig;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::arbitrate::{self, Candidates, LoadOutcome, LoadSource};
use crate::env::{Clipboard, ClipboardError, Environment};
use crate::keys::{self, KeyAction, Selection};
use crate::offload::run_codec;
use crate::share::{Export, Location};
use crate::stats::Stats;

/// Whether the stores reflect the current text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
	/// Edited since the last commit.
	Dirty,
	/// Fragment and snapshot match the text (or are both cleared).
	Committed,
}

/// Published on every state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
	pub state: SyncState,
	/// Revision of the in-memory text.
	pub revision: u64,
	/// Revision of the last commit.
	pub committed: u64,
}

/// Consistent snapshot of everything a front end renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorView {
	pub text: Arc<str>,
	pub token: Token,
	pub stats: Stats,
	pub state: SyncState,
}

/// The outstanding debounce timer.
#[derive(Debug)]
struct PendingCommit {
	id: u64,
	cancel: CancellationToken,
}

#[derive(Debug)]
struct State {
	text: Arc<str>,
	token: Token,
	stats: Stats,
	sync: SyncState,
	revision: u64,
	committed: u64,
	pending: Option<PendingCommit>,
	next_timer: u64,
}

impl State {
	fn status(&self) -> SyncStatus {
		SyncStatus {
			state: self.sync,
			revision: self.revision,
			committed: self.committed,
		}
	}

	fn cancel_pending(&mut self) -> bool {
		match self.pending.take() {
			Some(pending) => {
				pending.cancel.cancel();
				true
			}
			None => false,
		}
	}
}

struct Inner {
	env: Environment,
	storage_key: String,
	debounce: Duration,
	runtime: Handle,
	state: Mutex<State>,
	/// Revision last mirrored into the fragment and snapshot.
	written: Mutex<u64>,
	status_tx: watch::Sender<SyncStatus>,
}

impl Inner {
	fn publish(&self, state: &State) {
		self.status_tx.send_replace(state.status());
	}

	fn write_snapshot(&self, text: &str) {
		if let Err(err) = self.env.store.set(&self.storage_key, text) {
			warn!(key = %self.storage_key, bytes = text.len(), error = %err, "sync.store.write_failed");
		}
	}

	fn remove_snapshot(&self) {
		if let Err(err) = self.env.store.remove(&self.storage_key) {
			warn!(key = %self.storage_key, error = %err, "sync.store.remove_failed");
		}
	}

	/// Encodes the current text and writes it out.
	///
	/// `force` rewrites the stores even when the revision is already committed.
	async fn commit(&self, force: bool) {
		let (text, revision) = {
			let state = self.state.lock();
			(Arc::clone(&state.text), state.revision)
		};

		let token = run_codec(Arc::clone(&text), mynota_codec::encode).await;
		self.write_commit(revision, &text, token, force);
	}

	/// Records an encoded revision unless something newer is already recorded,
	/// then mirrors it into the stores.
	fn write_commit(&self, revision: u64, text: &str, token: Token, force: bool) {
		{
			let mut state = self.state.lock();
			if revision < state.committed || (revision == state.committed && !force) {
				debug!(revision, committed = state.committed, "sync.commit.stale");
				return;
			}

			state.stats = Stats::compute(text, &token).with_text(&state.text);
			state.token = token.clone();
			state.committed = revision;
			if state.revision == revision {
				state.sync = SyncState::Committed;
			}

			debug!(
				revision,
				current = state.revision,
				bytes = text.len(),
				token_len = token.len(),
				"sync.commit.done"
			);
			self.publish(&state);
		}

		self.write_stores(revision, text, &token);
	}

	/// Writes the fragment and snapshot for `revision`. Called without the
	/// state lock; skipped when a newer revision already reached the stores.
	fn write_stores(&self, revision: u64, text: &str, token: &Token) {
		let mut written = self.written.lock();
		if revision < *written {
			debug!(revision, written = *written, "sync.commit.superseded");
			return;
		}
		*written = revision;

		if text.is_empty() {
			self.env.fragment.clear();
			self.remove_snapshot();
		} else {
			self.env.fragment.replace(token.as_str());
			self.write_snapshot(text);
		}
	}

	/// Replaces the text and (re)arms the debounce timer.
	fn apply_edit(self: &Arc<Self>, text: Arc<str>) {
		let mut state = self.state.lock();
		state.revision += 1;
		state.stats = state.stats.with_text(&text);
		state.text = text;
		state.sync = SyncState::Dirty;

		let superseded = state.cancel_pending();
		state.next_timer += 1;
		let id = state.next_timer;
		let cancel = CancellationToken::new();
		state.pending = Some(PendingCommit {
			id,
			cancel: cancel.clone(),
		});

		trace!(
			revision = state.revision,
			bytes = state.text.len(),
			superseded,
			"sync.edit"
		);
		self.publish(&state);
		drop(state);

		let inner = Arc::clone(self);
		let delay = self.debounce;
		self.runtime.spawn(async move {
			tokio::select! {
				_ = cancel.cancelled() => {}
				_ = tokio::time::sleep(delay) => inner.fire(id, &cancel).await,
			}
		});
	}

	async fn fire(&self, id: u64, cancel: &CancellationToken) {
		{
			let mut state = self.state.lock();
			if cancel.is_cancelled() {
				return;
			}
			if state.pending.as_ref().is_some_and(|p| p.id == id) {
				state.pending = None;
			}
		}
		self.commit(false).await;
	}
}

/// Owner of the document text. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SyncController {
	inner: Arc<Inner>,
}

impl std::fmt::Debug for SyncController {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("SyncController")
			.field("bytes", &state.text.len())
			.field("state", &state.sync)
			.field("revision", &state.revision)
			.finish()
	}
}

impl SyncController {
	/// Resolves the initial document and returns a controller owning it.
	///
	/// This is the only constructor, so arbitration runs exactly once per
	/// controller and always before the first edit. Must be called from
	/// within a tokio runtime; debounce timers are spawned on it.
	pub async fn load(env: Environment, config: &SyncConfig) -> (Self, LoadOutcome) {
		let key = config.storage_key.as_str();
		let candidates = Candidates::gather(&env, key).await;
		let had_fragment = candidates.has_fragment();
		let resolution = arbitrate::resolve(&candidates);
		let source = resolution.source;
		let text = resolution.text;

		let token = match resolution.token {
			Some(token) => token,
			None => run_codec(Arc::clone(&text), mynota_codec::encode).await,
		};

		let show_welcome = source == LoadSource::Empty;
		match source {
			LoadSource::Empty => {
				if had_fragment {
					env.fragment.clear();
				}
				if let Err(err) = env.store.remove(key) {
					warn!(key, error = %err, "sync.store.remove_failed");
				}
			}
			LoadSource::Fragment => {
				if let Err(err) = env.store.set(key, &text) {
					warn!(key, bytes = text.len(), error = %err, "sync.store.write_failed");
				}
			}
			LoadSource::SnapshotAfterInvalidFragment | LoadSource::Snapshot => {
				env.fragment.replace(token.as_str());
			}
		}

		info!(
			source = ?source,
			bytes = text.len(),
			token_len = token.len(),
			show_welcome,
			"sync.load.resolved"
		);

		let state = State {
			stats: Stats::compute(&text, &token),
			text,
			token,
			sync: SyncState::Committed,
			revision: 0,
			committed: 0,
			pending: None,
			next_timer: 0,
		};
		let (status_tx, _) = watch::channel(state.status());

		let controller = Self {
			inner: Arc::new(Inner {
				env,
				storage_key: config.storage_key.clone(),
				debounce: config.debounce(),
				runtime: Handle::current(),
				state: Mutex::new(state),
				written: Mutex::new(0),
				status_tx,
			}),
		};

		(controller, LoadOutcome { source, show_welcome })
	}

	/// Replaces the text and schedules a debounced commit.
	pub fn edit(&self, text: impl Into<String>) {
		self.inner.apply_edit(Arc::from(text.into()));
	}

	/// Replaces `selection` with an indent, as an edit. Returns the new caret.
	pub fn insert_indent(&self, selection: Selection) -> usize {
		let text = self.text();
		let (next, caret) = keys::insert_indent(&text, selection);
		self.edit(next);
		caret
	}

	/// Cancels the pending timer and commits the current text now.
	pub async fn force_sync(&self) {
		let cancelled = {
			let mut state = self.inner.state.lock();
			state.cancel_pending()
		};
		debug!(cancelled, "sync.force_sync");
		self.inner.commit(true).await;
	}

	/// Runs a key binding. Returns the new caret for [`KeyAction::InsertIndent`].
	pub async fn handle_key(&self, action: KeyAction, selection: Selection) -> Option<usize> {
		match action {
			KeyAction::InsertIndent => Some(self.insert_indent(selection)),
			KeyAction::ForceSync => {
				self.force_sync().await;
				None
			}
		}
	}

	/// Clears text, token, fragment and snapshot, skipping the dirty state.
	pub fn new_document(&self) {
		let inner = &self.inner;
		let revision = {
			let mut state = inner.state.lock();
			state.cancel_pending();
			state.revision += 1;
			state.text = Arc::from("");
			state.token = Token::empty();
			state.stats = Stats::default();
			state.sync = SyncState::Committed;
			state.committed = state.revision;
			inner.publish(&state);
			state.revision
		};

		inner.write_stores(revision, "", &Token::empty());
		info!(revision, "sync.new_document");
	}

	pub fn text(&self) -> Arc<str> {
		Arc::clone(&self.inner.state.lock().text)
	}

	/// Token of the last commit.
	pub fn token(&self) -> Token {
		self.inner.state.lock().token.clone()
	}

	pub fn stats(&self) -> Stats {
		self.inner.state.lock().stats
	}

	pub fn state(&self) -> SyncState {
		self.inner.state.lock().sync
	}

	pub fn view(&self) -> EditorView {
		let state = self.inner.state.lock();
		EditorView {
			text: Arc::clone(&state.text),
			token: state.token.clone(),
			stats: state.stats,
			state: state.sync,
		}
	}

	/// Receiver notified on every edit and commit.
	pub fn status(&self) -> watch::Receiver<SyncStatus> {
		self.inner.status_tx.subscribe()
	}

	/// Share link for the last committed token.
	pub fn share_url(&self, location: &Location) -> String {
		location.share_url(&self.token())
	}

	/// Writes the share link to `clipboard` and returns it.
	pub fn copy_share_url(&self, location: &Location, clipboard: &dyn Clipboard) -> Result<String, ClipboardError> {
		let url = self.share_url(location);
		if let Err(err) = clipboard.write_text(&url) {
			warn!(error = %err, "sync.clipboard.write_failed");
			return Err(err);
		}
		Ok(url)
	}

	/// The current text as a downloadable file.
	pub fn export(&self, default_name: &str) -> Export {
		Export::new(&self.text(), default_name)
	}
}
