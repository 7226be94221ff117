//! Keeps a note's text, its URL fragment and its local snapshot in step.
//!
//! ```text
//! ┌──────────────┐  load   ┌────────────────┐  commit  ┌──────────────┐
//! │ URL fragment │────────▶│ SyncController │─────────▶│ URL fragment │
//! │ local store  │         │  (text, stats) │ debounce │ local store  │
//! └──────────────┘         └────────────────┘          └──────────────┘
//! ```
//!
//! [`SyncController::load`] decides which source wins (see [`arbitrate`]),
//! after which edits are applied immediately and written back through the
//! codec after a quiet period. The stores are reached through the traits in
//! [`env`], so the same controller drives a browser page, the CLI and tests.

pub mod arbitrate;
mod controller;
pub mod env;
pub mod keys;
mod offload;
pub mod share;
pub mod stats;

pub use arbitrate::{LoadOutcome, LoadSource};
pub use controller::{EditorView, SyncController, SyncState, SyncStatus};
pub use env::Environment;
pub use keys::{KeyAction, Selection};
pub use offload::OFFLOAD_THRESHOLD;
pub use share::{Export, Location, QrPayload, ShareError};
pub use stats::Stats;
