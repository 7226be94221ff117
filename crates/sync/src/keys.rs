//! The two key bindings that feed the sync protocol.

/// Inserted by the indent binding.
pub const INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
	/// `Tab`: replace the selection with [`INDENT`].
	InsertIndent,
	/// `Ctrl+S` / `Cmd+S`: commit immediately.
	ForceSync,
}

impl KeyAction {
	/// Maps a key event (DOM `KeyboardEvent.key` naming) to an action.
	pub fn from_key(key: &str, ctrl: bool, meta: bool) -> Option<Self> {
		match key {
			"Tab" => Some(KeyAction::InsertIndent),
			"s" if ctrl || meta => Some(KeyAction::ForceSync),
			_ => None,
		}
	}
}

/// Selection in UTF-16 code units, as a browser's `selectionStart` and
/// `selectionEnd` report it. `start == end` is a caret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
	pub start: usize,
	pub end: usize,
}

impl Selection {
	pub const fn caret(at: usize) -> Self {
		Self { start: at, end: at }
	}

	pub const fn new(start: usize, end: usize) -> Self {
		Self { start, end }
	}
}

/// Byte offset of UTF-16 offset `unit`. Clamps to the end of `text` and
/// rounds down when `unit` splits a surrogate pair.
fn byte_offset(text: &str, unit: usize) -> usize {
	let mut units = 0;
	for (byte, c) in text.char_indices() {
		units += c.len_utf16();
		if units > unit {
			return byte;
		}
	}
	text.len()
}

/// Replaces `selection` in `text` with [`INDENT`].
///
/// Offsets past the end clamp to the end and a reversed selection is
/// normalized. Returns the new text and the caret (UTF-16 units) after the
/// indent.
pub fn insert_indent(text: &str, selection: Selection) -> (String, usize) {
	let start = byte_offset(text, selection.start.min(selection.end));
	let end = byte_offset(text, selection.start.max(selection.end));

	let mut out = String::with_capacity(text.len() + INDENT.len());
	out.push_str(&text[..start]);
	out.push_str(INDENT);
	out.push_str(&text[end..]);

	let caret = text[..start].encode_utf16().count() + INDENT.len();
	(out, caret)
}
