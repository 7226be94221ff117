//! Document statistics shown next to the editor.

use mynota_codec::{Token, byte_size, compression_ratio};

/// Counters derived from the text and its current token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
	/// Whitespace-separated words.
	pub words: usize,
	/// UTF-16 code units, matching a browser's `String.length`.
	pub chars: usize,
	/// `\n`-separated lines; 0 for the empty text.
	pub lines: usize,
	/// UTF-8 size of the text.
	pub bytes: usize,
	/// See [`compression_ratio`]. May be negative.
	pub ratio: i64,
	pub token_len: usize,
}

impl Stats {
	pub fn compute(text: &str, token: &Token) -> Self {
		Self {
			ratio: compression_ratio(text, token),
			token_len: token.len(),
			..Self::default().with_text(text)
		}
	}

	/// Recounts the text, keeping `ratio` and `token_len` from `self`.
	///
	/// While an edit waits for its commit the token still belongs to the
	/// previous text, so the two are not mixed.
	pub fn with_text(self, text: &str) -> Self {
		Self {
			words: text.split_whitespace().count(),
			chars: text.encode_utf16().count(),
			lines: if text.is_empty() { 0 } else { text.split('\n').count() },
			bytes: byte_size(text),
			..self
		}
	}

	/// Percentage saved, or `None` when the token is not smaller than the text.
	pub fn savings(&self) -> Option<u32> {
		u32::try_from(self.ratio).ok().filter(|&ratio| ratio > 0)
	}

	pub fn bytes_display(&self) -> String {
		format_bytes(self.bytes)
	}
}

/// Human-readable size: `0 B`, `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_bytes(bytes: usize) -> String {
	const KB: usize = 1024;
	const MB: usize = 1024 * 1024;

	match bytes {
		0 => "0 B".to_string(),
		b if b < KB => format!("{b} B"),
		b if b < MB => format!("{:.1} KB", b as f64 / KB as f64),
		b => format!("{:.1} MB", b as f64 / MB as f64),
	}
}
