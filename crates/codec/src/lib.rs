//! Text to token codec for URL-fragment persistence.
//!
//! A [`Token`] is the document text run through three stages:
//!
//! ```text
//! text ──UTF-8──▶ bytes ──raw deflate──▶ compressed ──base64url──▶ token
//! ```
//!
//! The deflate stream carries no zlib/gzip framing and no checksum, and the
//! base64 stage uses the URL-safe alphabet without padding, so a token can be
//! placed after `#` in a URL without percent-encoding. Streams produced by a
//! browser `CompressionStream("deflate-raw")` decode with [`decode`] and vice
//! versa.
//!
//! The empty text maps to the empty token and never passes through the
//! compressor, so "no document" is never represented by a non-empty token.
//!
//! [`decode`] is the only fallible operation. Tokens usually come from pasted
//! URLs, so callers should treat [`DecodeError`] as "garbage input" and fall
//! back to another source rather than failing.

mod error;
mod token;

pub use error::DecodeError;
pub use token::{DEFAULT_DECODE_LIMIT, Token, decode, decode_with_limit, encode};

/// Size of `text` once UTF-8 encoded.
pub fn byte_size(text: &str) -> usize {
	text.len()
}

/// Percentage saved by the token relative to the UTF-8 size of `text`.
///
/// Computed as `round((1 - token_len / byte_size) * 100)`. Short inputs where
/// the encoding overhead outweighs the savings produce a negative ratio. Empty
/// text has a ratio of 0.
///
/// Rounding matches `Math.round`: halves round toward positive infinity.
pub fn compression_ratio(text: &str, token: &Token) -> i64 {
	let original = byte_size(text);
	if original == 0 {
		return 0;
	}
	let ratio = (1.0 - token.len() as f64 / original as f64) * 100.0;
	(ratio + 0.5).floor() as i64
}
