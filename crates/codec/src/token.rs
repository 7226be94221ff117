use std::fmt;

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use miniz_oxide::inflate::{self, TINFLStatus};

use crate::DecodeError;

/// Deflate level used by browser `CompressionStream` implementations.
const DEFLATE_LEVEL: u8 = 6;

/// Default ceiling on inflated size accepted by [`decode`] (64 MiB).
pub const DEFAULT_DECODE_LIMIT: usize = 64 * 1024 * 1024;

/// Standard alphabet, lenient about trailing bits the way `atob` is.
const TOKEN_DECODER: GeneralPurpose = GeneralPurpose::new(
	&alphabet::STANDARD,
	GeneralPurposeConfig::new()
		.with_decode_allow_trailing_bits(true)
		.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// URL-fragment-safe encoding of a document.
///
/// Contains only `[A-Za-z0-9_-]`. Tokens built with [`Token::from_fragment`]
/// are not validated; pass them through [`decode`] before trusting them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
	/// The token of the empty document.
	pub const fn empty() -> Self {
		Self(String::new())
	}

	/// Wraps text read from a URL fragment (without the leading `#`).
	pub fn from_fragment(fragment: impl Into<String>) -> Self {
		Self(fragment.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Length in characters, which is also its length in a URL.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn into_string(self) -> String {
		self.0
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl AsRef<str> for Token {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

/// Encodes `text` into a token.
///
/// Deterministic and total. The empty text yields [`Token::empty`].
pub fn encode(text: &str) -> Token {
	if text.is_empty() {
		return Token::empty();
	}

	let compressed = miniz_oxide::deflate::compress_to_vec(text.as_bytes(), DEFLATE_LEVEL);
	let token = Token(URL_SAFE_NO_PAD.encode(&compressed));

	tracing::trace!(
		bytes = text.len(),
		compressed = compressed.len(),
		token_len = token.len(),
		"codec.encode"
	);
	token
}

/// Decodes a token back into text, accepting at most [`DEFAULT_DECODE_LIMIT`]
/// bytes of output.
pub fn decode(token: &str) -> Result<String, DecodeError> {
	decode_with_limit(token, DEFAULT_DECODE_LIMIT)
}

/// Decodes a token back into text, rejecting output larger than `limit` bytes.
///
/// The URL-safe alphabet is mapped back to the standard one and padding is
/// restored before base64 decoding, so tokens with or without `=` padding and
/// in either alphabet are accepted. The empty token yields the empty text.
pub fn decode_with_limit(token: &str, limit: usize) -> Result<String, DecodeError> {
	inflate_token(token, limit).inspect_err(|err| {
		tracing::debug!(token_len = token.len(), limit, error = %err, "codec.decode.rejected");
	})
}

fn inflate_token(token: &str, limit: usize) -> Result<String, DecodeError> {
	if token.is_empty() {
		return Ok(String::new());
	}

	let mut standard: String = token
		.chars()
		.map(|c| match c {
			'-' => '+',
			'_' => '/',
			c => c,
		})
		.collect();
	while standard.len() % 4 != 0 {
		standard.push('=');
	}

	let compressed = TOKEN_DECODER.decode(standard.as_bytes())?;
	let bytes = inflate::decompress_to_vec_with_limit(&compressed, limit).map_err(|err| match err.status {
		TINFLStatus::HasMoreOutput => DecodeError::TooLarge { limit },
		status => DecodeError::Inflate(status),
	})?;

	Ok(String::from_utf8(bytes)?)
}
