//! Token decoding errors.

use miniz_oxide::inflate::TINFLStatus;
use thiserror::Error;

/// A token could not be turned back into text.
///
/// Every variant means the same thing to a caller: the token did not come from
/// [`encode`](crate::encode), or was damaged on the way.
#[derive(Debug, Error)]
pub enum DecodeError {
	/// The token is not valid base64 after alphabet and padding restoration.
	#[error("token is not valid base64: {0}")]
	Base64(#[from] base64::DecodeError),

	/// The decoded bytes are not a complete raw deflate stream.
	#[error("token does not hold a valid deflate stream ({0:?})")]
	Inflate(TINFLStatus),

	/// The inflated text would exceed the decode limit.
	#[error("decoded text exceeds {limit} bytes")]
	TooLarge {
		/// Limit in bytes that was exceeded.
		limit: usize,
	},

	/// The inflated bytes are not UTF-8.
	#[error("decoded text is not valid UTF-8: {0}")]
	Utf8(#[from] std::string::FromUtf8Error),
}
