//! Share links, QR payloads and plain-text export.

use mynota_codec::Token;
use mynota_config::{QrLevel, ShareConfig};
use thiserror::Error;
use url::Url;

/// Product name used in window titles.
pub const APP_TITLE: &str = "mynota";

/// Filename stem used when neither the heading nor the configured default slugify to anything.
pub const FALLBACK_EXPORT_NAME: &str = "mynota-document";

/// MIME type of exported files.
pub const EXPORT_MIME: &str = "text/plain;charset=utf-8";

#[derive(Debug, Error)]
pub enum ShareError {
	#[error("invalid location: {0}")]
	InvalidLocation(#[from] url::ParseError),

	/// The URL has no scheme/host origin (e.g. `file:` or `data:` URLs).
	#[error("location {0} has an opaque origin")]
	OpaqueOrigin(String),

	/// The share URL does not fit in a QR symbol. Not a codec failure.
	#[error("share URL is {len} bytes; a level {level:?} QR code holds at most {max}")]
	QrCapacity { len: usize, max: usize, level: QrLevel },
}

/// Origin and path of the page hosting the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
	origin: String,
	path: String,
}

impl Location {
	pub fn new(origin: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			origin: origin.into(),
			path: path.into(),
		}
	}

	pub fn from_config(config: &ShareConfig) -> Self {
		Self::new(config.origin.trim_end_matches('/'), config.path.clone())
	}

	/// Splits a full URL into its location and fragment (without `#`).
	pub fn parse(url: &str) -> Result<(Self, Option<String>), ShareError> {
		let url = Url::parse(url)?;
		let origin = url.origin();
		if !origin.is_tuple() {
			return Err(ShareError::OpaqueOrigin(url.to_string()));
		}
		let fragment = url.fragment().filter(|f| !f.is_empty()).map(str::to_string);
		Ok((Self::new(origin.ascii_serialization(), url.path()), fragment))
	}

	pub fn origin(&self) -> &str {
		&self.origin
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	/// `origin + path + "#" + token`.
	pub fn share_url(&self, token: &Token) -> String {
		format!("{}{}#{}", self.origin, self.path, token)
	}
}

/// A share URL known to fit in a QR code at a given correction level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
	url: String,
	level: QrLevel,
}

impl QrPayload {
	pub fn new(url: impl Into<String>, level: QrLevel) -> Result<Self, ShareError> {
		let url = url.into();
		let max = level.max_bytes();
		if url.len() > max {
			return Err(ShareError::QrCapacity {
				len: url.len(),
				max,
				level,
			});
		}
		Ok(Self { url, level })
	}

	pub fn as_str(&self) -> &str {
		&self.url
	}

	pub fn level(&self) -> QrLevel {
		self.level
	}
}

/// Title from a `# Heading` opening the text, trimmed.
///
/// Only the start of the document counts. The whitespace after `#` may span
/// lines; the title is the rest of the line where it ends.
pub fn extract_title(text: &str) -> Option<&str> {
	let rest = text.strip_prefix('#')?;
	if !rest.starts_with(char::is_whitespace) {
		return None;
	}
	let title = rest.trim_start().lines().next()?.trim();
	(!title.is_empty()).then_some(title)
}

/// Window title: `"<heading> — mynota"`, or just `"mynota"`.
pub fn document_title(text: &str) -> String {
	match extract_title(text) {
		Some(title) => format!("{title} — {APP_TITLE}"),
		None => APP_TITLE.to_string(),
	}
}

/// Lowercases and collapses every run outside `[a-z0-9]` into one `-`,
/// trimming dashes at both ends.
pub fn slugify(title: &str) -> String {
	let mut slug = String::with_capacity(title.len());
	for c in title.to_lowercase().chars() {
		if c.is_ascii_lowercase() || c.is_ascii_digit() {
			slug.push(c);
		} else if !slug.ends_with('-') {
			slug.push('-');
		}
	}
	slug.trim_matches('-').to_string()
}

/// A document ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
	pub filename: String,
	pub contents: String,
}

impl Export {
	pub fn new(text: &str, default_name: &str) -> Self {
		Self {
			filename: export_filename(text, default_name),
			contents: text.to_string(),
		}
	}
}

/// `<slug>.txt`, from the first heading or else `default_name`.
pub fn export_filename(text: &str, default_name: &str) -> String {
	let slug = [extract_title(text), Some(default_name), Some(FALLBACK_EXPORT_NAME)]
		.into_iter()
		.flatten()
		.map(slugify)
		.find(|slug| !slug.is_empty())
		.unwrap_or_default();
	format!("{slug}.txt")
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn share_url_joins_location_and_token() {
		let location = Location::new("https://mynota.app", "/");
		let token = Token::from_fragment("y0jNyckHAA");
		assert_eq!(location.share_url(&token), "https://mynota.app/#y0jNyckHAA");
	}

	#[test]
	fn parse_splits_fragment() {
		let (location, fragment) = Location::parse("http://localhost:3000/notes#abc-_").unwrap();
		assert_eq!(location.origin(), "http://localhost:3000");
		assert_eq!(location.path(), "/notes");
		assert_eq!(fragment.as_deref(), Some("abc-_"));
	}

	#[test]
	fn parse_treats_empty_fragment_as_absent() {
		let (_, fragment) = Location::parse("https://mynota.app/#").unwrap();
		assert_eq!(fragment, None);
	}

	#[test]
	fn parse_rejects_opaque_origin() {
		assert!(matches!(
			Location::parse("data:text/plain,hi"),
			Err(ShareError::OpaqueOrigin(_))
		));
		assert!(matches!(Location::parse("not a url"), Err(ShareError::InvalidLocation(_))));
	}

	#[test]
	fn from_config_drops_trailing_slash_on_origin() {
		let config = ShareConfig {
			origin: "https://example.com/".into(),
			path: "/pad".into(),
			qr_level: QrLevel::M,
		};
		let location = Location::from_config(&config);
		assert_eq!(location.share_url(&Token::from_fragment("t")), "https://example.com/pad#t");
	}

	#[test]
	fn qr_payload_respects_capacity() {
		let fits = "a".repeat(QrLevel::H.max_bytes());
		assert!(QrPayload::new(fits.clone(), QrLevel::H).is_ok());

		let too_long = format!("{fits}a");
		let err = QrPayload::new(too_long, QrLevel::H).unwrap_err();
		assert!(matches!(err, ShareError::QrCapacity { len: 1274, max: 1273, level: QrLevel::H }));
	}

	#[test]
	fn title_from_leading_heading() {
		assert_eq!(extract_title("# Shopping List\n- eggs"), Some("Shopping List"));
		assert_eq!(extract_title("#\tSpaced Out  \nbody"), Some("Spaced Out"));
		assert_eq!(extract_title("#\n\n  Below\nbody"), Some("Below"));
		assert_eq!(extract_title("## Second level"), None);
		assert_eq!(extract_title("#hashtag"), None);
		assert_eq!(extract_title("#   "), None);
		assert_eq!(extract_title(""), None);
	}

	#[test]
	fn heading_after_intro_is_not_a_title() {
		let text = "intro\n# Later Heading";
		assert_eq!(extract_title(text), None);
		assert_eq!(document_title(text), "mynota");
		assert_eq!(export_filename(text, "mynota-document"), "mynota-document.txt");
	}

	#[test]
	fn document_title_falls_back_to_app_name() {
		assert_eq!(document_title("# Notes"), "Notes — mynota");
		assert_eq!(document_title("plain"), "mynota");
	}

	#[test]
	fn slugify_collapses_runs() {
		assert_eq!(slugify("  Hello, World!  "), "hello-world");
		assert_eq!(slugify("Q3 -- Roadmap (draft)"), "q3-roadmap-draft");
		assert_eq!(slugify("日本語"), "");
	}

	#[test]
	fn export_uses_heading_then_default() {
		assert_eq!(export_filename("# My Notes\nbody", "mynota-document"), "my-notes.txt");
		assert_eq!(export_filename("no heading", "mynota-document"), "mynota-document.txt");
		assert_eq!(export_filename("# 日本語", "Daily Log"), "daily-log.txt");
		assert_eq!(export_filename("# 日本語", "日記"), "mynota-document.txt");
	}

	#[test]
	fn export_keeps_text_verbatim() {
		let export = Export::new("# T\r\n\ttab", "x");
		assert_eq!(export.contents, "# T\r\n\ttab");
		assert_eq!(export.filename, "t.txt");
	}
}
