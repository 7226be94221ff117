use std::path::Path;

use clap::Parser;
use mynota_sync::ShareError;
use pretty_assertions::assert_eq;

use super::*;

const CONFIG: &str = "[share]\norigin = \"https://notes.test\"\n";

/// A token produced by the browser build for "hello".
const BROWSER_HELLO: &str = "y0jNyckHAA";

fn hello_url() -> String {
	format!("https://notes.test/#{}\n", mynota_codec::encode("hello"))
}

async fn mynota(dir: &Path, args: &[&str]) -> Result<String> {
	let config = dir.join("config.toml");
	if !config.exists() {
		std::fs::write(&config, CONFIG).unwrap();
	}
	let store = dir.join("store");
	let mut argv = vec![
		"mynota".to_string(),
		"--config".to_string(),
		config.display().to_string(),
		"--store".to_string(),
		store.display().to_string(),
	];
	argv.extend(args.iter().map(|a| a.to_string()));

	let mut out = Vec::new();
	run(Cli::try_parse_from(argv).unwrap(), &mut out).await?;
	Ok(String::from_utf8(out).unwrap())
}

fn write_note(dir: &Path, name: &str, text: &str) -> String {
	let path = dir.join(name);
	std::fs::write(&path, text).unwrap();
	path.display().to_string()
}

#[tokio::test]
async fn encode_and_decode_share_url() {
	let dir = tempfile::tempdir().unwrap();
	let note = write_note(dir.path(), "note.txt", "hello");

	let token = mynota(dir.path(), &["encode", &note]).await.unwrap();
	assert_eq!(token, format!("{}\n", mynota_codec::encode("hello")));

	let url = format!("https://notes.test/#{}", token.trim_end());
	assert_eq!(mynota(dir.path(), &["decode", &url]).await.unwrap(), "hello");
	assert_eq!(mynota(dir.path(), &["decode", BROWSER_HELLO]).await.unwrap(), "hello");
}

#[tokio::test]
async fn decode_rejects_garbage() {
	let dir = tempfile::tempdir().unwrap();
	assert!(mynota(dir.path(), &["decode", "!!!"]).await.is_err());
}

#[tokio::test]
async fn stats_reports_counters() {
	let dir = tempfile::tempdir().unwrap();
	let note = write_note(dir.path(), "note.txt", "one two\nthree");

	let out = mynota(dir.path(), &["stats", &note]).await.unwrap();
	assert!(out.contains("words   3\n"), "{out}");
	assert!(out.contains("lines   2\n"), "{out}");
	assert!(out.contains("size    13 B\n"), "{out}");
}

#[tokio::test]
async fn share_uses_configured_origin() {
	let dir = tempfile::tempdir().unwrap();
	let note = write_note(dir.path(), "note.txt", "hello");

	let out = mynota(dir.path(), &["share", "--qr", &note]).await.unwrap();
	assert_eq!(out, hello_url());
}

#[tokio::test]
async fn share_qr_rejects_oversized_link() {
	let dir = tempfile::tempdir().unwrap();
	// Poorly compressible text so the token outgrows a QR code.
	let mut seed = 0x2545_f491_u32;
	let text: String = (0..6000)
		.map(|_| {
			seed ^= seed << 13;
			seed ^= seed >> 17;
			seed ^= seed << 5;
			char::from(b'!' + (seed % 90) as u8)
		})
		.collect();
	let note = write_note(dir.path(), "noise.txt", &text);

	assert!(mynota(dir.path(), &["share", &note]).await.is_ok());
	let err = mynota(dir.path(), &["share", "--qr", &note]).await.unwrap_err();
	assert!(matches!(err.downcast_ref::<ShareError>(), Some(ShareError::QrCapacity { .. })));
}

#[tokio::test]
async fn export_names_file_after_heading() {
	let dir = tempfile::tempdir().unwrap();
	let note = write_note(dir.path(), "note.txt", "# Trip Plan!\nday one");
	let out_dir = dir.path().join("exports");

	let out = mynota(dir.path(), &["export", &note, "--out-dir", &out_dir.display().to_string()])
		.await
		.unwrap();

	let path = out_dir.join("trip-plan.txt");
	assert_eq!(out.trim_end(), path.display().to_string());
	assert_eq!(std::fs::read_to_string(path).unwrap(), "# Trip Plan!\nday one");
}

#[tokio::test]
async fn open_without_session_welcomes() {
	let dir = tempfile::tempdir().unwrap();
	assert_eq!(mynota(dir.path(), &["open"]).await.unwrap(), format!("{WELCOME}\n"));
}

#[tokio::test]
async fn save_then_open_round_trips() {
	let dir = tempfile::tempdir().unwrap();
	let note = write_note(dir.path(), "note.txt", "hello");

	let saved = mynota(dir.path(), &["save", &note]).await.unwrap();
	assert_eq!(saved, hello_url());
	assert_eq!(mynota(dir.path(), &["open"]).await.unwrap(), saved);
}

#[tokio::test]
async fn open_adopts_shared_link() {
	let dir = tempfile::tempdir().unwrap();
	let note = write_note(dir.path(), "note.txt", "my draft");
	mynota(dir.path(), &["save", &note]).await.unwrap();

	let link = format!("https://friend.test/n#{BROWSER_HELLO}");
	let out = mynota(dir.path(), &["open", &link]).await.unwrap();
	assert_eq!(out, format!("{link}\n"));

	// The shared note replaced the local draft.
	assert_eq!(mynota(dir.path(), &["open"]).await.unwrap(), hello_url());
}

#[tokio::test]
async fn open_with_broken_link_keeps_draft() {
	let dir = tempfile::tempdir().unwrap();
	let note = write_note(dir.path(), "note.txt", "hello");
	mynota(dir.path(), &["save", &note]).await.unwrap();

	let out = mynota(dir.path(), &["open", "https://notes.test/#!!!"]).await.unwrap();
	assert_eq!(out, hello_url());
}

#[tokio::test]
async fn new_discards_session() {
	let dir = tempfile::tempdir().unwrap();
	let note = write_note(dir.path(), "note.txt", "hello");
	mynota(dir.path(), &["save", &note]).await.unwrap();

	assert_eq!(mynota(dir.path(), &["new"]).await.unwrap(), "");
	assert_eq!(mynota(dir.path(), &["open"]).await.unwrap(), format!("{WELCOME}\n"));
}

#[test]
fn export_to_falls_back_to_default_name() {
	let dir = tempfile::tempdir().unwrap();
	let path = export_to(dir.path(), "no heading here", "Weekly Notes").unwrap();
	assert_eq!(path, dir.path().join("weekly-notes.txt"));
}
