use clap::Parser;
use pretty_assertions::assert_eq;

use super::*;

fn parse(args: &[&str]) -> Cli {
	Cli::try_parse_from(std::iter::once("mynota").chain(args.iter().copied())).unwrap()
}

#[test]
fn encode_file_is_optional() {
	assert_eq!(parse(&["encode"]).command, Command::Encode { file: None });
	assert_eq!(
		parse(&["encode", "note.md"]).command,
		Command::Encode {
			file: Some(PathBuf::from("note.md"))
		}
	);
}

#[test]
fn share_qr_flag() {
	assert_eq!(
		parse(&["share", "--qr"]).command,
		Command::Share { file: None, qr: true }
	);
}

#[test]
fn export_out_dir_defaults_to_cwd() {
	let Command::Export { out_dir, .. } = parse(&["export", "a.md"]).command else {
		panic!("expected export");
	};
	assert_eq!(out_dir, PathBuf::from("."));
}

#[test]
fn global_flags_after_subcommand() {
	let cli = parse(&["new", "--store", "/tmp/notes", "-v"]);
	assert_eq!(cli.command, Command::New);
	assert_eq!(cli.store, Some(PathBuf::from("/tmp/notes")));
	assert!(cli.verbose);
}

#[test]
fn save_requires_file() {
	assert!(Cli::try_parse_from(["mynota", "save"]).is_err());
}

#[test]
fn token_arg_accepts_all_forms() {
	assert_eq!(token_arg("y0jNyckHAA").unwrap(), "y0jNyckHAA");
	assert_eq!(token_arg("#y0jNyckHAA").unwrap(), "y0jNyckHAA");
	assert_eq!(token_arg("https://mynota.app/#y0jNyckHAA").unwrap(), "y0jNyckHAA");
	assert_eq!(token_arg("https://mynota.app/").unwrap(), "");
}

