//! Integration tests for Settings config loading with layered merge semantics.
//!
//! These tests run without a global config (temp directories only),
//! so they test the local config file merging with defaults.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use dexsync::application::ApplicationError;
use dexsync::config::{RawSettings, Settings, SourceKind};

#[test]
fn given_local_config_when_load_then_overrides_only_specified_fields() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dexsync.toml");
    fs::write(
        &path,
        r#"
last_id = 151
batch_size = 10
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(path.as_path())).expect("load settings");

    assert_eq!(settings.last_id, 151);
    assert_eq!(settings.batch_size, 10);
    assert_eq!(settings.first_id, 1);
    assert_eq!(settings.api_base_url, "https://pokeapi.co/api/v2/");
}

#[test]
fn given_mirror_config_with_tilde_when_load_then_expands_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dexsync.toml");
    fs::write(
        &path,
        r#"
source = "mirror"
mirror_dir = "~/pokeapi-mirror"
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(path.as_path())).expect("load settings");

    let home = PathBuf::from(std::env::var("HOME").expect("HOME should be set"));
    assert_eq!(settings.source, SourceKind::Mirror);
    assert_eq!(settings.mirror_dir, Some(home.join("pokeapi-mirror")));
}

#[test]
fn given_invalid_toml_when_load_then_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dexsync.toml");
    fs::write(&path, "last_id = [").unwrap();

    let result = Settings::load(Some(path.as_path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_inverted_range_in_config_when_load_then_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("dexsync.toml");
    fs::write(&path, "first_id = 200\nlast_id = 100\n").unwrap();

    let result = Settings::load(Some(path.as_path()));

    assert!(matches!(result, Err(ApplicationError::Config { message }) if message.contains("first_id")));
}

#[test]
fn given_explicit_missing_file_when_load_then_config_error() {
    let temp = TempDir::new().unwrap();

    let result = Settings::load(Some(temp.path().join("absent.toml").as_path()));

    assert!(result.is_err());
}

#[test]
fn given_template_when_parsed_then_all_keys_commented_out() {
    let raw: RawSettings = toml::from_str(&Settings::template()).expect("parse template");

    assert_eq!(Settings::default().merge_with(&raw), Settings::default());
}
