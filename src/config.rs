//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dexsync/dexsync.toml`
//! 3. Local config: `./dexsync.toml`, or the file given with `--config`
//! 4. Environment variables: `DEXSYNC_*` prefix

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Where documents are fetched from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Live API over HTTP
    #[default]
    Http,
    /// Local directory mirror of the API
    Mirror,
}

/// Raw settings for intermediate parsing (all optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub api_base_url: Option<String>,
    pub source: Option<SourceKind>,
    pub mirror_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub move_output: Option<PathBuf>,
    pub type_output: Option<PathBuf>,
    pub first_id: Option<u32>,
    pub last_id: Option<u32>,
    pub batch_size: Option<usize>,
    pub request_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

/// Unified configuration for dexsync.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// API root, resource paths are appended to it
    pub api_base_url: String,
    /// Document source
    pub source: SourceKind,
    /// Mirror directory (required when source = "mirror")
    pub mirror_dir: Option<PathBuf>,
    /// Pokemon record table file
    pub output: PathBuf,
    /// Move table file
    pub move_output: PathBuf,
    /// Type table file
    pub type_output: PathBuf,
    /// First species id to ingest
    pub first_id: u32,
    /// Last species id to ingest (inclusive)
    pub last_id: u32,
    /// Commit the store every N ids
    pub batch_size: usize,
    /// Pause after each successful HTTP response
    pub request_delay_ms: u64,
    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://pokeapi.co/api/v2/".into(),
            source: SourceKind::Http,
            mirror_dir: None,
            output: PathBuf::from("pokemon_data.json"),
            move_output: PathBuf::from("moves_data.json"),
            type_output: PathBuf::from("types_data.json"),
            first_id: 1,
            last_id: 1025,
            batch_size: 50,
            request_delay_ms: 100,
            request_timeout_secs: 10,
        }
    }
}

/// Get the XDG config directory for dexsync.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dexsync").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("dexsync.toml"))
}

/// Get the path to the local config file in the working directory.
pub fn local_config_path() -> PathBuf {
    PathBuf::from("dexsync.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}` in a path.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.output = expand_path(&self.output);
        self.move_output = expand_path(&self.move_output);
        self.type_output = expand_path(&self.type_output);
        self.mirror_dir = self.mirror_dir.as_deref().map(expand_path);
    }

    /// Merge overlay config onto self (base). Overlay wins where specified.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            api_base_url: overlay
                .api_base_url
                .clone()
                .unwrap_or_else(|| self.api_base_url.clone()),
            source: overlay.source.unwrap_or(self.source),
            mirror_dir: overlay
                .mirror_dir
                .clone()
                .or_else(|| self.mirror_dir.clone()),
            output: overlay.output.clone().unwrap_or_else(|| self.output.clone()),
            move_output: overlay
                .move_output
                .clone()
                .unwrap_or_else(|| self.move_output.clone()),
            type_output: overlay
                .type_output
                .clone()
                .unwrap_or_else(|| self.type_output.clone()),
            first_id: overlay.first_id.unwrap_or(self.first_id),
            last_id: overlay.last_id.unwrap_or(self.last_id),
            batch_size: overlay.batch_size.unwrap_or(self.batch_size),
            request_delay_ms: overlay.request_delay_ms.unwrap_or(self.request_delay_ms),
            request_timeout_secs: overlay
                .request_timeout_secs
                .unwrap_or(self.request_timeout_secs),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_config` - Explicit local config file; defaults to `./dexsync.toml` if present
    ///
    /// # Errors
    /// A config file that exists but cannot be parsed, an unparsable
    /// `DEXSYNC_*` value, or settings that fail validation.
    pub fn load(local_config: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Local config: an explicit path must exist
        match local_config {
            Some(path) => current = current.merge_with(&load_raw_settings(path)?),
            None => {
                let path = local_config_path();
                if path.exists() {
                    current = current.merge_with(&load_raw_settings(&path)?);
                }
            }
        }

        // 4. Environment variables
        current = Self::apply_env_overrides(current, Self::env_source())?;

        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    fn env_source() -> Environment {
        Environment::with_prefix("DEXSYNC")
            .prefix_separator("_")
            .separator("__")
    }

    /// Apply DEXSYNC_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        let overlay = RawSettings {
            api_base_url: env_value(&config, "api_base_url")?,
            source: env_value(&config, "source")?,
            mirror_dir: env_value(&config, "mirror_dir")?,
            output: env_value(&config, "output")?,
            move_output: env_value(&config, "move_output")?,
            type_output: env_value(&config, "type_output")?,
            first_id: env_value(&config, "first_id")?,
            last_id: env_value(&config, "last_id")?,
            batch_size: env_value(&config, "batch_size")?,
            request_delay_ms: env_value(&config, "request_delay_ms")?,
            request_timeout_secs: env_value(&config, "request_timeout_secs")?,
        };
        Ok(settings.merge_with(&overlay))
    }

    /// Reject settings the ingestion cannot run with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let fail = |message: String| -> Result<(), ApplicationError> {
            Err(ApplicationError::Config { message })
        };

        if self.first_id == 0 {
            return fail("first_id must be at least 1".into());
        }
        if self.first_id > self.last_id {
            return fail(format!(
                "first_id ({}) is greater than last_id ({})",
                self.first_id, self.last_id
            ));
        }
        if self.batch_size == 0 {
            return fail("batch_size must be at least 1".into());
        }
        if self.source == SourceKind::Mirror && self.mirror_dir.is_none() {
            return fail("source = \"mirror\" requires mirror_dir".into());
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# dexsync configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/dexsync/dexsync.toml
#   Local:  ./dexsync.toml (or --config <file>)
#   Env:    DEXSYNC_* environment variables (e.g. DEXSYNC_LAST_ID=151)

# API root
# api_base_url = "https://pokeapi.co/api/v2/"

# Document source: "http" or "mirror"
# source = "http"

# Directory holding a mirror of the API (pokemon/1.json, pokemon-species/1.json, ...)
# mirror_dir = "~/pokeapi-mirror"

# Table files
# output = "pokemon_data.json"
# move_output = "moves_data.json"
# type_output = "types_data.json"

# Species id range (inclusive)
# first_id = 1
# last_id = 1025

# Commit the store every N ids
# batch_size = 50

# HTTP politeness delay and timeout
# request_delay_ms = 100
# request_timeout_secs = 10
"#
        .to_string()
    }
}

/// Read an optional typed value; absent keys are `None`, bad values are errors.
fn env_value<T: DeserializeOwned>(config: &Config, key: &str) -> Result<Option<T>, ApplicationError> {
    match config.get::<T>(key) {
        Ok(value) => Ok(Some(value)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::env_source().source(Some(map))
    }

    #[test]
    fn given_no_overrides_when_defaults_then_targets_pokeapi() {
        let settings = Settings::default();
        assert_eq!(settings.api_base_url, "https://pokeapi.co/api/v2/");
        assert_eq!(settings.batch_size, 50);
        assert_eq!(settings.source, SourceKind::Http);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn given_env_vars_when_applying_overrides_then_replace_values() {
        let settings = Settings::apply_env_overrides(
            Settings::default(),
            env(&[
                ("DEXSYNC_LAST_ID", "151"),
                ("DEXSYNC_SOURCE", "mirror"),
                ("DEXSYNC_MIRROR_DIR", "/tmp/mirror"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.last_id, 151);
        assert_eq!(settings.source, SourceKind::Mirror);
        assert_eq!(settings.mirror_dir, Some(PathBuf::from("/tmp/mirror")));
        assert_eq!(settings.first_id, 1);
    }

    #[test]
    fn given_table_env_vars_when_applying_overrides_then_move_and_type_paths_replaced() {
        let settings = Settings::apply_env_overrides(
            Settings::default(),
            env(&[
                ("DEXSYNC_MOVE_OUTPUT", "/tmp/moves.json"),
                ("DEXSYNC_TYPE_OUTPUT", "/tmp/types.json"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.move_output, PathBuf::from("/tmp/moves.json"));
        assert_eq!(settings.type_output, PathBuf::from("/tmp/types.json"));
        assert_eq!(settings.output, PathBuf::from("pokemon_data.json"));
    }

    #[test]
    fn given_unparsable_env_var_when_applying_overrides_then_errors() {
        let result = Settings::apply_env_overrides(
            Settings::default(),
            env(&[("DEXSYNC_BATCH_SIZE", "lots")]),
        );
        assert!(matches!(result, Err(ApplicationError::Config { .. })));
    }

    #[test]
    fn given_tilde_in_output_when_expand_paths_then_expands_to_home() {
        let mut settings = Settings {
            output: PathBuf::from("~/dex/pokemon.json"),
            mirror_dir: Some(PathBuf::from("$HOME/mirror")),
            ..Settings::default()
        };

        settings.expand_paths();

        let home = std::env::var("HOME").expect("HOME should be set");
        assert!(settings.output.to_string_lossy().starts_with(&home));
        assert!(settings
            .mirror_dir
            .as_ref()
            .unwrap()
            .to_string_lossy()
            .starts_with(&home));
    }

    #[test]
    fn given_inverted_range_when_validating_then_errors() {
        let settings = Settings {
            first_id: 10,
            last_id: 5,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn given_mirror_without_dir_when_validating_then_errors() {
        let settings = Settings {
            source: SourceKind::Mirror,
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn given_settings_when_to_toml_then_round_trips_through_raw() {
        let toml_text = Settings::default().to_toml().unwrap();
        let raw: RawSettings = toml::from_str(&toml_text).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), Settings::default());
    }
}
