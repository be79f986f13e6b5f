//! Tool settings: defaults, global config file, environment and CLI overrides

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::ConfigResult;
use paxly_core::error::PaxlyError;

/// Prefix of environment variables read as overrides
pub const ENV_PREFIX: &str = "PAXLY_";

/// Resolved tool settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Per-lookup timeout in seconds, 0 disables it
    pub lookup_timeout_secs: u64,
    /// How long fetched version lists stay fresh
    pub version_cache_ttl_secs: u64,
    /// Environment used when `--env` is not given
    pub default_environment: String,
    /// Manifest file name searched for from the working directory upward
    pub manifest_file: String,
    /// crates.io sparse index base URL
    pub crates_index_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lookup_timeout_secs: 60,
            version_cache_ttl_secs: 300,
            default_environment: "development".to_string(),
            manifest_file: crate::loader::MANIFEST_FILE.to_string(),
            crates_index_url: "https://index.crates.io".to_string(),
        }
    }
}

impl Settings {
    /// Lookup timeout, or `None` when disabled
    pub fn lookup_timeout(&self) -> Option<Duration> {
        (self.lookup_timeout_secs > 0).then(|| Duration::from_secs(self.lookup_timeout_secs))
    }

    pub fn version_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.version_cache_ttl_secs)
    }
}

/// Parse settings from TOML content
pub fn parse_settings(content: &str) -> ConfigResult<Settings> {
    toml::from_str(content).map_err(|e| PaxlyError::ManifestParse {
        path: "config.toml".to_string(),
        message: e.to_string(),
    })
}

/// Path of the global settings file, `~/.paxly/config.toml`
pub fn global_settings_path() -> ConfigResult<Utf8PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| PaxlyError::ConfigValidation {
        field: "home_dir".to_string(),
        reason: "Could not determine home directory".to_string(),
    })?;

    let home = Utf8PathBuf::try_from(home_dir).map_err(|e| PaxlyError::ConfigValidation {
        field: "home_dir".to_string(),
        reason: format!("Invalid home directory path: {}", e),
    })?;

    Ok(home.join(".paxly").join("config.toml"))
}

/// Load settings from a file if it exists
pub async fn load_settings_file(path: &Utf8Path) -> ConfigResult<Option<Settings>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => {
            debug!("Loaded settings from {}", path);
            parse_settings(&content)
                .map(Some)
                .map_err(|e| match e {
                    PaxlyError::ManifestParse { message, .. } => PaxlyError::ManifestParse {
                        path: path.to_string(),
                        message,
                    },
                    other => other,
                })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PaxlyError::io(format!("Failed to read {}", path), e)),
    }
}

/// Load the global settings file, if any
pub async fn load_global_settings() -> ConfigResult<Option<Settings>> {
    let path = global_settings_path()?;
    load_settings_file(&path).await
}

/// Settings layering: defaults < global file < environment < CLI flags
pub struct SettingsLayering;

impl SettingsLayering {
    /// Merge all layers into the effective settings
    pub fn merge(
        global: Option<Settings>,
        env_overrides: &HashMap<String, String>,
        cli_overrides: &HashMap<String, String>,
    ) -> ConfigResult<Settings> {
        let mut merged = global.unwrap_or_default();

        Self::apply_env_overrides(&mut merged, env_overrides)?;
        Self::apply_cli_overrides(&mut merged, cli_overrides)?;

        Ok(merged)
    }

    /// Apply `PAXLY_*` environment variable overrides
    fn apply_env_overrides(settings: &mut Settings, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "PAXLY_LOOKUP_TIMEOUT" => {
                    settings.lookup_timeout_secs = parse_secs(key, value)?;
                }
                "PAXLY_CACHE_TTL" => {
                    settings.version_cache_ttl_secs = parse_secs(key, value)?;
                }
                "PAXLY_ENV" => {
                    settings.default_environment = value.clone();
                }
                "PAXLY_MANIFEST" => {
                    settings.manifest_file = value.clone();
                }
                "PAXLY_CRATES_INDEX" => {
                    settings.crates_index_url = value.clone();
                }
                _ => {
                    // Unknown environment variable, ignore
                }
            }
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(settings: &mut Settings, overrides: &HashMap<String, String>) -> ConfigResult<()> {
        for (key, value) in overrides {
            match key.as_str() {
                "timeout" => {
                    settings.lookup_timeout_secs = parse_secs("--timeout", value)?;
                }
                "env" => {
                    settings.default_environment = value.clone();
                }
                "manifest" => {
                    settings.manifest_file = value.clone();
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars().filter(|(key, _)| key.starts_with(ENV_PREFIX)).collect()
    }
}

fn parse_secs(field: &str, value: &str) -> ConfigResult<u64> {
    value.trim().parse().map_err(|e| PaxlyError::ConfigValidation {
        field: field.to_string(),
        reason: format!("Expected a number of seconds, got '{}': {}", value, e),
    })
}
