//! Application-level configuration loading: CodinGame access and localization tables.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    dao::codingame::CodinGameConfig,
    localization::{LangFile, RawLangFile},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "CLASH_TRACKER_CONFIG_PATH";

#[derive(Debug, Clone, Default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// How to reach the CodinGame API.
    pub codingame: CodinGameConfig,
    /// Display strings used by embeds.
    pub lang: LangFile,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        base_url = %config.codingame.base_url,
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON configuration document.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    codingame: RawCodinGame,
    localization: RawLangFile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCodinGame {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = CodinGameConfig::default();
        Self {
            codingame: CodinGameConfig {
                base_url: value.codingame.base_url.unwrap_or(defaults.base_url),
                timeout: value
                    .codingame
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout),
            },
            lang: value.localization.into(),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localization::Localizer;

    #[test]
    fn empty_document_uses_defaults() {
        let config = AppConfig::parse("{}").unwrap();
        assert_eq!(config.codingame.base_url, "https://www.codingame.com");
        assert_eq!(config.codingame.timeout, Duration::from_secs(10));
        assert_eq!(config.lang.get("general_yes", 1), "Yes");
    }

    #[test]
    fn overrides_are_applied() {
        let config = AppConfig::parse(
            r#"{
                "codingame": {"base_url": "http://localhost:9000", "timeout_secs": 3},
                "localization": {"default_language": "de", "languages": {"de": {"general_yes": "Ja"}}}
            }"#,
        )
        .unwrap();
        assert_eq!(config.codingame.base_url, "http://localhost:9000");
        assert_eq!(config.codingame.timeout, Duration::from_secs(3));
        assert_eq!(config.lang.get("general_yes", 1), "Ja");
    }
}
