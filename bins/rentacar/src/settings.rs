//! CLI settings file
//!
//! Looked up at `--config`, else the first of `rentacar.toml`,
//! `.rentacar.toml` and `.config/rentacar.toml` in the working directory.
//! Environment variables win over the file.

use anyhow::{Context, Result};
use rentacar_api_client::{ClientConfig, FileSessionStore};
use rentacar_telemetry::LogFormat;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Candidate file names, in lookup order
pub const CONFIG_CANDIDATES: &[&str] = &["rentacar.toml", ".rentacar.toml", ".config/rentacar.toml"];

/// Overrides the session file location
pub const SESSION_FILE_ENV: &str = "RENTACAR_SESSION_FILE";

/// Contents of `rentacar.toml`
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Backend base URL
    pub base_url: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Field name of a car's brand id
    pub brand_key: Option<String>,
    /// Where the session tokens are kept
    pub session_file: Option<PathBuf>,
    /// Log line layout
    pub log_format: LogFormat,
}

impl Settings {
    /// Load from `explicit`, else from the first candidate that exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        match CONFIG_CANDIDATES.iter().map(Path::new).find(|p| p.is_file()) {
            Some(path) => Self::read(path),
            None => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let settings = Self::parse(&raw).with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Parse TOML text
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Client configuration from the environment, gaps filled from the file
    pub fn client_config(&self) -> Result<ClientConfig> {
        let from_env = ClientConfig::from_env()?;
        let config = self.fill(from_env, |var| env::var_os(var).is_some());
        config.validate()?;
        Ok(config)
    }

    // `is_set` reports whether an environment variable was present.
    fn fill(&self, mut config: ClientConfig, is_set: impl Fn(&str) -> bool) -> ClientConfig {
        if config.base_url.is_none() {
            if let Some(ref url) = self.base_url {
                config = config.with_base_url(url.clone());
            }
        }
        if !is_set("RENTACAR_TIMEOUT_SECS") {
            if let Some(secs) = self.timeout_secs {
                config = config.with_timeout(Duration::from_secs(secs));
            }
        }
        if !is_set("RENTACAR_BRAND_KEY") {
            if let Some(ref key) = self.brand_key {
                config = config.with_brand_key(key.clone());
            }
        }
        config
    }

    /// Session file: env, then the file, then the per-user default
    pub fn session_path(&self) -> Result<PathBuf> {
        if let Some(path) = env::var_os(SESSION_FILE_ENV) {
            return Ok(PathBuf::from(path));
        }
        if let Some(ref path) = self.session_file {
            return Ok(path.clone());
        }
        Ok(FileSessionStore::default_path()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rentacar_api_client::BrandKey;

    #[test]
    fn test_parse_full_file() {
        let settings = Settings::parse(
            r#"
            base_url = "http://api.local:8080"
            timeout_secs = 3
            brand_key = "brandId"
            session_file = "/tmp/rentacar-session.json"
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(settings.base_url.as_deref(), Some("http://api.local:8080"));
        assert_eq!(settings.timeout_secs, Some(3));
        assert_eq!(settings.log_format, LogFormat::Json);
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!(Settings::parse("base_uri = \"x\"").is_err());
    }

    #[test]
    fn test_file_fills_gaps_left_by_env() {
        let settings = Settings {
            base_url: Some("http://file.local/".into()),
            timeout_secs: Some(4),
            brand_key: Some("brandId".into()),
            ..Settings::default()
        };

        let config = settings.fill(ClientConfig::default(), |_| false);
        assert_eq!(config.base_url.as_deref(), Some("http://file.local"));
        assert_eq!(config.timeout, Duration::from_secs(4));
        assert_eq!(config.brand_key, BrandKey::new("brandId"));
    }

    #[test]
    fn test_env_wins_over_file() {
        let settings = Settings {
            base_url: Some("http://file.local".into()),
            timeout_secs: Some(4),
            brand_key: Some("brandId".into()),
            ..Settings::default()
        };
        let from_env = ClientConfig::default()
            .with_base_url("http://env.local")
            .with_timeout(Duration::from_secs(20));

        let config = settings.fill(from_env, |var| var == "RENTACAR_TIMEOUT_SECS");
        assert_eq!(config.base_url.as_deref(), Some("http://env.local"));
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.brand_key, BrandKey::new("brandId"));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "brand_key = \"marca_id\"\n").unwrap();
        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.brand_key.as_deref(), Some("marca_id"));
    }
}
