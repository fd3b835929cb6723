//! Configuration for the Rentacar API client
//!
//! Supports environment-based configuration with sensible defaults.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Base URL used by the login call when none is configured
pub const DEFAULT_LOGIN_BASE_URL: &str = "http://localhost:3000";

/// Default per-request transport timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default field name carrying a car's brand id
pub const DEFAULT_BRAND_KEY: &str = "marcaId";

/// Environment types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local backend on the developer machine
    Development,
    /// Staging backend
    Staging,
    /// Production backend
    #[default]
    Production,
}

impl Environment {
    /// Parse from the `RENTACAR_ENV` environment variable
    pub fn from_env() -> Self {
        Self::parse(&env::var("RENTACAR_ENV").unwrap_or_default())
    }

    /// Parse a name, defaulting to production
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "development" | "dev" | "local" => Self::Development,
            "staging" | "stage" => Self::Staging,
            _ => Self::Production,
        }
    }
}

/// Name of the field a car uses to reference its brand
///
/// The backend contract is not settled (`marcaId`, `brandId` and `marca_id`
/// have all been seen), so the name is configuration rather than a constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandKey(String);

impl BrandKey {
    /// Use a specific field name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Field name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BrandKey {
    fn default() -> Self {
        Self(DEFAULT_BRAND_KEY.to_string())
    }
}

impl std::fmt::Display for BrandKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST backend; relative paths fail when unset
    pub base_url: Option<String>,
    /// Per-request transport timeout
    #[serde(with = "duration_secs", default = "default_timeout")]
    pub timeout: Duration,
    /// Field carrying a car's brand id
    #[serde(default)]
    pub brand_key: BrandKey,
    /// Current environment
    #[serde(default)]
    pub environment: Environment,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            brand_key: BrandKey::default(),
            environment: Environment::default(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables
    ///
    /// Reads the following environment variables:
    /// - `RENTACAR_API_BASE_URL`: Base URL of the backend (optional)
    /// - `RENTACAR_TIMEOUT_SECS`: Request timeout in seconds
    /// - `RENTACAR_BRAND_KEY`: Field name for a car's brand id
    /// - `RENTACAR_ENV`: Environment (development/staging/production)
    pub fn from_env() -> ApiResult<Self> {
        let environment = Environment::from_env();

        let base_url = env::var("RENTACAR_API_BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let timeout = match env::var("RENTACAR_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .map(Duration::from_secs)
                .map_err(|_| ApiError::config(format!("RENTACAR_TIMEOUT_SECS is not a number: {raw}")))?,
            Err(_) => DEFAULT_TIMEOUT,
        };

        let brand_key = env::var("RENTACAR_BRAND_KEY")
            .map(BrandKey::new)
            .unwrap_or_default();

        Ok(Self {
            base_url,
            timeout,
            brand_key,
            environment,
        })
    }

    /// Create development configuration (local backend)
    #[must_use]
    pub fn development() -> Self {
        Self {
            base_url: Some(DEFAULT_LOGIN_BASE_URL.to_string()),
            environment: Environment::Development,
            ..Self::default()
        }
    }

    /// Builder-style method to set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    /// Builder-style method to set timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style method to set the brand field name
    #[must_use]
    pub fn with_brand_key(mut self, key: impl Into<String>) -> Self {
        self.brand_key = BrandKey::new(key);
        self
    }

    /// Base URL the login call posts to
    #[must_use]
    pub fn login_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_LOGIN_BASE_URL)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ApiResult<()> {
        if let Some(ref url) = self.base_url {
            if url.is_empty() {
                return Err(ApiError::config("base_url cannot be empty"));
            }
            if !is_absolute(url) {
                return Err(ApiError::config("base_url must start with http:// or https://"));
            }
        }

        if self.timeout.is_zero() {
            return Err(ApiError::config("timeout cannot be zero"));
        }

        if self.brand_key.as_str().trim().is_empty() {
            return Err(ApiError::config("brand_key cannot be empty"));
        }

        Ok(())
    }
}

/// Whether `url` carries its own scheme
#[must_use]
pub fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.base_url.is_none());
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.brand_key.as_str(), "marcaId");
        assert_eq!(config.login_base_url(), DEFAULT_LOGIN_BASE_URL);
    }

    #[test]
    fn test_development_config() {
        let config = ClientConfig::development();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.environment, Environment::Development);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::default()
            .with_base_url("https://api.rentacar.test/")
            .with_timeout(Duration::from_secs(3))
            .with_brand_key("brandId");

        assert_eq!(config.base_url.as_deref(), Some("https://api.rentacar.test"));
        assert_eq!(config.login_base_url(), "https://api.rentacar.test");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.brand_key.to_string(), "brandId");
    }

    #[test]
    fn test_validation() {
        assert!(ClientConfig::default().validate().is_ok());
        assert!(ClientConfig::default().with_base_url("ftp://x").validate().is_err());
        assert!(ClientConfig::default().with_base_url("").validate().is_err());
        assert!(ClientConfig::default()
            .with_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(ClientConfig::default().with_brand_key(" ").validate().is_err());
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("dev"), Environment::Development);
        assert_eq!(Environment::parse("STAGE"), Environment::Staging);
        assert_eq!(Environment::parse(""), Environment::Production);
    }
}
