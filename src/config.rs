use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const ENV_API_URL: &str = "STOREFRONT_API_URL";
pub const ENV_API_TIMEOUT_MS: &str = "STOREFRONT_API_TIMEOUT_MS";
pub const ENV_API_TOKEN: &str = "STOREFRONT_API_TOKEN";

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_USER_AGENT: &str = "StorefrontCatalog/0.1";

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub api_base_url: Url,
    pub timeout: Duration,
    pub auth_token: Option<String>,
    pub user_agent: String,
}

impl CatalogConfig {
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_base_url(api_base_url)?,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            auth_token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = env::var(ENV_API_URL).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Self::new(&api_url)?;

        if let Ok(raw) = env::var(ENV_API_TIMEOUT_MS) {
            config.timeout = parse_timeout_ms(&raw)?;
        }
        config.auth_token = env::var(ENV_API_TOKEN).ok().filter(|t| !t.trim().is_empty());

        Ok(config)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// `<base>/<path>` with exactly one slash between them.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        source,
    })
}

pub fn parse_timeout_ms(raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidTimeout(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        let config = CatalogConfig::new("http://localhost:5000/api/").unwrap();
        assert_eq!(config.endpoint("/products"), "http://localhost:5000/api/products");
        assert_eq!(config.endpoint("brands"), "http://localhost:5000/api/brands");
    }

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::new(DEFAULT_API_URL).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(matches!(
            CatalogConfig::new("not a url"),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            parse_timeout_ms("ten"),
            Err(ConfigError::InvalidTimeout(_))
        ));
        assert_eq!(parse_timeout_ms(" 2500 ").unwrap(), Duration::from_millis(2500));
    }
}
