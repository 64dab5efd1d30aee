//! Client configuration.

use std::time::Duration;

use url::Url;

use crate::error::{ApiError, Result};
use crate::navigation::DEFAULT_LOGIN_PATH;

/// Environment variable holding the Backend API base URL.
pub const ENV_API_BASE_URL: &str = "OTASUKE_API_BASE_URL";
/// Environment variable overriding the login entry point.
pub const ENV_LOGIN_PATH: &str = "OTASUKE_LOGIN_PATH";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "OTASUKE_REQUEST_TIMEOUT_SECS";

/// Base URL used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_USER_AGENT: &str = concat!("otasuke-client/", env!("CARGO_PKG_VERSION"));

/// Settings for an [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend API root. Every request path, including `/auth/refresh`, is
    /// appended to it.
    pub base_url: Url,
    /// Where to send the user when the session cannot be recovered.
    pub login_path: String,
    /// Per-request timeout. Zero disables the timeout.
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Load settings from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let base_url = std::env::var(ENV_API_BASE_URL)
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let mut config = Self::new(&base_url)?;

        if let Ok(path) = std::env::var(ENV_LOGIN_PATH) {
            config = config.with_login_path(path);
        }

        if let Ok(secs) = std::env::var(ENV_REQUEST_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ApiError::config(format!("{ENV_REQUEST_TIMEOUT_SECS} must be a number of seconds"))
            })?;
            config = config.with_request_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Resolve an API path (e.g. `/projects/42`) against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{joined}: {e}")))
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ApiError::config(format!(
            "unsupported API URL scheme '{other}' (expected http or https)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = ClientConfig::new("http://localhost:8000/api").unwrap();
        assert_eq!(
            config.endpoint("/auth/refresh").unwrap().as_str(),
            "http://localhost:8000/api/auth/refresh"
        );

        let config = ClientConfig::new("http://localhost:8000/api/").unwrap();
        assert_eq!(
            config.endpoint("projects").unwrap().as_str(),
            "http://localhost:8000/api/projects"
        );
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("https://example.com").unwrap();
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.user_agent.starts_with("otasuke-client/"));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(matches!(
            ClientConfig::new("ftp://example.com"),
            Err(ApiError::Configuration(_))
        ));
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
