//! Runtime configuration shared by the workflows and the CLI host.

use crate::error::{OnboardingError, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001/api/payments";
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:5173";
pub const DEFAULT_IDENTITY_KEY: &str = "providerAccountId";
pub const DEFAULT_REDIRECT_GRACE: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Base address of the backend that fronts the payment platform.
    pub api_base_url: Url,
    /// Where this application is served; inbound paths are resolved against it.
    pub app_base_url: Url,
    /// Store key under which the last known account id is kept.
    pub identity_key: String,
    /// How long the dashboard shows its notice before sending the user home.
    pub redirect_grace: Duration,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default API URL is valid"),
            app_base_url: Url::parse(DEFAULT_APP_BASE_URL).expect("default app URL is valid"),
            identity_key: DEFAULT_IDENTITY_KEY.to_string(),
            redirect_grace: DEFAULT_REDIRECT_GRACE,
        }
    }
}

impl OnboardingConfig {
    pub fn new(
        api_base_url: &str,
        app_base_url: &str,
        identity_key: impl Into<String>,
        redirect_grace: Duration,
    ) -> Result<Self> {
        let identity_key = identity_key.into();
        if identity_key.trim().is_empty() {
            return Err(OnboardingError::InvalidConfig {
                key: "identity_key".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(Self {
            api_base_url: parse_http_url("api_base_url", api_base_url)?,
            app_base_url: parse_http_url("app_base_url", app_base_url)?,
            identity_key,
            redirect_grace,
        })
    }

    pub fn with_api_base_url(mut self, api_base_url: &str) -> Result<Self> {
        self.api_base_url = parse_http_url("api_base_url", api_base_url)?;
        Ok(self)
    }

    pub fn with_redirect_grace(mut self, redirect_grace: Duration) -> Self {
        self.redirect_grace = redirect_grace;
        self
    }
}

fn parse_http_url(key: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| OnboardingError::InvalidConfig {
        key: key.to_string(),
        message: format!("'{}' is not a valid URL: {}", raw, e),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(OnboardingError::InvalidConfig {
            key: key.to_string(),
            message: format!("unsupported scheme '{}'", other),
        }),
    }
}
