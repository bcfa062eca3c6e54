//! REST API client configuration.
//!
//! Fields with defaults can be omitted when loading from environment
//! variables. Only `base_url` is required.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the console's REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API server (e.g., "https://visitors.example.com").
    pub base_url: String,
    /// Protected endpoint whose status reveals whether the session cookie is
    /// valid. Point this at a dedicated "whoami" endpoint when the server has one.
    /// Default: "/api/dashboard/stats"
    #[serde(default = "default_probe_path")]
    pub probe_path: String,
    /// Default: "/api/auth/login"
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Default: "/api/auth/logout"
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
    /// Default: "/api/auth/register"
    #[serde(default = "default_register_path")]
    pub register_path: String,
    /// Upper bound for every request, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_probe_path() -> String {
    "/api/dashboard/stats".to_string()
}

fn default_login_path() -> String {
    "/api/auth/login".to_string()
}

fn default_logout_path() -> String {
    "/api/auth/logout".to_string()
}

fn default_register_path() -> String {
    "/api/auth/register".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl ApiConfig {
    /// Creates a configuration with default paths for the given server.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            probe_path: default_probe_path(),
            login_path: default_login_path(),
            logout_path: default_logout_path(),
            register_path: default_register_path(),
            timeout_ms: default_timeout_ms(),
        }
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s), a path does not
    /// start with `/`, or the timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "api.base_url".to_string(),
                reason: "must start with http:// or https://".to_string(),
            });
        }

        for (field, path) in [
            ("api.probe_path", &self.probe_path),
            ("api.login_path", &self.login_path),
            ("api.logout_path", &self.logout_path),
            ("api.register_path", &self.register_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: "must start with '/'".to_string(),
                });
            }
        }

        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "api.timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}
