//! Console configuration.
//!
//! Loaded via the `config` crate from environment variables prefixed with
//! `GATEHOUSE`, using `__` to separate nested keys:
//!
//! ```text
//! GATEHOUSE__API__BASE_URL=http://localhost:5000
//! GATEHOUSE__ROUTES__LANDING_PATH=/dashboard
//! GATEHOUSE__CONSOLE__IDENTIFIER=desk@example.com
//! GATEHOUSE__CONSOLE__PASSWORD=secret
//! ```

use gatehouse_access::AccessGuard;
use gatehouse_session::{ApiConfig, ConfigError, Credentials};
use rootcause::prelude::Report;
use serde::Deserialize;

/// Console configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ConsoleConfig {
    /// REST API client configuration.
    pub api: ApiConfig,

    /// Client-side route configuration.
    #[serde(default)]
    pub routes: RoutesConfig,

    /// Optional sign-in performed by the console after hydration.
    #[serde(default)]
    pub console: LoginConfig,
}

/// Where the guard sends signed-out users and where a finished login lands.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_landing_path")]
    pub landing_path: String,
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_landing_path() -> String {
    "/dashboard".to_string()
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            landing_path: default_landing_path(),
        }
    }
}

impl RoutesConfig {
    #[must_use]
    pub fn guard(&self) -> AccessGuard {
        AccessGuard::new(&self.login_path, &self.landing_path)
    }
}

/// Credentials the console signs in with when the cookie did not hydrate.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginConfig {
    /// Email address or mobile number.
    pub identifier: Option<String>,
    pub password: Option<String>,
    /// Location to continue to after signing in, as carried by the
    /// login page's return-to parameter.
    pub return_to: Option<String>,
    /// Sign out again before exiting.
    #[serde(default)]
    pub logout_after: bool,
}

impl LoginConfig {
    /// Returns the configured credentials, if both halves are present.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.identifier, &self.password) {
            (Some(identifier), Some(password)) => Some(Credentials::new(identifier, password)),
            _ => None,
        }
    }
}

impl ConsoleConfig {
    /// Loads and validates configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, Report<ConfigError>> {
        let source = config::Environment::with_prefix("GATEHOUSE")
            .prefix_separator("__")
            .separator("__");
        Self::load(source)
    }

    fn load(source: config::Environment) -> Result<Self, Report<ConfigError>> {
        let config: Self = config::Config::builder()
            .add_source(source)
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| ConfigError::Load {
                details: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Checks that the loaded values are usable together.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first unusable field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;

        for (field, path) in [
            ("routes.login_path", &self.routes.login_path),
            ("routes.landing_path", &self.routes.landing_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    reason: "must start with '/'".to_string(),
                });
            }
        }

        if self.console.identifier.is_some() != self.console.password.is_some() {
            return Err(ConfigError::Invalid {
                field: "console.password".to_string(),
                reason: "identifier and password must be set together".to_string(),
            });
        }

        Ok(())
    }
}
