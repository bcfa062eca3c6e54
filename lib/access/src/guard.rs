//! Access guard for protected console views.
//!
//! The guard holds no state of its own. For every render it looks at the
//! current [`SessionState`] and the view's [`RoleRequirement`] and picks one
//! of four outcomes. Checks run in a fixed order:
//!
//! 1. hydrating → loading (never redirect while the boot probe is in flight)
//! 2. unauthenticated → redirect to login, remembering the requested location
//! 3. authenticated but missing every required role → access denied
//! 4. otherwise → allow

use crate::error::AccessError;
use crate::role::RoleRequirement;
use crate::state::SessionState;
use std::fmt;

/// Query parameter carrying the originally requested location to the login page.
pub const RETURN_TO_PARAM: &str = "redirect";

/// An in-app location: a path with an optional query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    /// Parses an in-app location.
    ///
    /// The location must start with a single `/`. Scheme-relative (`//host`)
    /// and absolute URLs are rejected so a return-to value can never leave
    /// the console.
    pub fn parse(location: &str) -> Result<Self, AccessError> {
        let invalid = |reason: &str| AccessError::InvalidLocation {
            location: location.to_string(),
            reason: reason.to_string(),
        };

        if !location.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        if location.starts_with("//") || location.starts_with("/\\") {
            return Err(invalid("must not name another host"));
        }
        if location.contains("://") {
            return Err(invalid("must not contain a scheme"));
        }
        if location.chars().any(char::is_control) {
            return Err(invalid("must not contain control characters"));
        }
        Ok(Self(location.to_string()))
    }

    /// Returns the location as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path component, without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.0.split(['?', '#']).next().unwrap_or(&self.0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of guarding a protected view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session hydration is in flight; show a neutral loading affordance.
    Loading,
    /// No identity; navigate to the login page.
    RedirectToLogin {
        /// Full login URL including the return-to parameter.
        to: String,
        /// The location the user originally asked for.
        return_to: Location,
    },
    /// The identity is valid but lacks every required role.
    AccessDenied {
        /// The requirement that was not met.
        required: RoleRequirement,
    },
    /// Render the protected content.
    Allow,
}

impl GuardDecision {
    /// Returns true if the protected content may render.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decides loading / redirect / denied / allow for protected views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGuard {
    login_path: String,
    landing_path: String,
}

impl AccessGuard {
    /// Creates a guard that redirects to `login_path` and falls back to
    /// `landing_path` after login when no usable return-to location exists.
    #[must_use]
    pub fn new(login_path: impl Into<String>, landing_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            landing_path: landing_path.into(),
        }
    }

    /// Returns the login entry point.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Returns the default post-login destination.
    #[must_use]
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    /// Decides what a protected view renders for the current session.
    #[must_use]
    pub fn decide(
        &self,
        state: &SessionState,
        required: &RoleRequirement,
        requested: &Location,
    ) -> GuardDecision {
        let identity = match state {
            SessionState::Hydrating => return GuardDecision::Loading,
            SessionState::Unauthenticated => {
                return GuardDecision::RedirectToLogin {
                    to: self.login_url(requested),
                    return_to: requested.clone(),
                };
            }
            SessionState::Authenticated(identity) => identity,
        };

        if !required.is_empty() && !identity.has_role(required) {
            tracing::debug!(
                location = %requested,
                required = %required,
                role = %identity.role(),
                "access denied"
            );
            return GuardDecision::AccessDenied {
                required: required.clone(),
            };
        }

        GuardDecision::Allow
    }

    /// Builds the login URL carrying `return_to`.
    #[must_use]
    pub fn login_url(&self, return_to: &Location) -> String {
        format!(
            "{}?{}={}",
            self.login_path,
            RETURN_TO_PARAM,
            urlencoding::encode(return_to.as_str())
        )
    }

    /// Resolves where to send the user after a successful login.
    ///
    /// `raw` is the (still percent-encoded) value of the return-to
    /// parameter. Anything that does not decode to a valid in-app location,
    /// or that points back at the login page, resolves to the landing path.
    #[must_use]
    pub fn resolve_return_to(&self, raw: Option<&str>) -> String {
        raw.and_then(|raw| urlencoding::decode(raw).ok())
            .and_then(|decoded| Location::parse(&decoded).ok())
            .filter(|location| location.path() != self.login_path)
            .map_or_else(|| self.landing_path.clone(), |location| location.0)
    }
}

impl Default for AccessGuard {
    fn default() -> Self {
        Self::new("/login", "/dashboard")
    }
}
