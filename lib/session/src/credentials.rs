//! Login credentials.
//!
//! The login form has a single identifier field. Input that looks like an
//! email address is sent as `email`, anything else as `mobile`.

use regex::Regex;
use serde_json::{Value, json};
use std::fmt;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// The identifier a user signs in with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Email(String),
    Mobile(String),
}

impl LoginIdentifier {
    /// Classifies raw form input as an email or a mobile number.
    #[must_use]
    pub fn sniff(input: &str) -> Self {
        let input = input.trim();
        if EMAIL_PATTERN.is_match(input) {
            Self::Email(input.to_string())
        } else {
            Self::Mobile(input.to_string())
        }
    }

    /// The request field this identifier is sent as.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Mobile(_) => "mobile",
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Email(value) | Self::Mobile(value) => value,
        }
    }
}

/// Identifier and password for a login request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    identifier: LoginIdentifier,
    password: String,
}

impl Credentials {
    /// Creates credentials, sniffing whether `identifier` is an email or a mobile number.
    #[must_use]
    pub fn new(identifier: &str, password: impl Into<String>) -> Self {
        Self::with_identifier(LoginIdentifier::sniff(identifier), password)
    }

    #[must_use]
    pub fn with_identifier(identifier: LoginIdentifier, password: impl Into<String>) -> Self {
        Self {
            identifier,
            password: password.into(),
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &LoginIdentifier {
        &self.identifier
    }

    /// The login request body: `{"email"|"mobile": ..., "password": ...}`.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let mut body = json!({ "password": self.password });
        body[self.identifier.field()] = Value::String(self.identifier.value().to_string());
        body
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}
