//! Raw API responses and how the session layer reads them.

use serde_json::Value;

/// Status code and decoded JSON body of an API response.
///
/// Bodies that are empty or not JSON decode to `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// Returns true for a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the server's `success` flag, false when absent.
    #[must_use]
    pub fn success_flag(&self) -> bool {
        self.body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns the human-readable error message the server sent, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        error_message(&self.body)
    }
}

/// What a probe response says about the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeVerdict {
    /// 200, or 403 (authenticated but not allowed to read the probed resource).
    Authenticated,
    /// 401.
    Unauthenticated,
    /// Anything else; treated as not authenticated.
    Unexpected,
}

impl ProbeVerdict {
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            200 | 403 => Self::Authenticated,
            401 => Self::Unauthenticated,
            _ => Self::Unexpected,
        }
    }
}

/// Returns true if a logout response means the server session is gone.
///
/// 404 is tolerated as "already logged out".
#[must_use]
pub fn logout_acknowledged(status: u16) -> bool {
    (200..300).contains(&status) || status == 404
}

/// Extracts a human-readable error message from an error body.
///
/// Looks at `message`, then `error` (string), then `error.message`.
#[must_use]
pub fn error_message(body: &Value) -> Option<String> {
    let non_empty = |value: Option<&Value>| {
        value
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    non_empty(body.get("message"))
        .or_else(|| non_empty(body.get("error")))
        .or_else(|| non_empty(body.get("error").and_then(|e| e.get("message"))))
}
