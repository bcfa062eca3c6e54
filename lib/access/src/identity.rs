//! The signed-in principal and its normalization from server payloads.
//!
//! The backend returns loosely shaped user records (`_id` or `id`, a nested
//! `role` object or a bare role string, ...). [`Identity::from_record`] is a
//! total mapping from any JSON value to a fully populated [`Identity`]: each
//! field has an ordered list of accepted source keys and a default, and the
//! role list is always exactly one element.

use crate::role::{Role, RoleRequirement};
use gatehouse_core::UserId;
use serde::Serialize;
use serde_json::Value;

const ID_KEYS: &[&str] = &["_id", "id", "userId"];
const NAME_KEYS: &[&str] = &["name", "fullName", "full_name", "username"];
const MOBILE_KEYS: &[&str] = &["mobile", "phone", "mobileNumber"];
const EMAIL_KEYS: &[&str] = &["email"];
const ROLE_NAME_KEYS: &[&str] = &["roleName", "role_name"];

/// The normalized, signed-in principal.
///
/// Fields the server omitted are empty strings; `roles` always holds
/// exactly one element equal to `role`. Only [`Identity::new`] and
/// [`Identity::from_record`] construct one, so it serializes but never
/// deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    id: UserId,
    name: String,
    mobile: String,
    email: String,
    role: Role,
    roles: Vec<Role>,
}

impl Identity {
    /// Creates an identity with the given primary role.
    #[must_use]
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        mobile: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            mobile: mobile.into(),
            email: email.into(),
            roles: vec![role.clone()],
            role,
        }
    }

    /// Normalizes a server user record.
    ///
    /// Accepted sources, first non-empty wins:
    /// - id: `_id`, `id`, `userId` (strings or numbers)
    /// - name: `name`, `fullName`, `full_name`, `username`
    /// - mobile: `mobile`, `phone`, `mobileNumber`
    /// - email: `email`
    /// - role: `role.name`, `role` (string), `roleName`, `role_name`, else `"user"`
    ///
    /// Non-object input yields an identity with empty fields and the
    /// `"user"` role.
    #[must_use]
    pub fn from_record(record: &Value) -> Self {
        let role = role_name(record)
            .map(Role::new)
            .unwrap_or_else(Role::user);

        Self::new(
            UserId::new(first_scalar(record, ID_KEYS).unwrap_or_default()),
            first_scalar(record, NAME_KEYS).unwrap_or_default(),
            first_scalar(record, MOBILE_KEYS).unwrap_or_default(),
            first_scalar(record, EMAIL_KEYS).unwrap_or_default(),
            role,
        )
    }

    /// Returns the server-assigned user ID.
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the mobile number.
    #[must_use]
    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the primary role.
    #[must_use]
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Returns the derived role list (always one element).
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Returns true if this identity satisfies `required`.
    #[must_use]
    pub fn has_role(&self, required: &RoleRequirement) -> bool {
        required.is_satisfied_by(&self.roles)
    }
}

/// Locates the user record inside a login or probe response body.
///
/// Looks at `data.user`, then `data` (when it is an object), then `user`.
#[must_use]
pub fn extract_user_record(body: &Value) -> Option<&Value> {
    if let Some(user) = body.get("data").and_then(|d| d.get("user"))
        && user.is_object()
    {
        return Some(user);
    }
    if let Some(data) = body.get("data")
        && data.is_object()
    {
        return Some(data);
    }
    body.get("user").filter(|user| user.is_object())
}

fn role_name(record: &Value) -> Option<String> {
    let nested = record
        .get("role")
        .and_then(|role| role.get("name"))
        .and_then(non_empty_scalar);
    if nested.is_some() {
        return nested;
    }

    let flat = record.get("role").and_then(non_empty_scalar);
    if flat.is_some() {
        return flat;
    }

    first_scalar(record, ROLE_NAME_KEYS)
}

fn first_scalar(record: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(non_empty_scalar)
}

fn non_empty_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
