//! Role names and role requirements for console access control.
//!
//! Roles are plain names issued by the backend (`"super_admin"`, `"admin"`,
//! `"reception"`, `"user"`, ...). A [`RoleRequirement`] is attached to a
//! protected view or a navigation entry and is satisfied when the identity
//! holds *any* of the listed roles.

use crate::error::AccessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A role name assigned to a console user by the backend.
///
/// Role names are compared exactly (case-sensitive), the same way the
/// backend reports them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Full access to every tenant and every screen.
    pub const SUPER_ADMIN: &'static str = "super_admin";
    /// Administrator of a single company.
    pub const ADMIN: &'static str = "admin";
    /// Front-desk staff handling visitors and appointments.
    pub const RECEPTION: &'static str = "reception";
    /// Fallback role for identities whose server record carries no role name.
    pub const USER: &'static str = "user";

    /// Creates a role from a name.
    ///
    /// No validation is performed; use [`str::parse`] for untrusted input.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The fallback `"user"` role.
    #[must_use]
    pub fn user() -> Self {
        Self::new(Self::USER)
    }

    /// Returns the role name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(AccessError::InvalidRole {
                name: s.to_string(),
            });
        }
        Ok(Self(name.to_string()))
    }
}

impl From<&str> for Role {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Set of roles required to see a view or navigation entry.
///
/// Matching is a logical OR: any shared role satisfies the requirement.
/// The empty requirement means "any authenticated identity".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleRequirement {
    roles: Vec<Role>,
}

impl RoleRequirement {
    /// The empty requirement: any authenticated identity passes.
    #[must_use]
    pub fn any() -> Self {
        Self { roles: Vec::new() }
    }

    /// Creates a requirement from role names, dropping duplicates.
    #[must_use]
    pub fn of<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        let mut deduped: Vec<Role> = Vec::new();
        for role in roles.into_iter().map(Into::into) {
            if !deduped.contains(&role) {
                deduped.push(role);
            }
        }
        Self { roles: deduped }
    }

    /// Returns true if no role restriction applies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Returns the required roles as a slice.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Returns true if `held` satisfies this requirement.
    ///
    /// The empty requirement is always satisfied; otherwise at least one
    /// role must be shared.
    #[must_use]
    pub fn is_satisfied_by(&self, held: &[Role]) -> bool {
        self.is_empty() || self.roles.iter().any(|required| held.contains(required))
    }
}

impl From<Role> for RoleRequirement {
    fn from(role: Role) -> Self {
        Self { roles: vec![role] }
    }
}

impl From<&str> for RoleRequirement {
    fn from(role: &str) -> Self {
        Self::from(Role::new(role))
    }
}

impl From<String> for RoleRequirement {
    fn from(role: String) -> Self {
        Self::from(Role::from(role))
    }
}

impl<const N: usize> From<[&str; N]> for RoleRequirement {
    fn from(roles: [&str; N]) -> Self {
        Self::of(roles)
    }
}

impl From<&[&str]> for RoleRequirement {
    fn from(roles: &[&str]) -> Self {
        Self::of(roles.iter().copied())
    }
}

impl From<Vec<String>> for RoleRequirement {
    fn from(roles: Vec<String>) -> Self {
        Self::of(roles)
    }
}

impl From<Vec<Role>> for RoleRequirement {
    fn from(roles: Vec<Role>) -> Self {
        Self::of(roles)
    }
}

impl FromStr for RoleRequirement {
    type Err = AccessError;

    /// Parses a comma-separated list of role names. An empty string is the
    /// empty requirement.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let roles = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<Role>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::of(roles))
    }
}

impl fmt::Display for RoleRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("<any>");
        }
        let names: Vec<&str> = self.roles.iter().map(Role::as_str).collect();
        f.write_str(&names.join(","))
    }
}
