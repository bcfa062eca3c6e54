//! Session lifecycle state shared by every gate.
//!
//! The identity lives inside the `Authenticated` variant, so "identity
//! present" and "authenticated" can never disagree and no partially
//! populated identity is observable.

use crate::identity::Identity;
use crate::role::RoleRequirement;
use std::sync::Arc;

/// Tri-state session lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// The boot-time probe is in flight. No access decision may be made.
    #[default]
    Hydrating,
    /// An identity is signed in.
    Authenticated(Arc<Identity>),
    /// No identity: the probe failed, or the user logged out.
    Unauthenticated,
}

impl SessionState {
    /// Returns true while the boot-time probe is in flight.
    #[must_use]
    pub fn is_hydrating(&self) -> bool {
        matches!(self, Self::Hydrating)
    }

    /// Returns true if an identity is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// Returns the signed-in identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity.as_ref()),
            Self::Hydrating | Self::Unauthenticated => None,
        }
    }

    /// Role predicate over the current identity.
    ///
    /// False without an identity; otherwise true iff the identity's roles
    /// intersect `required` (or `required` is empty).
    #[must_use]
    pub fn has_role(&self, required: impl Into<RoleRequirement>) -> bool {
        let required = required.into();
        self.identity()
            .is_some_and(|identity| identity.has_role(&required))
    }

    /// Short label used in logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Hydrating => "hydrating",
            Self::Authenticated(_) => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}

impl From<Identity> for SessionState {
    fn from(identity: Identity) -> Self {
        Self::Authenticated(Arc::new(identity))
    }
}

impl From<Option<Identity>> for SessionState {
    fn from(identity: Option<Identity>) -> Self {
        identity.map_or(Self::Unauthenticated, |identity| {
            Self::Authenticated(Arc::new(identity))
        })
    }
}
