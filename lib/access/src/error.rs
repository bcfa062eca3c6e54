//! Error types for the access crate.
//!
//! Authorization failures are not errors here: an insufficiently privileged
//! identity is a normal guard outcome. These errors only cover malformed
//! input to the access-control types.

use std::fmt;

/// Errors from parsing access-control input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// A role name was empty or contained whitespace.
    InvalidRole { name: String },
    /// A location was not an in-app path.
    InvalidLocation { location: String, reason: String },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRole { name } => {
                write!(f, "invalid role name: '{name}'")
            }
            Self::InvalidLocation { location, reason } => {
                write!(f, "invalid location '{location}': {reason}")
            }
        }
    }
}

impl std::error::Error for AccessError {}
