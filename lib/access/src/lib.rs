//! Identity, session state and role-based access control for gatehouse.
//!
//! This crate provides:
//! - Role names and role requirements (`Role`, `RoleRequirement`)
//! - The normalized signed-in principal (`Identity`)
//! - The tri-state session lifecycle (`SessionState`)
//! - The access guard for protected views (`AccessGuard`, `GuardDecision`)
//! - Role filtering of the navigation tree (`visible_navigation`)
//! - The console's route table and sidebar (`console`)
//!
//! # Access Control Model
//!
//! Every identity holds exactly one role. A requirement lists the roles that
//! may see a view; holding any of them is enough, and an empty requirement
//! admits every signed-in identity.
//!
//! # Example
//!
//! ```
//! use gatehouse_access::{AccessGuard, GuardDecision, Identity, Location, RoleRequirement, SessionState};
//! use serde_json::json;
//!
//! let identity = Identity::from_record(&json!({
//!     "_id": "64f1c2a9",
//!     "name": "Front Desk",
//!     "role": { "name": "reception" }
//! }));
//! let state = SessionState::from(identity);
//!
//! let guard = AccessGuard::default();
//! let users = Location::parse("/users").unwrap();
//! let decision = guard.decide(&state, &RoleRequirement::from(["admin", "super_admin"]), &users);
//!
//! assert!(matches!(decision, GuardDecision::AccessDenied { .. }));
//! ```

pub mod console;
pub mod error;
pub mod guard;
pub mod identity;
pub mod nav;
pub mod role;
pub mod state;

// Re-export main types at crate root
pub use error::AccessError;
pub use guard::{AccessGuard, GuardDecision, Location, RETURN_TO_PARAM};
pub use identity::{Identity, extract_user_record};
pub use nav::{NavItem, NavSection, visible_navigation};
pub use role::{Role, RoleRequirement};
pub use state::SessionState;
