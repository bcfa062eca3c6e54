//! Session lifecycle and REST client for the gatehouse console.
//!
//! The [`SessionManager`] is the single owner of the signed-in identity. It
//! hydrates from an HttpOnly session cookie by probing a protected endpoint,
//! and exposes login, logout, registration and refresh. Everything else reads
//! the session through a [`SessionHandle`].
//!
//! The cookie itself lives in the [`ApiClient`]'s cookie store and is never
//! read by this crate.
//!
//! # Example
//!
//! ```no_run
//! use gatehouse_session::{ApiClient, ApiConfig, Credentials, HttpAuthBackend, SessionManager};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), rootcause::prelude::Report<gatehouse_session::ApiError>> {
//! let config = ApiConfig::new("http://localhost:5000");
//! let client = ApiClient::new(&config)?;
//! let backend = HttpAuthBackend::new(client, &config);
//! let manager = SessionManager::new(Arc::new(backend), config.timeout());
//!
//! let state = manager.hydrate().await;
//! if !state.is_authenticated() {
//!     let outcome = manager.login(&Credentials::new("desk@example.com", "secret"), false).await;
//!     println!("login succeeded: {}", outcome.is_success());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod credentials;
pub mod error;
pub mod manager;
pub mod response;

pub use api::ApiClient;
pub use backend::{AuthBackend, HttpAuthBackend};
pub use config::ApiConfig;
pub use credentials::{Credentials, LoginIdentifier};
pub use error::{ApiError, ConfigError};
pub use manager::{AuthOutcome, SessionHandle, SessionManager};
pub use response::{ApiResponse, ProbeVerdict};
