//! Authentication backend trait and its REST implementation.
//!
//! The session manager only talks to the backend through this trait, so
//! tests can script responses without a server.

use crate::api::ApiClient;
use crate::config::ApiConfig;
use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::response::ApiResponse;
use async_trait::async_trait;
use gatehouse_core::Result;
use reqwest::Method;
use serde_json::Value;

/// The authentication endpoints the session manager relies on.
///
/// Every method returns the raw response whatever its status; only
/// transport failures are errors.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Requests the protected probe endpoint.
    async fn probe(&self) -> Result<ApiResponse, ApiError>;

    /// Submits login credentials.
    async fn login(&self, credentials: &Credentials) -> Result<ApiResponse, ApiError>;

    /// Ends the server-side session.
    async fn logout(&self) -> Result<ApiResponse, ApiError>;

    /// Creates a new account.
    async fn register(&self, user_data: &Value) -> Result<ApiResponse, ApiError>;
}

/// [`AuthBackend`] over the console's REST API.
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    client: ApiClient,
    probe_path: String,
    login_path: String,
    logout_path: String,
    register_path: String,
}

impl HttpAuthBackend {
    /// Creates a backend sharing `client`'s cookie store.
    #[must_use]
    pub fn new(client: ApiClient, config: &ApiConfig) -> Self {
        Self {
            client,
            probe_path: config.probe_path.clone(),
            login_path: config.login_path.clone(),
            logout_path: config.logout_path.clone(),
            register_path: config.register_path.clone(),
        }
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn probe(&self) -> Result<ApiResponse, ApiError> {
        self.client.send(Method::GET, &self.probe_path, None).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<ApiResponse, ApiError> {
        let body = credentials.to_body();
        self.client
            .send(Method::POST, &self.login_path, Some(&body))
            .await
    }

    async fn logout(&self) -> Result<ApiResponse, ApiError> {
        self.client.send(Method::POST, &self.logout_path, None).await
    }

    async fn register(&self, user_data: &Value) -> Result<ApiResponse, ApiError> {
        self.client
            .send(Method::POST, &self.register_path, Some(user_data))
            .await
    }
}
