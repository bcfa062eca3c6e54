//! REST API client shared by the session manager and the console screens.
//!
//! One `reqwest` client with a cookie store carries the server's HttpOnly
//! session cookie across every request; nothing here reads or writes the
//! cookie itself.

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::response::ApiResponse;
use reqwest::Method;
use rootcause::prelude::Report;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

/// Thin JSON client over the console's REST API.
///
/// Cloning is cheap and clones share the cookie store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the configured server.
    pub fn new(config: &ApiConfig) -> Result<Self, Report<ApiError>> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout())
            .build()
            .map_err(ApiError::from)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and returns the status and body whatever the status.
    ///
    /// Only transport failures are errors here; callers decide what each
    /// status means.
    #[instrument(skip(self, method, body), fields(method = %method))]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, Report<ApiError>> {
        let mut request = self.http.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(ApiError::from)?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        debug!(status, "api response");

        Ok(ApiResponse::new(status, body))
    }

    /// GETs a JSON resource.
    ///
    /// # Errors
    ///
    /// 401 becomes [`ApiError::Unauthorized`], any other non-2xx status
    /// [`ApiError::Status`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Report<ApiError>> {
        let response = self.send(Method::GET, path, None).await?;
        decode(path, response)
    }

    /// POSTs a JSON body and decodes the JSON response.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Report<ApiError>> {
        let body = encode(body)?;
        let response = self.send(Method::POST, path, Some(&body)).await?;
        decode(path, response)
    }

    /// PUTs a JSON body and decodes the JSON response.
    pub async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Report<ApiError>> {
        let body = encode(body)?;
        let response = self.send(Method::PUT, path, Some(&body)).await?;
        decode(path, response)
    }

    /// DELETEs a resource.
    pub async fn delete(&self, path: &str) -> Result<(), Report<ApiError>> {
        let response = self.send(Method::DELETE, path, None).await?;
        check_status(path, &response)?;
        Ok(())
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode {
        details: e.to_string(),
    })
}

fn check_status(path: &str, response: &ApiResponse) -> Result<(), ApiError> {
    if response.status == 401 {
        return Err(ApiError::Unauthorized {
            path: path.to_string(),
        });
    }
    if !response.is_success() {
        return Err(ApiError::Status {
            path: path.to_string(),
            status: response.status,
            message: response.error_message().unwrap_or_default(),
        });
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(path: &str, response: ApiResponse) -> Result<T, Report<ApiError>> {
    check_status(path, &response)?;
    let decoded = serde_json::from_value(response.body).map_err(|e| ApiError::Decode {
        details: e.to_string(),
    })?;
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::Path,
        http::StatusCode,
        routing::{get, post},
    };
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Company {
        name: String,
    }

    async fn serve(router: Router) -> ApiClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve");
        });
        ApiClient::new(&ApiConfig::new(format!("http://{addr}/"))).expect("client")
    }

    #[test]
    fn url_joins_without_double_slash() {
        let client = ApiClient::new(&ApiConfig::new("http://localhost:5000/")).expect("client");
        assert_eq!(client.url("/api/auth/login"), "http://localhost:5000/api/auth/login");
    }

    #[tokio::test]
    async fn get_json_decodes_success() {
        let client = serve(Router::new().route(
            "/api/companies/1",
            get(|| async { Json(json!({ "name": "Acme" })) }),
        ))
        .await;

        let company: Company = client.get_json("/api/companies/1").await.expect("get");
        assert_eq!(
            company,
            Company {
                name: "Acme".to_string()
            }
        );
    }

    #[tokio::test]
    async fn get_json_maps_401_to_unauthorized() {
        let client = serve(Router::new().route(
            "/api/visitors",
            get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "message": "login" }))) }),
        ))
        .await;

        let err = client
            .get_json::<Value>("/api/visitors")
            .await
            .expect_err("should fail");
        assert!(err.to_string().contains("unauthorized request to /api/visitors"));
    }

    #[tokio::test]
    async fn get_json_maps_other_status_with_message() {
        let client = serve(Router::new().route(
            "/api/plants",
            get(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "message": "plant code taken" })),
                )
            }),
        ))
        .await;

        let err = client
            .get_json::<Value>("/api/plants")
            .await
            .expect_err("should fail");
        assert!(err.to_string().contains("422"));
        assert!(err.to_string().contains("plant code taken"));
    }

    #[tokio::test]
    async fn send_returns_non_json_bodies_as_null() {
        let client = serve(Router::new().route(
            "/health",
            get(|| async { (StatusCode::NOT_FOUND, "not here") }),
        ))
        .await;

        let response = client
            .send(Method::GET, "/health", None)
            .await
            .expect("send");
        assert_eq!(response, ApiResponse::new(404, Value::Null));
    }

    fn companies() -> Router {
        Router::new()
            .route(
                "/api/companies",
                post(|Json(body): Json<Value>| async move {
                    (StatusCode::CREATED, Json(body))
                }),
            )
            .route(
                "/api/companies/{id}",
                get(|| async { Json(json!({ "name": "Acme" })) })
                    .put(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                        let name = body["name"].as_str().unwrap_or_default();
                        Json(json!({ "name": format!("{name}-{id}") }))
                    })
                    .delete(|Path(id): Path<String>| async move {
                        if id == "locked" {
                            StatusCode::UNAUTHORIZED
                        } else {
                            StatusCode::NO_CONTENT
                        }
                    }),
            )
            .route(
                "/api/areas",
                post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "message": "login" }))) }),
            )
    }

    #[tokio::test]
    async fn post_json_sends_body_and_decodes_reply() {
        let client = serve(companies()).await;

        let created: Company = client
            .post_json(
                "/api/companies",
                &Company {
                    name: "Globex".to_string(),
                },
            )
            .await
            .expect("post");
        assert_eq!(created.name, "Globex");
    }

    #[tokio::test]
    async fn put_json_sends_body_and_decodes_reply() {
        let client = serve(companies()).await;

        let updated: Company = client
            .put_json("/api/companies/7", &json!({ "name": "Initech" }))
            .await
            .expect("put");
        assert_eq!(updated.name, "Initech-7");
    }

    #[tokio::test]
    async fn delete_accepts_no_content() {
        let client = serve(companies()).await;
        client.delete("/api/companies/7").await.expect("delete");
    }

    #[tokio::test]
    async fn writes_map_401_to_unauthorized() {
        let client = serve(companies()).await;

        let err = client
            .post_json::<_, Value>("/api/areas", &json!({ "name": "Gate 2" }))
            .await
            .expect_err("should fail");
        assert!(err.to_string().contains("unauthorized request to /api/areas"));

        let err = client
            .delete("/api/companies/locked")
            .await
            .expect_err("should fail");
        assert!(err.to_string().contains("unauthorized request to /api/companies/locked"));
    }
}
