//! HTTP plumbing for the hosted backend (auth, relational store, object store).

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use workdesk_core::BackendConfig;

use crate::error::ServiceError;

/// PostgREST code for "single row requested, zero rows returned".
const PGRST_NO_ROWS: &str = "PGRST116";

/// Shared client for the hosted backend.
///
/// Every request carries the `apikey` header. The `Authorization` header uses
/// the caller's access token when one is given and the API key otherwise.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    service_role_key: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            service_role_key: None,
        }
    }

    /// Build a client from configuration. Fails when the backend is unset.
    pub fn from_config(config: &BackendConfig) -> Result<Self, ServiceError> {
        if !config.is_configured() {
            return Err(ServiceError::NotConfigured);
        }
        let (Some(url), Some(key)) = (config.url.as_deref(), config.anon_key.as_deref()) else {
            return Err(ServiceError::NotConfigured);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            api_key: key.to_string(),
            service_role_key: config
                .has_service_role()
                .then(|| config.service_role_key.clone())
                .flatten(),
        })
    }

    pub fn with_service_role_key(mut self, key: &str) -> Self {
        self.service_role_key = Some(key.to_string());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_service_role(&self) -> bool {
        self.service_role_key.is_some()
    }

    /// `<base>/rest/v1/<table>`
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// `<base>/auth/v1/<path>`
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `<base>/storage/v1/<path>`
    pub fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request with the standard headers.
    pub fn request(&self, method: Method, url: &str, bearer: Option<&str>) -> RequestBuilder {
        let token = bearer.unwrap_or(&self.api_key);
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", token))
    }

    /// Start a request authorised with the service role key, if one is configured.
    pub fn privileged_request(&self, method: Method, url: &str) -> Option<RequestBuilder> {
        let key = self.service_role_key.as_deref()?;
        Some(
            self.client
                .request(method, url)
                .header("apikey", key)
                .header("Authorization", format!("Bearer {}", key)),
        )
    }

    /// Map a response to `T`, or to a [`ServiceError`] carrying the backend's message.
    pub async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| ServiceError::Decode(format!("JSON parse error: {}", e)));
        }
        Err(Self::error_for(status.as_u16(), response).await)
    }

    /// Like [`handle_response`](Self::handle_response) but ignores the body.
    pub async fn handle_empty(&self, response: Response) -> Result<(), ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::error_for(status.as_u16(), response).await)
    }

    async fn error_for(status: u16, response: Response) -> ServiceError {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        tracing::debug!("Backend returned {}: {}", status, message);

        match status {
            401 => ServiceError::Unauthorized(message),
            403 => ServiceError::Forbidden(message),
            404 => ServiceError::NotFound(message),
            _ if error_code(&body).as_deref() == Some(PGRST_NO_ROWS) => {
                ServiceError::NotFound(message)
            }
            _ => ServiceError::Api { status, message },
        }
    }
}

/// Extract the human-readable message from an error body.
///
/// The auth service uses `msg` or `error_description`, the relational store
/// uses `message`. Falls back to the raw body.
pub fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|field| v.get(*field).and_then(|m| m.as_str()))
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

fn error_code(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("code")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_error_message_fields() {
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            "Invalid login credentials"
        );
        assert_eq!(error_message(r#"{"msg":"User already registered"}"#), "User already registered");
        assert_eq!(error_message(r#"{"code":"42501","message":"denied"}"#), "denied");
        assert_eq!(error_message("plain text "), "plain text");
    }

    #[test]
    fn test_urls() {
        let client = BackendClient::new("https://x.example.co/", "anon");
        assert_eq!(client.rest_url("calendar_events"), "https://x.example.co/rest/v1/calendar_events");
        assert_eq!(client.auth_url("/user"), "https://x.example.co/auth/v1/user");
        assert_eq!(client.storage_url("object/b/p"), "https://x.example.co/storage/v1/object/b/p");
    }

    #[test]
    fn test_from_config_requires_backend() {
        let config = BackendConfig::default();
        assert!(matches!(
            BackendClient::from_config(&config),
            Err(ServiceError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_headers_use_bearer_or_key() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/items"))
            .and(header("apikey", "anon"))
            .and(header("Authorization", "Bearer user_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri(), "anon");
        let url = client.rest_url("items");
        let response = client
            .request(Method::GET, &url, Some("user_token"))
            .send()
            .await
            .unwrap();
        let rows: Vec<serde_json::Value> = client.handle_response(response).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(path("/rest/v1/forbidden"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(serde_json::json!({"message": "denied"})),
            )
            .mount(&server)
            .await;
        Mock::given(path("/rest/v1/single"))
            .respond_with(ResponseTemplate::new(406).set_body_json(
                serde_json::json!({"code": "PGRST116", "message": "no rows"}),
            ))
            .mount(&server)
            .await;
        Mock::given(path("/rest/v1/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri(), "anon");

        let response = client
            .request(Method::GET, &client.rest_url("forbidden"), None)
            .send()
            .await
            .unwrap();
        let err = client.handle_empty(response).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(ref m) if m == "denied"));

        let response = client
            .request(Method::GET, &client.rest_url("single"), None)
            .send()
            .await
            .unwrap();
        let err = client.handle_empty(response).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let response = client
            .request(Method::GET, &client.rest_url("broken"), None)
            .send()
            .await
            .unwrap();
        let err = client.handle_empty(response).await.unwrap_err();
        assert!(matches!(err, ServiceError::Api { status: 500, ref message } if message == "boom"));
    }
}
