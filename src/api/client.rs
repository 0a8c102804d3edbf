//! HTTP adapter mapping backend responses into the tagged error union.
//!
//! The primitives never probe an opaque error value's structure; this
//! boundary produces [`ApiError`] with a closed tag set. Unauthorized
//! responses become the canonical expired-session error, structured
//! `{detail, code}` bodies are decoded as-is, and anything unreadable
//! degrades to a plain status message.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ErrorDetail};
use crate::paginate::{Page, PageSource};
use crate::BoxFuture;

/// Structured error body shape reported by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: ErrorDetail,
    #[serde(default)]
    code: Option<String>,
}

/// Thin JSON client over one backend base URL.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// GET a JSON resource, optionally authenticated with a bearer token.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let request_id = Uuid::new_v4();
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self.http.get(&url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(%request_id, %url, "dispatching request");
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            tracing::debug!(%request_id, status = status.as_u16(), "request failed");
            return Err(classify_response(status, &body));
        }

        serde_json::from_slice(&body)
            .map_err(|err| ApiError::Message(format!("Malformed response body: {err}")))
    }

    /// Fetch one page of a server-paginated collection.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        page: u32,
        page_size: u32,
        token: Option<&str>,
    ) -> Result<Page<T>, ApiError> {
        let path = format!("{path}?page={page}&page_size={page_size}");
        self.get_json(&path, token).await
    }
}

/// Classify a non-success response into the error union.
pub fn classify_response(status: StatusCode, body: &[u8]) -> ApiError {
    if status == StatusCode::UNAUTHORIZED {
        return ApiError::session_expired();
    }
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => ApiError::Api {
            detail: parsed.detail,
            code: parsed.code,
        },
        Err(_) => ApiError::Message(format!("HTTP {}", status.as_u16())),
    }
}

/// One collection endpoint packaged as a [`PageSource`].
pub struct EndpointSource {
    client: ApiClient,
    path: String,
    token: Option<String>,
}

impl EndpointSource {
    pub fn new(client: ApiClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl<T: DeserializeOwned + Send + 'static> PageSource<T> for EndpointSource {
    fn fetch_page(&self, page: u32, page_size: u32) -> BoxFuture<'_, Result<Page<T>, ApiError>> {
        Box::pin(async move {
            self.client
                .fetch_page(&self.path, page, page_size, self.token.as_deref())
                .await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_maps_to_session_expired() {
        let err = classify_response(StatusCode::UNAUTHORIZED, b"");
        assert!(err.is_session_expired());
        assert_eq!(err.message(), "Session expired. Please sign in again.");
    }

    #[test]
    fn test_structured_detail_body() {
        let body = br#"{"detail": "You do not have access", "code": "ACCESS_DENIED"}"#;
        match classify_response(StatusCode::FORBIDDEN, body) {
            ApiError::Api { detail, code } => {
                assert_eq!(detail.to_string(), "You do not have access");
                assert_eq!(code.as_deref(), Some("ACCESS_DENIED"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_list_body() {
        let body = br#"{"detail": [{"msg": "X"}, {"msg": "Y"}]}"#;
        let err = classify_response(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(err.message(), "X, Y");
    }

    #[test]
    fn test_unreadable_body_degrades_to_status() {
        let err = classify_response(StatusCode::INTERNAL_SERVER_ERROR, b"<html>oops</html>");
        assert_eq!(err.message(), "HTTP 500");
    }
}
