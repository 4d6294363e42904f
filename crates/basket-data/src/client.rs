//! HTTP client for the Basket REST backend.
//!
//! Every request carries the bearer token of the stored session when there is
//! one. A 401 reply drops that session before the error is returned, so the
//! next command starts logged out.

use basket_auth::SessionStore;
use basket_commerce::catalog::{resolve_image_url, Product};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::FetchError;
use crate::timeout::TimeoutConfig;

/// Used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

const MAX_ERROR_MESSAGE: usize = 200;

/// Client for the backend REST API.
///
/// Cheap to clone; clones share the connection pool and session store.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    sessions: Option<SessionStore>,
}

impl ApiClient {
    /// Create a client for `base_url`.
    pub fn new(base_url: &str, timeout: TimeoutConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout.total)
            .connect_timeout(timeout.connect)
            .user_agent(concat!("basket/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| FetchError::InvalidUrl(format!("'{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            http,
            base_url,
            sessions: None,
        })
    }

    /// Attach the session store used for bearer tokens and 401 handling.
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn sessions(&self) -> Option<&SessionStore> {
        self.sessions.as_ref()
    }

    /// Base URL without the trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Fetchable URL for a product's image.
    pub fn image_url(&self, product: &Product) -> String {
        resolve_image_url(product.image_url.as_deref(), self.base_url())
    }

    /// Build an endpoint URL from path segments. Segments are percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Endpoint URL with a single query parameter.
    pub(crate) fn endpoint_with_query(
        &self,
        segments: &[&str],
        key: &str,
        value: &str,
    ) -> Result<Url, FetchError> {
        let mut url = self.endpoint(segments)?;
        url.query_pairs_mut().append_pair(key, value);
        Ok(url)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, path = url.path(), "backend request");
        let builder = self.http.request(method, url);
        match self.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn bearer_token(&self) -> Option<String> {
        let sessions = self.sessions.as_ref()?;
        match sessions.token() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session");
                None
            }
        }
    }

    /// Send a request and map non-2xx replies onto [`FetchError`].
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response, FetchError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            self.invalidate_session();
            return Err(FetchError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_default();
        tracing::debug!(status = status.as_u16(), %message, "backend error reply");
        Err(FetchError::Http {
            status: status.as_u16(),
            message,
        })
    }

    fn invalidate_session(&self) {
        if let Some(sessions) = &self.sessions {
            if let Err(e) = sessions.invalidate() {
                tracing::warn!(error = %e, "failed to clear session after 401");
            }
        }
    }

    /// Send and parse the reply body as JSON.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        context: &str,
    ) -> Result<T, FetchError> {
        let value = self.send_value(builder, context).await?;
        serde_json::from_value(value).map_err(|e| FetchError::parse(context, e))
    }

    /// Send and return the reply body as a raw JSON value.
    pub(crate) async fn send_value(
        &self,
        builder: RequestBuilder,
        context: &str,
    ) -> Result<Value, FetchError> {
        let body = self.send(builder).await?.text().await?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| FetchError::parse(context, e))
    }

    /// Send and discard the reply body.
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), FetchError> {
        self.send(builder).await?;
        Ok(())
    }

    pub(crate) async fn get_value(&self, url: Url) -> Result<Value, FetchError> {
        let context = url.path().to_string();
        self.send_value(self.request(Method::GET, url), &context)
            .await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let context = url.path().to_string();
        self.send_json(self.request(Method::GET, url), &context)
            .await
    }

    pub(crate) async fn write_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T, FetchError> {
        let context = url.path().to_string();
        self.send_json(self.request(method, url).json(body), &context)
            .await
    }
}

/// Pull a human-readable message out of an error body.
///
/// Backends reply with plain text or `{"message": ...}` / `{"error": ...}`.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let message = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(obj)) => ["message", "error", "detail"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str))
            .map(str::to_string),
        Ok(Value::String(s)) => Some(s),
        _ => None,
    };
    let message = message.unwrap_or_else(|| body.to_string());
    if message.chars().count() > MAX_ERROR_MESSAGE {
        Some(message.chars().take(MAX_ERROR_MESSAGE).collect())
    } else {
        Some(message)
    }
}

/// Unwrap `{"content": [...]}` / `{"data": [...]}` list envelopes.
pub(crate) fn list_items(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("content").or_else(|| obj.remove("data")) {
            Some(inner) => list_items(inner),
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}
