//! Access-token lifecycle and authenticated API requests.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use storage::repository::{KeyValueStore, SESSION_TOKEN_KEY};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpTransport};

/// Opaque bearer credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

/// Successful response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The response declared a JSON content type.
    Json(Value),
    Text(String),
}

impl ResponseBody {
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Text(text) => Some(text),
        }
    }

    /// Decode into `T`. A text body is parsed as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::JsonParse` if the body does not match `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            Self::Json(value) => serde_json::from_value(value).map_err(ApiError::JsonParse),
            Self::Text(text) => serde_json::from_str(&text).map_err(ApiError::JsonParse),
        }
    }
}

/// Holds the access token and performs API requests on its behalf.
///
/// The in-memory token is authoritative; the persisted copy is best-effort and
/// storage failures never surface to callers.
pub struct SessionClient {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn KeyValueStore>,
    token: RwLock<Option<AccessToken>>,
}

impl SessionClient {
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            transport,
            store,
            token: RwLock::new(None),
        }
    }

    /// Current token, if any. Presence does not imply the server still accepts it.
    #[must_use]
    pub fn access_token(&self) -> Option<AccessToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn has_session(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn set_token(&self, token: Option<AccessToken>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// Adopt `token`, then persist it.
    pub async fn store_session(&self, token: impl Into<AccessToken>) {
        let token = token.into();
        let persisted = token.as_str().to_owned();
        self.set_token(Some(token));
        if let Err(err) = self.store.set(SESSION_TOKEN_KEY, &persisted).await {
            warn!(error = %err, "failed to persist session token");
        }
    }

    /// Drop the token and its persisted copy.
    pub async fn clear_session(&self) {
        self.set_token(None);
        if let Err(err) = self.store.remove(SESSION_TOKEN_KEY).await {
            warn!(error = %err, "failed to remove persisted session token");
        }
    }

    /// Replace the in-memory token with the persisted one. An empty stored value
    /// counts as no token. The token is not validated against the server.
    pub async fn restore_session(&self) {
        let token = match self.store.get(SESSION_TOKEN_KEY).await {
            Ok(token) => token.filter(|t| !t.is_empty()).map(AccessToken::from),
            Err(err) => {
                warn!(error = %err, "failed to read persisted session token");
                None
            }
        };
        debug!(restored = token.is_some(), "session restored");
        self.set_token(token);
    }

    /// Perform a request against the API.
    ///
    /// Always sends `Content-Type: application/json`, plus a bearer
    /// `Authorization` header while a token is held.
    ///
    /// # Errors
    ///
    /// - `ApiError::Transport` when no response arrived.
    /// - `ApiError::HttpStatus` for a non-success status.
    /// - `ApiError::JsonParse` when a JSON response does not parse.
    /// - `ApiError::Encode` when `body` cannot be serialized.
    pub async fn request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ResponseBody, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut headers = Vec::with_capacity(2);
        if let Some(token) = self.access_token().filter(|t| !t.as_str().is_empty()) {
            headers.push((AUTHORIZATION, format!("Bearer {}", token.as_str())));
        }
        headers.push((CONTENT_TYPE, "application/json".to_owned()));

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(ApiError::Encode)?;

        let request = HttpRequest {
            method: method.clone(),
            path: path.to_owned(),
            headers,
            body,
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                debug!(%method, path, error = %err, "api request failed before response");
                return Err(err.into());
            }
        };
        debug!(%method, path, status = response.status.as_u16(), "api request completed");

        if !response.status.is_success() {
            return Err(ApiError::from_status(response.status, &response.body));
        }

        if response.is_json() {
            let value = serde_json::from_str(&response.body).map_err(ApiError::JsonParse)?;
            Ok(ResponseBody::Json(value))
        } else {
            Ok(ResponseBody::Text(response.body))
        }
    }

    /// # Errors
    ///
    /// See [`SessionClient::request`].
    pub async fn get(&self, path: &str) -> Result<ResponseBody, ApiError> {
        self.request(Method::GET, path, None::<&()>).await
    }

    /// # Errors
    ///
    /// See [`SessionClient::request`].
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<ResponseBody, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    /// `get` and decode the body into `T`.
    ///
    /// # Errors
    ///
    /// See [`SessionClient::request`] and [`ResponseBody::decode`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.get(path).await?.decode()
    }

    /// `post` and decode the body into `T`.
    ///
    /// # Errors
    ///
    /// See [`SessionClient::request`] and [`ResponseBody::decode`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(path, body).await?.decode()
    }
}

impl fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClient")
            .field("has_session", &self.has_session())
            .finish_non_exhaustive()
    }
}
