//! HTTP transport port and its reqwest adapter.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName};
use reqwest::{Client, Method, StatusCode};

use crate::config::ClientConfig;
use crate::error::TransportError;

/// A request as built by `SessionClient`, independent of the HTTP library.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute API path, e.g. `/api/auth/me`.
    pub path: String,
    pub headers: Vec<(HeaderName, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First value of header `name`, if present.
    #[must_use]
    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A fully-read response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    #[must_use]
    pub fn is_json(&self) -> bool {
        self.content_type()
            .is_some_and(|value| value.contains("application/json"))
    }
}

/// Sends requests to the API.
///
/// Implementations return `Ok` for every response that arrives, whatever its
/// status; `Err` is reserved for failures where no response exists.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns `TransportError` when no response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `HttpTransport` over a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Build with a default client.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the TLS backend cannot be initialized.
    pub fn from_config(config: &ClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self::new(client, config))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, self.url(&request.path));
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
