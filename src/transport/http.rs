//! HTTP transport built on reqwest with tracing middleware.

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::error::TransportError;
use crate::transport::{Method, Transport};

const RATE_LIMIT_HEADER: &str = "X-RateLimit-Remaining";

// Matches the redirect depth the API tolerates before a login redirect
// loop should be treated as a failure.
const MAX_REDIRECTS: usize = 20;

/// Production [`Transport`]: reqwest with HTTP Basic authentication.
///
/// Failed requests are never retried; only redirects are followed, capped
/// at 20 hops.
pub struct HttpTransport {
    client: ClientWithMiddleware,
    credentials: Option<(String, SecretString)>,
    requests_left: Mutex<Option<u32>>,
}

impl HttpTransport {
    /// Create a transport with default settings and no credentials.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a transport builder.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        url: &str,
        method: Method,
        body: Option<&str>,
        content_type: &str,
    ) -> Result<Vec<u8>, TransportError> {
        debug!(%method, url, "sending request");
        let mut request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        };
        request = request.header(CONTENT_TYPE, content_type);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password.expose_secret()));
        }
        if let Some(body) = body {
            request = request.body(body.to_string());
        }
        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        if let Some(remaining) = response
            .headers()
            .get(RATE_LIMIT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok())
        {
            if let Ok(mut guard) = self.requests_left.lock() {
                *guard = Some(remaining);
            }
        }

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;
        if (200..300).contains(&status) {
            Ok(body.to_vec())
        } else {
            warn!(%method, url, status, "request failed");
            Err(TransportError::Status {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            })
        }
    }

    fn requests_left(&self) -> Option<u32> {
        self.requests_left.lock().ok().and_then(|guard| *guard)
    }
}

/// Builder for [`HttpTransport`].
pub struct HttpTransportBuilder {
    credentials: Option<(String, SecretString)>,
    user_agent: Option<String>,
}

impl HttpTransportBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            credentials: None,
            user_agent: None,
        }
    }

    /// Set the HTTP Basic credentials.
    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((user.into(), SecretString::from(password.into())));
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the transport.
    pub fn build(self) -> HttpTransport {
        let mut headers = HeaderMap::new();
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("moneybird-api-client/{}", env!("CARGO_PKG_VERSION")));
        let header_value = HeaderValue::from_str(&user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("moneybird-api-client"));
        headers.insert(USER_AGENT, header_value);

        let reqwest_client = reqwest::Client::builder()
            .default_headers(headers)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        HttpTransport {
            client,
            credentials: self.credentials,
            requests_left: Mutex::new(None),
        }
    }
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
