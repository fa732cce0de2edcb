//! Transport abstraction between the connector and the network.

mod http;

pub use http::{HttpTransport, HttpTransportBuilder};

use async_trait::async_trait;

use crate::error::TransportError;

/// HTTP method of a connector request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Wire spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivers connector requests.
///
/// [`HttpTransport`] is the production implementation; a different
/// authentication scheme means a different implementation of this trait,
/// not a connector change. Non-2xx responses surface as
/// [`TransportError::Status`] with the raw body kept for error parsing.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the raw response bytes. PDF bodies are
    /// binary, so no text decoding happens at this layer.
    async fn send(
        &self,
        url: &str,
        method: Method,
        body: Option<&str>,
        content_type: &str,
    ) -> Result<Vec<u8>, TransportError>;

    /// Requests left in the current rate-limit window, as reported by the
    /// last response. `None` before any request was made.
    fn requests_left(&self) -> Option<u32>;
}
