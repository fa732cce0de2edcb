//! Error types for the Moneybird client library.

use thiserror::Error;

/// The main error type for all Moneybird client operations.
#[derive(Error, Debug)]
pub enum MoneybirdError {
    /// Invalid client configuration (bad client name or base URL)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Not logged in: the API returned 401, or the session probe got a 404
    #[error("Not logged in: {0}")]
    NotLoggedIn(String),

    /// The API refused the operation (403), or a delete guard fired locally
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The entity was rejected (406/422), or failed local validation
    #[error("Not valid: {message}")]
    NotValid {
        /// Human-readable failure description
        message: String,
        /// Field-level errors parsed from the response body, empty for
        /// local validation failures
        errors: ErrorList,
    },

    /// The API reported a server-side failure (500/501 or unrecognized status)
    #[error("Server error: {0}")]
    ServerError(String),

    /// The filter name is not in the whitelist for the resource type
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// The named-id lookup key is not valid for the resource type
    #[error("Invalid named id: {0}")]
    InvalidNamedId(String),

    /// An id value is not a positive integer string
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Send method is not one of hand, email or post
    #[error("Invalid send method: {0}")]
    InvalidSendMethod(String),

    /// The document is in a state that does not permit the operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An entity of the wrong kind was pushed into a typed collection
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Kind the collection is bound to
        expected: &'static str,
        /// Kind that was offered
        actual: &'static str,
    },

    /// A value could not be mapped onto the wire format
    #[error("Mapper error: {0}")]
    Mapper(String),

    /// The wire document could not be parsed
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Read access to an attribute outside the disclosed set
    #[error("Attribute {0} has not been disclosed")]
    Undisclosed(String),

    /// Transport-level failure (connection refused, malformed or excessive
    /// redirects, protocol errors)
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Error raised by a [`crate::transport::Transport`] implementation.
///
/// The connector translates `Status` values into the typed taxonomy above;
/// everything else surfaces as [`MoneybirdError::Connection`].
#[derive(Error, Debug)]
pub enum TransportError {
    /// The server answered with a non-2xx status
    #[error("HTTP status {status}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body, used for error-detail parsing
        body: String,
    },

    /// The request never produced a response
    #[error("{0}")]
    Connection(String),
}

/// A single field-level error returned by the API on 403/422 responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Attribute the error applies to
    pub attribute: String,
    /// Human-readable message
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.attribute, self.message)
    }
}

impl ApiError {
    /// Create a new field-level error.
    pub fn new(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            message: message.into(),
        }
    }
}

/// The field-level errors of a rejected request, newline-joined when
/// displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList(pub Vec<ApiError>);

impl ErrorList {
    /// True if the server reported no field-level details.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of field-level errors.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over the individual errors.
    pub fn iter(&self) -> std::slice::Iter<'_, ApiError> {
        self.0.iter()
    }
}

impl std::fmt::Display for ErrorList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let error = ApiError::new("companyName", "can't be blank");
        assert_eq!(error.to_string(), "companyName: can't be blank");
    }

    #[test]
    fn test_error_list_joined_with_newlines() {
        let list = ErrorList(vec![
            ApiError::new("email", "is invalid"),
            ApiError::new("zipcode", "can't be blank"),
        ]);
        assert_eq!(list.to_string(), "email: is invalid\nzipcode: can't be blank");
    }

    #[test]
    fn test_empty_error_list() {
        let list = ErrorList::default();
        assert!(list.is_empty());
        assert_eq!(list.to_string(), "");
    }
}
