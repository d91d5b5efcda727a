//! Error types surfaced by every operation of this crate.

use crate::write::batch_write_item::UnprocessedItems;

use std::{error, fmt};

/// Boxed error returned by the pluggable transport and signer.
pub type BoxError = Box<dyn error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Service error code signalling that provisioned capacity was exceeded.
pub const PROVISIONED_THROUGHPUT_EXCEEDED: &str = "ProvisionedThroughputExceededException";

/// Service error code signalling request-rate throttling.
pub const THROTTLING: &str = "ThrottlingException";

/// A structured error returned by the service with a non-200 status.
///
/// ```rust
/// use dynamodb_rpc::ServiceError;
///
/// let error = ServiceError::from_response(
///     http::StatusCode::BAD_REQUEST,
///     br#"{"__type":"com.amazon.coral.validate#ValidationException","message":"bad key"}"#,
/// );
/// assert_eq!(error.code, "ValidationException");
/// assert_eq!(error.to_string(), "ValidationException: bad key");
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ServiceError {
    /// HTTP status code (400, 500, ...).
    pub status_code: u16,
    /// HTTP status line, e.g. `500 Internal Server Error`.
    pub status: String,
    /// Short service error code, with any namespace prefix stripped.
    pub code: String,
    /// Human readable message.
    pub message: String,
}

impl ServiceError {
    /// Build an error from a non-200 response.
    ///
    /// The code is taken from `__type`, keeping only what follows the last `#`.
    /// A body that is not JSON yields an empty code and the raw body as message.
    pub fn from_response(status: http::StatusCode, body: &[u8]) -> Self {
        let status_line = match status.canonical_reason() {
            Some(reason) => format!("{} {}", status.as_u16(), reason),
            None => status.as_u16().to_string(),
        };
        let mut service_error = Self {
            status_code: status.as_u16(),
            status: status_line,
            ..Default::default()
        };
        let document: serde_json::Value = match serde_json::from_slice(body) {
            Ok(document) => document,
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(status = %service_error.status, "error body is not JSON");
                service_error.message = String::from_utf8_lossy(body).into_owned();
                return service_error;
            }
        };
        let field = |name: &str| document.get(name).and_then(serde_json::Value::as_str);
        service_error.message = field("message")
            .or_else(|| field("Message"))
            .unwrap_or_default()
            .to_string();
        service_error.code = short_code(field("__type").unwrap_or_default()).to_string();
        service_error
    }

    /// Whether the write retry tier should try again.
    pub fn is_retryable(&self) -> bool {
        self.status_code == 500 || self.code == THROTTLING || self.is_throttling()
    }

    /// Whether the error is the provisioned throughput signal.
    pub fn is_throttling(&self) -> bool {
        self.code == PROVISIONED_THROUGHPUT_EXCEEDED
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl error::Error for ServiceError {}

fn short_code(code: &str) -> &str {
    match code.rsplit_once('#') {
        Some((_, short)) => short,
        None => code,
    }
}

/// Every failure this crate can report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The service answered with a non-200 status.
    #[error(transparent)]
    Service(#[from] ServiceError),
    /// The request never reached the service or no response came back.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
    /// The signer refused to sign the request.
    #[error("signing error: {0}")]
    Signing(#[source] BoxError),
    /// The outgoing HTTP request could not be assembled.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] http::Error),
    /// The response is JSON but lacks an expected field or shape.
    #[error("Unexpected response {body}")]
    UnexpectedResponse {
        /// The raw response body.
        body: String,
    },
    /// The response body is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// GetItem found no item for the requested key.
    #[error("Item not found")]
    NotFound,
    /// BatchWriteItem left some requests unprocessed.
    #[error("One or more unprocessed items.")]
    UnprocessedItems(UnprocessedItems),
    /// A write was requested without any attribute.
    #[error("At least one attribute is required.")]
    MissingAttributes,
    /// A comparison was given the wrong number of operands.
    #[error("{operator} expects {expected} operand(s), got {actual}")]
    InvalidComparison {
        /// Wire name of the operator.
        operator: &'static str,
        /// Human readable arity.
        expected: &'static str,
        /// Number of operands supplied.
        actual: usize,
    },
    /// A query key condition uses an operator only valid in scan filters.
    #[error("{operator} is not allowed in the key condition on {name}")]
    InvalidKeyCondition {
        /// The attribute being compared.
        name: String,
        /// Wire name of the operator.
        operator: &'static str,
    },
    /// A value has no representation in the supported attribute types.
    #[error("attribute {name} has an unsupported type")]
    UnsupportedAttribute {
        /// The attribute name.
        name: String,
    },
    /// Typed (de)serialization through `serde_dynamo` failed.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_dynamo::Error),
    /// A binary payload is not valid base64.
    #[error("invalid binary payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl Error {
    pub(crate) fn unexpected_response(body: &[u8]) -> Self {
        Self::UnexpectedResponse {
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// Whether this is the GetItem not-found signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Whether the write retry tier would retry this error.
    pub fn is_retryable(&self) -> bool {
        self.service_error()
            .is_some_and(ServiceError::is_retryable)
    }

    /// The service error, if this is one.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(service_error) => Some(service_error),
            _ => None,
        }
    }

    /// The unprocessed batch write requests, if this is a partial failure.
    pub fn unprocessed_items(&self) -> Option<&UnprocessedItems> {
        match self {
            Self::UnprocessedItems(items) => Some(items),
            _ => None,
        }
    }
}
