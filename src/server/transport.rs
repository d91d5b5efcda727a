use crate::error::BoxError;

use serde::Deserialize;
use std::{fmt, sync::Arc, time::Duration};

/// Region name and service endpoint.
///
/// ```rust
/// use dynamodb_rpc::Region;
///
/// let region: Region = serde_json::from_str(
///     r#"{"name": "us-east-1", "endpoint": "https://dynamodb.us-east-1.amazonaws.com"}"#,
/// ).unwrap();
/// assert_eq!(region.name, "us-east-1");
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq)]
pub struct Region {
    /// Region name, used by signers.
    pub name: String,
    /// Base URL requests are posted to.
    pub endpoint: String,
}

impl Region {
    /// Create a region.
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Credentials handed to the signer.
#[derive(Clone, Default, Deserialize, Eq, PartialEq)]
pub struct Credentials {
    /// Access key id.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
    /// Session token, for temporary credentials.
    #[serde(default)]
    pub token: Option<String>,
}

impl Credentials {
    /// Create long-term credentials.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            token: None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"** redacted **")
            .field("token", &self.token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

/// Sends a signed request and returns the raw response.
pub trait Transport: fmt::Debug + Send + Sync {
    /// Perform the exchange. Errors mean no response was received.
    fn send(&self, request: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>, BoxError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, request: http::Request<Vec<u8>>) -> Result<http::Response<Vec<u8>>, BoxError> {
        T::send(self, request)
    }
}

/// Attaches authentication headers to an outgoing request.
pub trait Signer: fmt::Debug + Send + Sync {
    /// Sign the request in place.
    fn sign(
        &self,
        request: &mut http::Request<Vec<u8>>,
        credentials: &Credentials,
        region: &Region,
    ) -> Result<(), BoxError>;
}

/// Signer leaving requests untouched, for endpoints without authentication.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsignedSigner;

impl Signer for UnsignedSigner {
    fn sign(
        &self,
        _request: &mut http::Request<Vec<u8>>,
        _credentials: &Credentials,
        _region: &Region,
    ) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Blocks the calling thread between retries.
pub trait Sleep: fmt::Debug + Send + Sync {
    /// Block for `duration`.
    fn sleep(&self, duration: Duration);
}

impl<T: Sleep + ?Sized> Sleep for Arc<T> {
    fn sleep(&self, duration: Duration) {
        T::sleep(self, duration)
    }
}

/// [`Sleep`] backed by `std::thread::sleep`.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration)
    }
}
