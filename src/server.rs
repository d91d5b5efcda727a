//! The executor: signs, sends and retries requests against one endpoint.

/// Retry settings and backoff schedules.
pub mod retry;

/// Collaborator seams: transport, signer, sleep, region and credentials.
pub mod transport;

use crate::request::Query;
use crate::{Error, Result, ServiceError};
use retry::RetryConfig;
use transport::{Credentials, Region, Signer, Sleep, ThreadSleep, Transport, UnsignedSigner};

use std::{fmt, sync::Arc};

/// Default service identifier prefixed to every operation name.
pub const SERVICE_VERSION: &str = "DynamoDB_20120810";

const CONTENT_TYPE: &str = "application/x-amz-json-1.0";

/// Wire operations this client issues.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operation {
    /// `GetItem`
    GetItem,
    /// `PutItem`
    PutItem,
    /// `UpdateItem`
    UpdateItem,
    /// `DeleteItem`
    DeleteItem,
    /// `Query`
    Query,
    /// `Scan`
    Scan,
    /// `BatchGetItem`
    BatchGetItem,
    /// `BatchWriteItem`
    BatchWriteItem,
}

impl Operation {
    /// The operation name as it appears in the target header.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GetItem => "GetItem",
            Self::PutItem => "PutItem",
            Self::UpdateItem => "UpdateItem",
            Self::DeleteItem => "DeleteItem",
            Self::Query => "Query",
            Self::Scan => "Scan",
            Self::BatchGetItem => "BatchGetItem",
            Self::BatchWriteItem => "BatchWriteItem",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable handle on one service endpoint.
///
/// Holds no per-request state and can be shared across threads behind an `Arc`.
///
/// ```rust,no_run
/// use dynamodb_rpc::{Credentials, Region, RetryConfig, Server, Transport};
/// use std::sync::Arc;
///
/// # fn example(transport: impl Transport + 'static) {
/// let server = Server::new(
///     Region::new("us-east-1", "https://dynamodb.us-east-1.amazonaws.com"),
///     Credentials::new("AKID", "secret"),
///     transport,
/// )
/// .with_retry_config(RetryConfig {
///     max_throttle_retries: Some(10),
///     ..Default::default()
/// });
/// let server = Arc::new(server);
/// # let _ = server;
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Server {
    region: Region,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
    signer: Arc<dyn Signer>,
    sleep: Arc<dyn Sleep>,
    retry_config: RetryConfig,
    service_version: String,
}

impl Server {
    /// Create a server with an unsigned signer, thread sleeps and default retries.
    pub fn new(
        region: Region,
        credentials: Credentials,
        transport: impl Transport + 'static,
    ) -> Self {
        Self {
            region,
            credentials,
            transport: Arc::new(transport),
            signer: Arc::new(UnsignedSigner),
            sleep: Arc::new(ThreadSleep),
            retry_config: RetryConfig::default(),
            service_version: SERVICE_VERSION.to_string(),
        }
    }

    /// Use this signer for every request.
    pub fn with_signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Arc::new(signer);
        self
    }

    /// Use this sleep between retries.
    pub fn with_sleep(mut self, sleep: impl Sleep + 'static) -> Self {
        self.sleep = Arc::new(sleep);
        self
    }

    /// Use these retry settings.
    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Use another service identifier in the target header.
    pub fn with_service_version(mut self, service_version: impl Into<String>) -> Self {
        self.service_version = service_version.into();
        self
    }

    /// The region this server talks to.
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// The retry settings.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// The full target header value for an operation.
    pub fn target(&self, operation: Operation) -> String {
        format!("{}.{}", self.service_version, operation)
    }

    /// Serialize `query` and send it as `operation`.
    pub fn query_server(
        &self,
        operation: Operation,
        query: &Query,
        is_retry: bool,
    ) -> Result<Vec<u8>> {
        self.raw_query_server(operation, &query.to_json()?, is_retry)
    }

    /// Send a serialized body as `operation`.
    ///
    /// When `is_retry` is set, a throughput-exceeded error is retried after
    /// `k` throttle steps before attempt `k`, until it clears or the configured
    /// cap is reached. Every other outcome is returned as is.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_rpc.send", skip(self, body), err)
    )]
    pub fn raw_query_server(
        &self,
        operation: Operation,
        body: &str,
        is_retry: bool,
    ) -> Result<Vec<u8>> {
        let target = self.target(operation);
        let mut attempts = 0;
        loop {
            match self.send_once(&target, body) {
                Err(Error::Service(service_error))
                    if is_retry
                        && service_error.is_throttling()
                        && self.retry_config.allows_throttle_retry(attempts) =>
                {
                    attempts += 1;
                    let delay = self.retry_config.throttle_delay(attempts);
                    #[cfg(feature = "tracing")]
                    tracing::warn!(%target, attempts, ?delay, "throughput exceeded, retrying");
                    self.sleep.sleep(delay);
                }
                result => return result,
            }
        }
    }

    /// Run `send` again on retryable errors, with exponential backoff.
    ///
    /// At most `max_write_retries` retries follow the first attempt; the last
    /// result is returned once the budget is spent.
    pub(crate) fn retry_write<T>(&self, mut send: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempt = 0;
        loop {
            let result = send();
            let error = match &result {
                Err(error) if error.is_retryable() => error,
                _ => return result,
            };
            if attempt >= self.retry_config.max_write_retries {
                return result;
            }
            let delay = self.retry_config.write_backoff(attempt);
            #[cfg(feature = "tracing")]
            tracing::warn!(%error, attempt, delay_ms = delay.as_millis() as u64, "retrying write");
            #[cfg(not(feature = "tracing"))]
            let _ = error;
            self.sleep.sleep(delay);
            attempt += 1;
        }
    }

    fn send_once(&self, target: &str, body: &str) -> Result<Vec<u8>> {
        let mut request = http::Request::builder()
            .method(http::Method::POST)
            .uri(format!("{}/", self.region.endpoint.trim_end_matches('/')))
            .header(http::header::CONTENT_TYPE, CONTENT_TYPE)
            .header("X-Amz-Target", target)
            .body(body.as_bytes().to_vec())?;
        self.signer
            .sign(&mut request, &self.credentials, &self.region)
            .map_err(Error::Signing)?;
        let response = self.transport.send(request).map_err(|error| {
            #[cfg(feature = "tracing")]
            tracing::error!(%target, %error, "transport failure");
            Error::Transport(error)
        })?;
        let status = response.status();
        let body = response.into_body();
        if status == http::StatusCode::OK {
            return Ok(body);
        }
        let service_error = ServiceError::from_response(status, &body);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            %target,
            status = status.as_u16(),
            code = %service_error.code,
            "service error"
        );
        Err(service_error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BoxError, PROVISIONED_THROUGHPUT_EXCEEDED, THROTTLING};

    use rstest::rstest;
    use std::sync::Mutex;
    use std::time::Duration;

    type Reply = Result<(u16, String), String>;

    #[derive(Debug, Default)]
    struct ScriptedTransport {
        replies: Mutex<Vec<Reply>>,
        requests: Mutex<Vec<http::Request<Vec<u8>>>>,
    }

    impl ScriptedTransport {
        fn new(mut replies: Vec<Reply>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
                ..Default::default()
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn send(
            &self,
            request: http::Request<Vec<u8>>,
        ) -> Result<http::Response<Vec<u8>>, BoxError> {
            self.requests.lock().unwrap().push(request);
            let (status, body) = self.replies.lock().unwrap().pop().unwrap()?;
            let response = http::Response::builder()
                .status(status)
                .body(body.into_bytes())?;
            Ok(response)
        }
    }

    #[derive(Debug, Default)]
    struct RecordingSleep(Mutex<Vec<Duration>>);

    impl Sleep for RecordingSleep {
        fn sleep(&self, duration: Duration) {
            self.0.lock().unwrap().push(duration);
        }
    }

    #[derive(Debug)]
    struct HeaderSigner;

    impl Signer for HeaderSigner {
        fn sign(
            &self,
            request: &mut http::Request<Vec<u8>>,
            credentials: &Credentials,
            region: &Region,
        ) -> Result<(), BoxError> {
            let value = format!("{}@{}", credentials.access_key, region.name);
            request.headers_mut().insert("Authorization", value.parse()?);
            Ok(())
        }
    }

    fn error_body(code: &str) -> String {
        format!(r#"{{"__type":"com.amazonaws.dynamodb.v20120810#{code}","message":"m"}}"#)
    }

    fn server(
        replies: Vec<Reply>,
    ) -> (Server, Arc<ScriptedTransport>, Arc<RecordingSleep>) {
        let transport = Arc::new(ScriptedTransport::new(replies));
        let sleep = Arc::new(RecordingSleep::default());
        let server = Server::new(
            Region::new("r", "https://example.test/"),
            Credentials::new("AKID", "secret"),
            transport.clone(),
        )
        .with_signer(HeaderSigner)
        .with_sleep(sleep.clone());
        (server, transport, sleep)
    }

    #[test]
    fn test_request_shape() {
        let (server, transport, _) = server(vec![Ok((200, "{}".to_string()))]);
        let body = server
            .raw_query_server(Operation::GetItem, r#"{"TableName":"t"}"#, false)
            .unwrap();
        assert_eq!(body, b"{}");
        let requests = transport.requests.lock().unwrap();
        let request = &requests[0];
        assert_eq!(request.method(), http::Method::POST);
        assert_eq!(request.uri(), "https://example.test/");
        assert_eq!(request.headers()["X-Amz-Target"], "DynamoDB_20120810.GetItem");
        assert_eq!(request.headers()["Content-Type"], CONTENT_TYPE);
        assert_eq!(request.headers()["Authorization"], "AKID@r");
        assert_eq!(request.body(), br#"{"TableName":"t"}"#);
    }

    #[test]
    fn test_service_version_override() {
        let (server, _, _) = server(vec![]);
        let server = server.with_service_version("DynamoDB_Local");
        assert_eq!(server.target(Operation::Scan), "DynamoDB_Local.Scan");
    }

    #[test]
    fn test_throttling_retried_linearly_when_opted_in() {
        let (server, transport, sleep) = server(vec![
            Ok((400, error_body(PROVISIONED_THROUGHPUT_EXCEEDED))),
            Ok((400, error_body(PROVISIONED_THROUGHPUT_EXCEEDED))),
            Ok((400, error_body(PROVISIONED_THROUGHPUT_EXCEEDED))),
            Ok((200, r#"{"Count":0}"#.to_string())),
        ]);
        let body = server.raw_query_server(Operation::Query, "{}", true).unwrap();
        assert_eq!(body, br#"{"Count":0}"#);
        assert_eq!(transport.requests.lock().unwrap().len(), 4);
        assert_eq!(
            *sleep.0.lock().unwrap(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(3),
            ]
        );
    }

    #[cfg(feature = "tracing")]
    #[test]
    #[tracing_test::traced_test]
    fn test_throttling_retry_is_logged() {
        let (server, _, _) = server(vec![
            Ok((400, error_body(PROVISIONED_THROUGHPUT_EXCEEDED))),
            Ok((200, "{}".to_string())),
        ]);
        server.raw_query_server(Operation::Query, "{}", true).unwrap();
        assert!(logs_contain("throughput exceeded, retrying"));
    }

    #[rstest]
    #[case::not_opted_in(PROVISIONED_THROUGHPUT_EXCEEDED, false)]
    #[case::other_code(THROTTLING, true)]
    fn test_no_throttling_retry(#[case] code: &str, #[case] is_retry: bool) {
        let (server, transport, sleep) = server(vec![Ok((400, error_body(code)))]);
        let error = server
            .raw_query_server(Operation::Query, "{}", is_retry)
            .unwrap_err();
        assert_eq!(error.service_error().unwrap().code, code);
        assert_eq!(transport.requests.lock().unwrap().len(), 1);
        assert!(sleep.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_throttling_retry_cap() {
        let (server, transport, _) = server(vec![
            Ok((400, error_body(PROVISIONED_THROUGHPUT_EXCEEDED))),
            Ok((400, error_body(PROVISIONED_THROUGHPUT_EXCEEDED))),
            Ok((400, error_body(PROVISIONED_THROUGHPUT_EXCEEDED))),
        ]);
        let server = server.with_retry_config(RetryConfig {
            max_throttle_retries: Some(2),
            ..Default::default()
        });
        let error = server.raw_query_server(Operation::Query, "{}", true).unwrap_err();
        assert!(error.service_error().unwrap().is_throttling());
        assert_eq!(transport.requests.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_transport_failure_propagates() {
        let (server, _, sleep) = server(vec![Err("connection reset".to_string())]);
        let error = server
            .raw_query_server(Operation::GetItem, "{}", true)
            .unwrap_err();
        assert!(matches!(error, Error::Transport(_)));
        assert!(sleep.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_retry_write_exhausts_budget() {
        let (server, transport, sleep) =
            server(vec![Ok((500, error_body("InternalServerError"))); 5]);
        let error = server
            .retry_write(|| server.raw_query_server(Operation::PutItem, "{}", false))
            .unwrap_err();
        assert_eq!(error.service_error().unwrap().status_code, 500);
        assert_eq!(transport.requests.lock().unwrap().len(), 5);
        assert_eq!(
            *sleep.0.lock().unwrap(),
            vec![
                Duration::from_millis(50),
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
            ]
        );
    }

    #[test]
    fn test_retry_write_stops_on_success() {
        let (server, transport, sleep) = server(vec![
            Ok((400, error_body(THROTTLING))),
            Ok((500, error_body("InternalServerError"))),
            Ok((200, "{}".to_string())),
        ]);
        server
            .retry_write(|| server.raw_query_server(Operation::PutItem, "{}", false))
            .unwrap();
        assert_eq!(transport.requests.lock().unwrap().len(), 3);
        assert_eq!(sleep.0.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_retry_write_skips_non_retryable() {
        let (server, transport, sleep) = server(vec![Ok((400, error_body("ValidationException")))]);
        let error = server
            .retry_write(|| server.raw_query_server(Operation::PutItem, "{}", false))
            .unwrap_err();
        assert_eq!(error.service_error().unwrap().code, "ValidationException");
        assert_eq!(transport.requests.lock().unwrap().len(), 1);
        assert!(sleep.0.lock().unwrap().is_empty());
    }
}
