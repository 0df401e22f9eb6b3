//! Resilient single-endpoint fetching
//!
//! A [`Transport`] performs exactly one retrieval attempt. The
//! [`ResilientFetcher`] wraps it with the per-attempt timeout, the
//! non-empty payload check and the retry policy, and reduces everything to a
//! single [`FetchOutcome`].

use async_trait::async_trait;
use std::time::Duration;
use tracing::Instrument;

use crate::config::FetchConfig;
use crate::error::Result;
use crate::retry::{IsRetryable, RetryPolicy, run_with_retry};
use crate::types::{Endpoint, ErrorKind, FetchOutcome};

/// A classified failure of one attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptError {
    /// Failure classification
    pub kind: ErrorKind,
    /// Human-readable description
    pub message: String,
}

impl AttemptError {
    /// Create a new attempt error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for AttemptError {}

impl IsRetryable for AttemptError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn backs_off(&self) -> bool {
        self.kind.backs_off()
    }
}

/// Abstraction over a single network retrieval, enabling testability.
///
/// Implementations return the body of a successful response, ideally as
/// UTF-8 text. They need not check for an empty body or enforce the timeout;
/// the fetcher does both.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one attempt against `endpoint`
    async fn attempt(&self, endpoint: &Endpoint) -> std::result::Result<Vec<u8>, AttemptError>;
}

/// Production [`Transport`] issuing plain HTTP GET requests.
///
/// Bodies are decoded using the charset from the `Content-Type` header
/// (UTF-8 when absent) and handed on as UTF-8. Undecodable sequences become
/// U+FFFD rather than failing the attempt.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build an HTTP transport from the fetch configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        Ok(Self::with_client(builder.build()?))
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn attempt(&self, endpoint: &Endpoint) -> std::result::Result<Vec<u8>, AttemptError> {
        let url = parse_http_url(endpoint)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let response = response
            .error_for_status()
            .map_err(|e| classify_reqwest_error(&e))?;

        let body = response
            .text()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        Ok(body.into_bytes())
    }
}

/// Parse an endpoint as an absolute http(s) URL with a host.
///
/// Anything else is an [`ErrorKind::UnexpectedError`], so a malformed entry
/// is skipped after a single attempt instead of aborting the batch.
fn parse_http_url(endpoint: &Endpoint) -> std::result::Result<url::Url, AttemptError> {
    let unexpected = |message: String| AttemptError::new(ErrorKind::UnexpectedError, message);

    let parsed = url::Url::parse(endpoint.as_str())
        .map_err(|e| unexpected(format!("invalid URL '{}': {}", endpoint, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(unexpected(format!(
                "URL scheme '{}' is not allowed; only http and https are supported",
                scheme
            )));
        }
    }

    if parsed.host_str().is_none() {
        return Err(unexpected(format!("URL '{}' has no host", endpoint)));
    }

    Ok(parsed)
}

/// Map a reqwest error onto the failure taxonomy.
pub fn classify_reqwest_error(e: &reqwest::Error) -> AttemptError {
    let kind = if e.is_timeout() {
        ErrorKind::Timeout
    } else if e.is_status() {
        ErrorKind::HttpStatusError
    } else if e.is_connect() || e.is_request() || e.is_body() {
        ErrorKind::ConnectionFailure
    } else {
        ErrorKind::UnexpectedError
    };
    AttemptError::new(kind, e.to_string())
}

/// Anything that can turn an endpoint into a [`FetchOutcome`].
///
/// The batch collector depends on this trait rather than on
/// [`ResilientFetcher`] so tests can inject canned outcomes.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch `endpoint` with at most `max_attempts` attempts
    async fn fetch(&self, endpoint: &Endpoint, max_attempts: u32) -> FetchOutcome;

    /// Attempt budget used when the caller does not specify one
    fn default_max_attempts(&self) -> u32 {
        crate::config::default_max_attempts()
    }
}

/// Bounded-retry fetcher over a [`Transport`]
pub struct ResilientFetcher<T> {
    transport: T,
    timeout: Duration,
    backoff: Duration,
    max_attempts: u32,
}

impl ResilientFetcher<HttpTransport> {
    /// Fetcher backed by a real HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn http(config: &FetchConfig) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(config)?, config))
    }
}

impl<T: Transport> ResilientFetcher<T> {
    /// Create a fetcher over `transport` with timeout, backoff and default
    /// attempt budget taken from `config`
    pub fn new(transport: T, config: &FetchConfig) -> Self {
        Self {
            transport,
            timeout: config.timeout,
            backoff: config.backoff,
            max_attempts: config.max_attempts.max(1),
        }
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One bounded attempt, including the empty-payload check.
    async fn attempt_once(
        &self,
        endpoint: &Endpoint,
        attempt: u32,
    ) -> std::result::Result<Vec<u8>, AttemptError> {
        let payload = match tokio::time::timeout(self.timeout, self.transport.attempt(endpoint)).await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(AttemptError::new(
                    ErrorKind::Timeout,
                    format!(
                        "attempt exceeded {}ms timeout",
                        self.timeout.as_millis()
                    ),
                ));
            }
        };

        if payload.is_empty() {
            return Err(AttemptError::new(
                ErrorKind::EmptyResponse,
                format!("empty response on attempt {}", attempt),
            ));
        }

        Ok(payload)
    }
}

#[async_trait]
impl<T: Transport> Fetch for ResilientFetcher<T> {
    async fn fetch(&self, endpoint: &Endpoint, max_attempts: u32) -> FetchOutcome {
        let policy = RetryPolicy::new(max_attempts, self.backoff);

        let span = tracing::info_span!("fetch", endpoint = %endpoint);
        let result = run_with_retry(&policy, |attempt| self.attempt_once(endpoint, attempt))
            .instrument(span)
            .await;

        match result {
            Ok(payload) => {
                tracing::info!(endpoint = %endpoint, bytes = payload.len(), "Fetched endpoint");
                FetchOutcome::Success { payload }
            }
            Err(AttemptError { kind, message }) => FetchOutcome::Failure { kind, message },
        }
    }

    fn default_max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
