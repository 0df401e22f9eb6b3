//! Core types for site-harvest

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single network address targeted for retrieval
///
/// Identity is the literal address string. Endpoints are created once from
/// configuration and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint(String);

impl Endpoint {
    /// Create a new endpoint, rejecting empty or whitespace-only addresses
    pub fn new(address: impl Into<String>) -> Result<Self> {
        let address = address.into();
        if address.trim().is_empty() {
            return Err(Error::InvalidEndpoint(
                "endpoint address must not be empty".to_string(),
            ));
        }
        Ok(Self(address))
    }

    /// The literal address
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Endpoint {
    type Error = Error;

    fn try_from(address: String) -> Result<Self> {
        Self::new(address)
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.0
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification of a failed fetch attempt
///
/// This is the single source of truth for the retry policy: whether a kind
/// may be retried and whether the backoff interval precedes the next attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Endpoint unreachable or connection reset
    ConnectionFailure,
    /// Attempt exceeded the per-attempt timeout
    Timeout,
    /// Response received but the payload was empty
    EmptyResponse,
    /// Response received with an error-indicating status code
    HttpStatusError,
    /// Anything else
    UnexpectedError,
}

impl ErrorKind {
    /// Whether another attempt is permitted within the attempt budget
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::ConnectionFailure | ErrorKind::Timeout | ErrorKind::EmptyResponse => true,
            ErrorKind::HttpStatusError | ErrorKind::UnexpectedError => false,
        }
    }

    /// Whether the backoff interval is slept before the next attempt
    ///
    /// An empty response is retried straight away.
    pub fn backs_off(&self) -> bool {
        matches!(self, ErrorKind::ConnectionFailure | ErrorKind::Timeout)
    }

    /// Stable snake_case label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConnectionFailure => "connection_failure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::EmptyResponse => "empty_response",
            ErrorKind::HttpStatusError => "http_status_error",
            ErrorKind::UnexpectedError => "unexpected_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final verdict of fetching one endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A non-empty payload was retrieved
    Success {
        /// Raw response body
        payload: Vec<u8>,
    },
    /// Every permitted attempt failed, or a fatal failure aborted the fetch
    Failure {
        /// Kind of the last observed failure
        kind: ErrorKind,
        /// Human-readable description of the last failure
        message: String,
    },
}

impl FetchOutcome {
    /// Returns true for `Success`
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    /// Failure kind, if this is a failure
    pub fn failure_kind(&self) -> Option<ErrorKind> {
        match self {
            FetchOutcome::Success { .. } => None,
            FetchOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}

/// A successfully fetched endpoint and its payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectedRecord {
    endpoint: Endpoint,
    payload: Vec<u8>,
}

impl CollectedRecord {
    /// Create a record, or `None` if the payload is empty
    pub fn new(endpoint: Endpoint, payload: Vec<u8>) -> Option<Self> {
        if payload.is_empty() {
            return None;
        }
        Some(Self { endpoint, payload })
    }

    /// The endpoint the payload came from
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The raw payload (never empty)
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Ordered collection of records produced by one collection run
///
/// Order is the endpoint list order restricted to successes. No
/// deduplication happens here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultSet {
    records: Vec<CollectedRecord>,
}

impl ResultSet {
    /// Create an empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record at the end
    pub fn push(&mut self, record: CollectedRecord) {
        self.records.push(record);
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no endpoint succeeded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in collection order
    pub fn iter(&self) -> std::slice::Iter<'_, CollectedRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a CollectedRecord;
    type IntoIter = std::slice::Iter<'a, CollectedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<CollectedRecord> for ResultSet {
    fn from_iter<I: IntoIterator<Item = CollectedRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// An endpoint the collector gave up on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedEndpoint {
    /// The endpoint that failed
    pub endpoint: Endpoint,
    /// Kind of the final failure
    pub kind: ErrorKind,
    /// Description of the final failure
    pub message: String,
}

/// Result set plus the endpoints that were skipped
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionReport {
    /// Successfully collected records, in endpoint order
    pub results: ResultSet,
    /// Failed endpoints, in endpoint order
    pub skipped: Vec<SkippedEndpoint>,
}

/// What a finished run reports once its payloads have been written and dropped
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of records written
    pub collected: usize,
    /// Failed endpoints, in endpoint order
    pub skipped: Vec<SkippedEndpoint>,
}

impl From<CollectionReport> for RunSummary {
    fn from(report: CollectionReport) -> Self {
        Self {
            collected: report.results.len(),
            skipped: report.skipped,
        }
    }
}
