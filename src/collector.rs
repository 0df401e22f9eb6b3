//! Sequential batch collection over an endpoint list

use crate::fetcher::Fetch;
use crate::types::{
    CollectedRecord, CollectionReport, Endpoint, ErrorKind, FetchOutcome, ResultSet,
    SkippedEndpoint,
};

/// Drives a [`Fetch`] implementation over an ordered endpoint list
///
/// Endpoints are fetched one at a time, in list order. A failing endpoint is
/// logged and skipped; it never aborts the batch.
pub struct BatchCollector<F> {
    fetcher: F,
}

impl<F: Fetch> BatchCollector<F> {
    /// Create a collector around `fetcher`
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// The wrapped fetcher
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch every endpoint and return the successes in endpoint order
    pub async fn collect(&self, endpoints: &[Endpoint]) -> ResultSet {
        self.collect_report(endpoints).await.results
    }

    /// Fetch every endpoint, returning successes and skipped endpoints
    pub async fn collect_report(&self, endpoints: &[Endpoint]) -> CollectionReport {
        let max_attempts = self.fetcher.default_max_attempts();
        let mut report = CollectionReport::default();

        tracing::info!(endpoints = endpoints.len(), "Starting collection run");

        for endpoint in endpoints {
            match self.fetcher.fetch(endpoint, max_attempts).await {
                FetchOutcome::Success { payload } => {
                    let length = payload.len();
                    match CollectedRecord::new(endpoint.clone(), payload) {
                        Some(record) => {
                            tracing::info!(endpoint = %endpoint, length, "Data collected");
                            report.results.push(record);
                        }
                        None => {
                            // A fetcher that reports success with no payload broke its contract
                            tracing::warn!(endpoint = %endpoint, "Skipping endpoint: success without payload");
                            report.skipped.push(SkippedEndpoint {
                                endpoint: endpoint.clone(),
                                kind: ErrorKind::EmptyResponse,
                                message: "success reported with empty payload".to_string(),
                            });
                        }
                    }
                }
                FetchOutcome::Failure { kind, message } => {
                    tracing::warn!(
                        endpoint = %endpoint,
                        kind = %kind,
                        error = %message,
                        "Skipping endpoint due to repeated errors"
                    );
                    report.skipped.push(SkippedEndpoint {
                        endpoint: endpoint.clone(),
                        kind,
                        message,
                    });
                }
            }
        }

        tracing::info!(
            collected = report.results.len(),
            skipped = report.skipped.len(),
            "Collection run finished"
        );

        report
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Fetcher returning a fixed outcome per address and recording calls
    struct CannedFetcher {
        outcomes: HashMap<&'static str, FetchOutcome>,
        calls: std::sync::Mutex<Vec<(String, u32)>>,
    }

    impl CannedFetcher {
        fn new(outcomes: Vec<(&'static str, FetchOutcome)>) -> Self {
            Self {
                outcomes: outcomes.into_iter().collect(),
                calls: std::sync::Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetch for CannedFetcher {
        async fn fetch(&self, endpoint: &Endpoint, max_attempts: u32) -> FetchOutcome {
            self.calls
                .lock()
                .unwrap()
                .push((endpoint.to_string(), max_attempts));
            self.outcomes
                .get(endpoint.as_str())
                .cloned()
                .unwrap_or(FetchOutcome::Failure {
                    kind: ErrorKind::UnexpectedError,
                    message: "no canned outcome".to_string(),
                })
        }
    }

    fn ok(body: &str) -> FetchOutcome {
        FetchOutcome::Success {
            payload: body.as_bytes().to_vec(),
        }
    }

    fn fail(kind: ErrorKind) -> FetchOutcome {
        FetchOutcome::Failure {
            kind,
            message: "scripted".to_string(),
        }
    }

    fn endpoints(addrs: &[&str]) -> Vec<Endpoint> {
        addrs.iter().map(|a| Endpoint::new(*a).unwrap()).collect()
    }

    #[tokio::test]
    async fn failed_endpoint_is_skipped_and_order_kept() {
        let collector = BatchCollector::new(CannedFetcher::new(vec![
            ("A", ok("pA")),
            ("B", fail(ErrorKind::ConnectionFailure)),
            ("C", ok("pC")),
        ]));

        let results = collector.collect(&endpoints(&["A", "B", "C"])).await;

        let rows: Vec<(&str, &[u8])> = results
            .iter()
            .map(|r| (r.endpoint().as_str(), r.payload()))
            .collect();
        assert_eq!(rows, vec![("A", &b"pA"[..]), ("C", &b"pC"[..])]);
    }

    #[tokio::test]
    async fn empty_endpoint_list_gives_empty_result_set() {
        let collector = BatchCollector::new(CannedFetcher::new(vec![]));

        let report = collector.collect_report(&[]).await;

        assert!(report.results.is_empty());
        assert!(report.skipped.is_empty());
        assert!(collector.fetcher().calls().is_empty());
    }

    #[tokio::test]
    async fn every_endpoint_is_fetched_once_in_order_with_default_budget() {
        let collector = BatchCollector::new(CannedFetcher::new(vec![
            ("A", fail(ErrorKind::HttpStatusError)),
            ("B", fail(ErrorKind::Timeout)),
            ("C", ok("pC")),
        ]));

        collector.collect(&endpoints(&["A", "B", "C"])).await;

        assert_eq!(
            collector.fetcher().calls(),
            vec![
                ("A".to_string(), 3),
                ("B".to_string(), 3),
                ("C".to_string(), 3)
            ]
        );
    }

    #[tokio::test]
    async fn report_lists_skipped_endpoints_with_kind() {
        let collector = BatchCollector::new(CannedFetcher::new(vec![
            ("A", fail(ErrorKind::HttpStatusError)),
            ("B", ok("pB")),
            ("C", fail(ErrorKind::EmptyResponse)),
        ]));

        let report = collector.collect_report(&endpoints(&["A", "B", "C"])).await;

        assert_eq!(report.results.len(), 1);
        let skipped: Vec<(&str, ErrorKind)> = report
            .skipped
            .iter()
            .map(|s| (s.endpoint.as_str(), s.kind))
            .collect();
        assert_eq!(
            skipped,
            vec![
                ("A", ErrorKind::HttpStatusError),
                ("C", ErrorKind::EmptyResponse)
            ]
        );
    }

    #[tokio::test]
    async fn duplicate_endpoints_are_not_deduplicated() {
        let collector = BatchCollector::new(CannedFetcher::new(vec![("A", ok("pA"))]));

        let results = collector.collect(&endpoints(&["A", "A"])).await;

        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn success_without_payload_is_skipped() {
        let collector = BatchCollector::new(CannedFetcher::new(vec![("A", ok(""))]));

        let report = collector.collect_report(&endpoints(&["A"])).await;

        assert!(report.results.is_empty());
        assert_eq!(report.skipped[0].kind, ErrorKind::EmptyResponse);
    }
}
