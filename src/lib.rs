//! # site-harvest
//!
//! Sequential, failure-tolerant collection of web pages into a CSV table.
//!
//! ## Pipeline
//!
//! - **Resilient fetcher** - one endpoint, bounded attempts, every failure
//!   classified into an [`ErrorKind`] that decides retry or abort
//! - **Batch collector** - walks the endpoint list in order, keeps the
//!   successes, logs and skips the rest
//! - **Result writer** - persists the successes as a `url,data` CSV file
//!
//! ## Quick Start
//!
//! ```no_run
//! use site_harvest::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         endpoints: vec!["https://www.example.com/".to_string()],
//!         ..Default::default()
//!     };
//!
//!     let summary = site_harvest::run(&config).await?;
//!     println!("collected {} pages", summary.collected);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Sequential batch collection
pub mod collector;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Single-endpoint fetching over a pluggable transport
pub mod fetcher;
/// Retry logic with a fixed backoff
pub mod retry;
/// Core types
pub mod types;
/// CSV output
pub mod writer;

use std::path::Path;

// Re-export commonly used types
pub use collector::BatchCollector;
pub use config::{Config, FetchConfig, OutputConfig};
pub use error::{Error, Result, WriteError};
pub use fetcher::{AttemptError, Fetch, HttpTransport, ResilientFetcher, Transport};
pub use types::{
    CollectedRecord, CollectionReport, Endpoint, ErrorKind, FetchOutcome, ResultSet, RunSummary,
    SkippedEndpoint,
};

/// Run a full collection over HTTP as described by `config`
///
/// Validates the configuration, fetches every endpoint, and writes the
/// successes to `config.output.path`. Failed endpoints are reported in the
/// returned [`RunSummary`], never as an error.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the HTTP client cannot
/// be built, or the output file cannot be written.
pub async fn run(config: &Config) -> Result<RunSummary> {
    let endpoints = config.endpoint_list()?;
    let fetcher = ResilientFetcher::http(&config.fetch)?;
    run_with_fetcher(fetcher, &endpoints, config.output_path()).await
}

/// Run a collection with a caller-supplied fetcher
///
/// The collected payloads are dropped once written; only the summary is
/// returned.
///
/// # Errors
///
/// Returns [`Error::Write`] if the output file cannot be written.
pub async fn run_with_fetcher<F: Fetch>(
    fetcher: F,
    endpoints: &[Endpoint],
    destination: impl AsRef<Path>,
) -> Result<RunSummary> {
    let collector = BatchCollector::new(fetcher);
    let report = collector.collect_report(endpoints).await;
    writer::write(&report.results, destination)?;
    Ok(RunSummary::from(report))
}
