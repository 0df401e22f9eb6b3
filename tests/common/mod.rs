//! Common test utilities for site-harvest integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use site_harvest::{AttemptError, Endpoint, ErrorKind, FetchConfig, Transport};

/// One scripted attempt result
#[derive(Clone, Debug)]
pub enum Reply {
    /// Successful response with this body
    Body(&'static str),
    /// Failed attempt of this kind
    Fail(ErrorKind),
}

/// Transport replaying a per-address script and recording every attempt
///
/// Once an address's script runs out, further attempts fail with
/// `ConnectionFailure`.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    log: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    /// Empty transport: every address is unreachable
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a script for `address`
    pub fn script(self, address: &str, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(address.to_string(), VecDeque::from(replies));
        self
    }

    /// Addresses in the order they were attempted
    pub fn attempts(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Number of attempts made against `address`
    pub fn attempts_for(&self, address: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.as_str() == address)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn attempt(&self, endpoint: &Endpoint) -> Result<Vec<u8>, AttemptError> {
        self.log.lock().unwrap().push(endpoint.to_string());
        let reply = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(endpoint.as_str())
            .and_then(|script| script.pop_front());
        match reply {
            Some(Reply::Body(body)) => Ok(body.as_bytes().to_vec()),
            Some(Reply::Fail(kind)) => Err(AttemptError::new(kind, "scripted failure")),
            None => Err(AttemptError::new(
                ErrorKind::ConnectionFailure,
                "connection refused",
            )),
        }
    }
}

/// Fetch settings with short timings so retries do not slow the suite down
pub fn fast_fetch_config() -> FetchConfig {
    FetchConfig {
        max_attempts: 3,
        timeout: Duration::from_millis(300),
        backoff: Duration::from_millis(10),
        user_agent: None,
    }
}

/// Build endpoints from literal addresses
pub fn endpoints(addresses: &[&str]) -> Vec<Endpoint> {
    addresses
        .iter()
        .map(|a| Endpoint::new(*a).unwrap())
        .collect()
}
