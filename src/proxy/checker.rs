//! Proxy checker module for probing proxies against an identity endpoint

use crate::proxy::identity::IdentityReport;
use crate::proxy::models::{BatchReport, ProbeOutcome, ProxyAddress, ProxyScheme};
use crate::proxy::parser::ProxyParser;
use crate::Result;
use futures::stream::{self, StreamExt};
use log::{debug, info};
use reqwest::{Client, Proxy as ReqwestProxy};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Default timeout for proxy checks in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of concurrent checks
const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Default identity endpoint to test proxies against
const DEFAULT_TEST_URL: &str = "http://ip-api.com/json/";

/// Error string for input that fails normalization
const INVALID_PROXY_FORMAT: &str = "invalid proxy format";

/// Error string for probes that exceed their deadline
const CONNECTION_TIMEOUT: &str = "connection timeout";

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Hard deadline for each probe, connect plus transfer
    pub timeout: Duration,
    /// Number of simultaneously in-flight probes
    pub max_concurrent: usize,
    /// Identity endpoint URL to test proxies against
    pub test_url: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            test_url: DEFAULT_TEST_URL.to_string(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_test_url(mut self, url: String) -> Self {
        self.test_url = url;
        self
    }
}

/// Proxy checker for validating proxies
#[derive(Debug, Clone)]
pub struct ProxyChecker {
    config: CheckerConfig,
}

impl ProxyChecker {
    /// Create a new proxy checker with default configuration
    pub fn new() -> Self {
        Self {
            config: CheckerConfig::default(),
        }
    }

    /// Create a new proxy checker with custom configuration
    pub fn with_config(config: CheckerConfig) -> Self {
        Self { config }
    }

    /// Check a single proxy string.
    ///
    /// Input that fails normalization yields a failed outcome without any
    /// network attempt.
    pub async fn check_single(&self, raw: &str) -> ProbeOutcome {
        match ProxyParser::normalize(raw) {
            Ok(address) => self.probe(&address, raw).await,
            Err(err) => {
                debug!("rejected proxy string {:?}: {}", raw, err);
                ProbeOutcome::failed(raw, INVALID_PROXY_FORMAT)
            }
        }
    }

    /// Probe one validated address through the identity endpoint.
    ///
    /// Performs exactly one outbound attempt. Every failure is captured
    /// into the outcome; nothing propagates.
    pub async fn probe(&self, address: &ProxyAddress, source: &str) -> ProbeOutcome {
        let client = match self.create_client(address) {
            Ok(client) => client,
            Err(err) => {
                return ProbeOutcome::failed(source, format!("proxy configuration error: {}", err))
            }
        };

        let start = Instant::now();
        let exchange = async {
            let response = client.get(&self.config.test_url).send().await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };

        match tokio::time::timeout(self.config.timeout, exchange).await {
            Ok(Ok((status, body))) => {
                // timer stops once the full body has arrived
                let elapsed = round_secs(start.elapsed().as_secs_f64());

                if !status.is_success() {
                    return ProbeOutcome::failed(source, format!("HTTP {}", status));
                }

                match IdentityReport::parse(&body) {
                    Some(report) if report.is_failure() => {
                        ProbeOutcome::failed(source, report.failure_message())
                    }
                    Some(report) => {
                        debug!("{} egress {}", source, report);
                        ProbeOutcome::working(source, elapsed).with_identity(report)
                    }
                    // endpoint reached but the body is not identity data
                    None => ProbeOutcome::working(source, elapsed),
                }
            }
            Ok(Err(err)) => ProbeOutcome::failed(source, describe_request_error(&err)),
            Err(_) => ProbeOutcome::failed(source, CONNECTION_TIMEOUT),
        }
    }

    /// Check a batch of proxy strings concurrently.
    ///
    /// At most `max_concurrent` probes (clamped to at least 1) are in their
    /// network phase at once, each with its own deadline. Results come back
    /// in input order regardless of completion order.
    pub async fn check_batch(&self, proxies: &[String]) -> BatchReport {
        let max_concurrent = self.config.max_concurrent.max(1);
        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        let outcomes = stream::iter(proxies)
            .map(|raw| {
                let semaphore = Arc::clone(&semaphore);
                let checker = self.clone();
                async move {
                    match ProxyParser::normalize(raw) {
                        Ok(address) => {
                            // Semaphore acquire only fails if the semaphore is
                            // closed, which cannot happen while we hold the Arc.
                            let _permit = semaphore
                                .acquire()
                                .await
                                .expect("Semaphore closed unexpectedly");
                            checker.probe(&address, raw).await
                        }
                        Err(err) => {
                            debug!("rejected proxy string {:?}: {}", raw, err);
                            ProbeOutcome::failed(raw.as_str(), INVALID_PROXY_FORMAT)
                        }
                    }
                }
            })
            .buffered(max_concurrent)
            .collect::<Vec<_>>()
            .await;

        let report = BatchReport::from_outcomes(outcomes);
        info!(
            "batch check finished: {}/{} working ({:.2}%)",
            report.working, report.total, report.success_rate
        );
        report
    }

    /// Create a reqwest client routed through the proxy
    fn create_client(&self, address: &ProxyAddress) -> Result<Client> {
        let proxy_url = address.url();

        let reqwest_proxy = match address.scheme {
            ProxyScheme::Http | ProxyScheme::Https => ReqwestProxy::http(&proxy_url)?,
            ProxyScheme::Socks4 | ProxyScheme::Socks5 => ReqwestProxy::all(&proxy_url)?,
        };

        let client = Client::builder()
            .proxy(reqwest_proxy)
            .timeout(self.config.timeout)
            .build()?;

        Ok(client)
    }
}

impl Default for ProxyChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Round a second count to two decimal places
fn round_secs(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

/// Classify a transport error into a human-readable message
fn describe_request_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        CONNECTION_TIMEOUT.to_string()
    } else if err.is_connect() {
        format!("connection failed: {}", root_cause(err))
    } else {
        format!("request failed: {}", root_cause(err))
    }
}

/// Innermost cause in an error chain
fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut cause: &(dyn std::error::Error) = err;
    while let Some(source) = cause.source() {
        cause = source;
    }
    cause.to_string()
}
