//! Proxy Probe - Proxy Checker
//!
//! Verifies whether HTTP/HTTPS/SOCKS proxies are alive and usable by
//! routing a probe request through them to an identity endpoint, measuring
//! latency and extracting the apparent egress IP and location.

pub mod proxy;

pub use proxy::*;

use log::warn;
use std::env;
use std::str::FromStr;

/// Application result type
pub type Result<T> = anyhow::Result<T>;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Identity endpoint used for probes
    pub test_url: String,
    /// Default per-probe timeout in seconds
    pub default_timeout: u64,
    /// Default number of concurrent probes in a batch
    pub default_max_concurrent: usize,
    /// Maximum number of proxies accepted in one batch
    pub max_batch_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            test_url: "http://ip-api.com/json/".to_string(),
            default_timeout: 10,
            default_max_concurrent: 10,
            max_batch_size: 100,
        }
    }
}

impl Config {
    /// Load configuration from `PROXY_PROBE_*` environment variables.
    ///
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            test_url: env::var("PROXY_PROBE_TEST_URL").unwrap_or(defaults.test_url),
            default_timeout: env_parse("PROXY_PROBE_TIMEOUT", defaults.default_timeout),
            default_max_concurrent: env_parse(
                "PROXY_PROBE_MAX_CONCURRENT",
                defaults.default_max_concurrent,
            ),
            max_batch_size: env_parse("PROXY_PROBE_MAX_BATCH", defaults.max_batch_size),
        }
    }
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(value) => match value.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("ignoring unparseable {}={:?}", name, value);
                default
            }
        },
        Err(_) => default,
    }
}
