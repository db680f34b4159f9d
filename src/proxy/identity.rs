//! Identity endpoint response contract
//!
//! The test endpoint (ip-api.com by default) echoes the apparent egress
//! identity of whoever calls it as a JSON document. Services of this kind
//! also embed their own failure state in the body, so a parsed report must
//! be checked with [`IdentityReport::is_failure`] before it is trusted.

use serde::Deserialize;
use std::fmt;

/// Egress identity as reported by the test endpoint
///
/// All fields are optional; a partial document still counts as a usable
/// report. The IP arrives as `query` on ip-api.com, `ip` elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct IdentityReport {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "query", alias = "ip")]
    pub ip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl IdentityReport {
    /// Parse an endpoint response body, `None` if it is not identity JSON
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Whether the endpoint reported its own lookup as failed
    pub fn is_failure(&self) -> bool {
        self.status.as_deref() == Some("fail")
    }

    /// Error description for a failure report
    pub fn failure_message(&self) -> String {
        match &self.message {
            Some(message) => format!("identity endpoint error: {}", message),
            None => "identity endpoint error".to_string(),
        }
    }
}

impl fmt::Display for IdentityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ip = self.ip.as_deref().unwrap_or("unknown ip");
        match (&self.city, &self.country) {
            (Some(city), Some(country)) => write!(f, "{} ({}, {})", ip, city, country),
            (Some(city), None) => write!(f, "{} ({})", ip, city),
            (None, Some(country)) => write!(f, "{} ({})", ip, country),
            (None, None) => write!(f, "{}", ip),
        }
    }
}
