//! Proxy module for parsing and checking proxies
//!
//! This module provides functionality for:
//! - Normalizing free-form proxy strings into validated addresses
//! - Probing proxies through an identity endpoint with per-probe timeouts
//! - Running concurrency-bounded batch checks with aggregate statistics

pub mod checker;
pub mod identity;
pub mod models;
pub mod parser;

pub use checker::{CheckerConfig, ProxyChecker};
pub use identity::IdentityReport;
pub use models::{BatchReport, ProbeOutcome, ProbeStatus, ProxyAddress, ProxyAuth, ProxyScheme};
pub use parser::{ParseError, ProxyParser};
