//! Resolver configuration.

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Settings a [`ResultProducer`](super::ResultProducer) applies to every
/// resolution.
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Registry name of the load-balancing policy to build.
    pub lb_policy_name: String,
    /// Port used when the target does not carry one.
    pub default_port: u16,
    /// Balancer endpoints appended after the resolved backends.
    pub balancer_addresses: Vec<SocketAddr>,
    /// Upper bound on backends taken from a single resolution.
    pub max_addresses: usize,
    /// How long a single resolution may take, in milliseconds.
    pub resolve_timeout_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            lb_policy_name: "pick_first".to_string(),
            default_port: 443,
            balancer_addresses: Vec::new(),
            max_addresses: 256,
            resolve_timeout_ms: 10_000,
        }
    }
}

impl ResolverConfig {
    /// Create a new config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the load-balancing policy name.
    pub fn lb_policy_name(mut self, name: impl Into<String>) -> Self {
        self.lb_policy_name = name.into();
        self
    }

    /// Set the default port.
    pub fn default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    /// Add a balancer endpoint.
    pub fn balancer(mut self, addr: SocketAddr) -> Self {
        self.balancer_addresses.push(addr);
        self
    }

    /// Set the per-resolution backend limit.
    pub fn max_addresses(mut self, max: usize) -> Self {
        self.max_addresses = max;
        self
    }

    /// Set the resolution timeout, rounded up to whole milliseconds.
    pub fn resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout_ms =
            timeout.as_nanos().div_ceil(1_000_000).try_into().unwrap_or(u64::MAX);
        self
    }

    /// The resolution timeout as a `Duration`.
    pub fn resolve_timeout_duration(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    /// Parse a JSON document.
    pub fn from_json(json: &str) -> Result<Self, NetError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| NetError::InvalidConfig { reason: e.to_string() })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, NetError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).config_context(path)?;
        tracing::debug!(path = %path.display(), "loaded resolver config");
        Self::from_json(&json)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, NetError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| NetError::InvalidConfig { reason: e.to_string() })
    }

    pub fn validate(&self) -> Result<(), NetError> {
        if self.lb_policy_name.trim().is_empty() {
            return Err(NetError::InvalidConfig { reason: "lb_policy_name is empty".into() });
        }
        if self.max_addresses == 0 {
            return Err(NetError::InvalidConfig { reason: "max_addresses must be > 0".into() });
        }
        if self.resolve_timeout_ms == 0 {
            return Err(NetError::InvalidConfig { reason: "resolve_timeout_ms must be > 0".into() });
        }
        Ok(())
    }
}
