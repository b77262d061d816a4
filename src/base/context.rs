//! Ergonomic error context helpers.
//!
//! Extension traits that turn IO failures into context-rich `NetError`
//! variants.

use crate::base::neterror::NetError;
use std::io;
use std::path::Path;

/// Extension trait for adding context to IO Results.
pub trait IoResultExt<T> {
    /// Add DNS resolution context to an IO error.
    ///
    /// # Example
    /// ```ignore
    /// use resolvnet::base::context::IoResultExt;
    ///
    /// let addrs = ("example.com", 0).to_socket_addrs().dns_context("example.com")?;
    /// // Error: "Name example.com not resolved: ..."
    /// ```
    fn dns_context(self, domain: &str) -> Result<T, NetError>;

    /// Add configuration-file context to an IO error.
    fn config_context(self, path: &Path) -> Result<T, NetError>;
}

impl<T> IoResultExt<T> for Result<T, io::Error> {
    fn dns_context(self, domain: &str) -> Result<T, NetError> {
        self.map_err(|e| NetError::dns_failed(domain, e))
    }

    fn config_context(self, path: &Path) -> Result<T, NetError> {
        self.map_err(|e| NetError::InvalidConfig {
            reason: format!("{}: {}", path.display(), e),
        })
    }
}
