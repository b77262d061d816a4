//! Async resolver on hickory-dns.

use super::lookup;
use super::{Name, Resolve, Resolving};
use hickory_resolver::{
    config::{LookupIpStrategy, ResolverConfig as HickoryConfig},
    name_server::TokioConnectionProvider,
    TokioResolver,
};
use std::io;
use std::net::IpAddr;
use std::sync::Arc;

/// Resolver backed by hickory-dns, querying A and AAAA together.
///
/// Clones share one hickory resolver, and with it the connection pool and
/// record cache, so a producer per target can reuse a single instance.
#[derive(Debug, Clone)]
pub struct HickoryResolver {
    resolver: Arc<TokioResolver>,
}

impl HickoryResolver {
    /// Uses the system configuration (`/etc/resolv.conf` or the platform
    /// equivalent), or hickory's defaults when it cannot be read.
    pub fn new() -> Self {
        let mut builder = TokioResolver::builder_tokio().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "system DNS config unreadable, using hickory defaults");
            TokioResolver::builder_with_config(
                HickoryConfig::default(),
                TokioConnectionProvider::default(),
            )
        });
        builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
        Self { resolver: Arc::new(builder.build()) }
    }

    /// Uses an explicit upstream configuration.
    pub fn with_config(config: HickoryConfig) -> Self {
        let mut builder =
            TokioResolver::builder_with_config(config, TokioConnectionProvider::default());
        builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
        Self { resolver: Arc::new(builder.build()) }
    }
}

impl Default for HickoryResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolve for HickoryResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = Arc::clone(&self.resolver);
        lookup::drive(name, "hickory", move |host| async move {
            let answer = resolver.lookup_ip(&*host).await.map_err(|e| io::Error::other(e.to_string()))?;
            Ok(answer.iter().collect::<Vec<IpAddr>>())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    #[tokio::test]
    async fn test_ip_literal_needs_no_upstream() {
        let resolver = HickoryResolver::with_config(HickoryConfig::new());

        let addrs: Vec<_> = resolver.resolve(Name::new("10.2.3.4")).await.unwrap().collect();
        assert_eq!(addrs, vec!["10.2.3.4:0".parse::<SocketAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn test_no_upstreams_fails_with_host() {
        // An empty config has no name servers to ask.
        let resolver = HickoryResolver::with_config(HickoryConfig::new());

        let err = match resolver.resolve(Name::new("svc.invalid")).await {
            Err(e) => e,
            Ok(_) => panic!("Expected resolution failure"),
        };
        assert!(err.is_resolution_error());
        assert!(err.to_string().contains("svc.invalid"));
    }

    #[tokio::test]
    async fn test_clones_share_resolver() {
        let r1 = HickoryResolver::with_config(HickoryConfig::new());
        let r2 = r1.clone();
        assert!(Arc::ptr_eq(&r1.resolver, &r2.resolver));
    }
}
