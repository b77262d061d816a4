//! Core resolution types and the `Resolve` trait.

use crate::base::neterror::NetError;
use dashmap::DashMap;
use std::{
    fmt,
    future::Future,
    net::{IpAddr, SocketAddr},
    pin::Pin,
    sync::Arc,
};

/// A host name to resolve.
#[derive(Clone, Hash, Eq, PartialEq)]
pub struct Name {
    host: Box<str>,
}

impl Name {
    #[inline]
    pub fn new(host: impl Into<Box<str>>) -> Self {
        Self { host: host.into() }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.host
    }

    /// The host parsed as an IP literal, if it is one. Brackets around IPv6
    /// literals are accepted.
    pub fn ip_literal(&self) -> Option<IpAddr> {
        let host = match self.host.strip_prefix('[') {
            Some(inner) => inner.strip_suffix(']')?,
            None => &self.host,
        };
        host.parse().ok()
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.host, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.host, f)
    }
}

/// What a resolver is asked for: a host and, optionally, a port.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct Target {
    name: Name,
    port: Option<u16>,
}

impl Target {
    pub fn new(name: impl Into<Name>, port: Option<u16>) -> Self {
        Self { name: name.into(), port }
    }

    /// Parses `host`, `host:port`, `[v6]` or `[v6]:port`.
    ///
    /// A bare IPv6 literal without brackets is taken as a host with no port.
    pub fn parse(target: &str) -> Result<Self, NetError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(NetError::InvalidArgument);
        }

        if let Some(rest) = target.strip_prefix('[') {
            let (host, tail) = rest.split_once(']').ok_or(NetError::InvalidArgument)?;
            if host.is_empty() {
                return Err(NetError::InvalidArgument);
            }
            let port = match tail {
                "" => None,
                _ => Some(parse_port(tail.strip_prefix(':').ok_or(NetError::InvalidArgument)?)?),
            };
            return Ok(Self::new(host, port));
        }

        match target.rsplit_once(':') {
            Some((host, _)) if host.contains(':') => Ok(Self::new(target, None)),
            Some((host, port)) if !host.is_empty() => Ok(Self::new(host, Some(parse_port(port)?))),
            Some(_) => Err(NetError::InvalidArgument),
            None => Ok(Self::new(target, None)),
        }
    }

    #[inline]
    pub fn name(&self) -> &Name {
        &self.name
    }

    #[inline]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// The port, or `default` when the target carries none.
    pub fn port_or(&self, default: u16) -> u16 {
        self.port.unwrap_or(default)
    }
}

fn parse_port(port: &str) -> Result<u16, NetError> {
    port.parse().map_err(|_| NetError::InvalidArgument)
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bracket = self.name.as_str().contains(':');
        match (bracket, self.port) {
            (true, Some(port)) => write!(f, "[{}]:{}", self.name, port),
            (false, Some(port)) => write!(f, "{}:{}", self.name, port),
            (_, None) => write!(f, "{}", self.name),
        }
    }
}

/// Alias for an `Iterator` trait object over `SocketAddr`.
pub type Addrs = Box<dyn Iterator<Item = SocketAddr> + Send>;

/// Alias for the `Future` type returned by a resolver.
pub type Resolving = Pin<Box<dyn Future<Output = Result<Addrs, NetError>> + Send>>;

/// Resolves names into socket addresses.
///
/// Returned addresses carry port 0; the caller applies the target's port.
/// Implementations must be thread-safe.
pub trait Resolve: Send + Sync {
    fn resolve(&self, name: Name) -> Resolving;
}

/// Blanket implementation for Arc-wrapped resolvers.
impl<R: Resolve + ?Sized> Resolve for Arc<R> {
    fn resolve(&self, name: Name) -> Resolving {
        (**self).resolve(name)
    }
}

/// Resolver backed by an in-memory table.
///
/// Entries can be replaced while the resolver is in use, which makes it the
/// natural source for static service configs and for tests. Names missing
/// from the table go to the fallback resolver when one is set and fail
/// with `NameNotResolvedFor` otherwise.
///
/// # Example
///
/// ```rust,ignore
/// use resolvnet::dns::{Name, Resolve, StaticResolver};
///
/// let resolver = StaticResolver::new();
/// resolver.set("api.local", vec!["127.0.0.1:0".parse().unwrap()]);
///
/// let addrs: Vec<_> = resolver.resolve(Name::new("api.local")).await?.collect();
/// ```
#[derive(Default)]
pub struct StaticResolver {
    entries: DashMap<Name, Vec<SocketAddr>>,
    fallback: Option<Arc<dyn Resolve>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends misses to `fallback`.
    pub fn with_fallback(fallback: Arc<dyn Resolve>) -> Self {
        Self { entries: DashMap::new(), fallback: Some(fallback) }
    }

    /// Sets the addresses for `name`, returning the previous ones.
    pub fn set(&self, name: impl Into<Name>, addrs: Vec<SocketAddr>) -> Option<Vec<SocketAddr>> {
        self.entries.insert(name.into(), addrs)
    }

    pub fn remove(&self, name: &Name) -> Option<Vec<SocketAddr>> {
        self.entries.remove(name).map(|(_, addrs)| addrs)
    }

    /// Number of names in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Resolve for StaticResolver {
    fn resolve(&self, name: Name) -> Resolving {
        if let Some(addrs) = self.entries.get(&name) {
            let addrs: Addrs = Box::new(addrs.value().clone().into_iter());
            return Box::pin(std::future::ready(Ok(addrs)));
        }
        match &self.fallback {
            Some(inner) => inner.resolve(name),
            None => {
                let err = NetError::no_addresses(name.as_str(), "not in static table");
                Box::pin(std::future::ready(Err(err)))
            }
        }
    }
}

impl fmt::Debug for StaticResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticResolver")
            .field("entries", &self.entries.len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_name_from_str() {
        let name = Name::from("example.com");
        assert_eq!(name.as_str(), "example.com");
        assert_eq!(name.to_string(), "example.com");
        assert!(name.ip_literal().is_none());
    }

    #[test]
    fn test_name_ip_literal() {
        assert_eq!(
            Name::new("10.0.0.1").ip_literal(),
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)))
        );
        assert!(Name::new("[::1]").ip_literal().unwrap().is_ipv6());
        assert!(Name::new("[[::1]]").ip_literal().is_none());
        assert!(Name::new("[::1").ip_literal().is_none());
        assert!(Name::new("::1]").ip_literal().is_none());
    }

    #[test]
    fn test_target_parse() {
        let t = Target::parse("example.com:50051").unwrap();
        assert_eq!(t.name().as_str(), "example.com");
        assert_eq!(t.port(), Some(50051));

        let t = Target::parse("example.com").unwrap();
        assert_eq!(t.port(), None);
        assert_eq!(t.port_or(443), 443);

        let t = Target::parse("[2001:db8::1]:8443").unwrap();
        assert_eq!(t.name().as_str(), "2001:db8::1");
        assert_eq!(t.port(), Some(8443));
        assert_eq!(t.to_string(), "[2001:db8::1]:8443");

        let t = Target::parse("2001:db8::1").unwrap();
        assert_eq!(t.name().as_str(), "2001:db8::1");
        assert_eq!(t.port(), None);
    }

    #[test]
    fn test_target_parse_rejects_garbage() {
        assert!(Target::parse("").is_err());
        assert!(Target::parse(":80").is_err());
        assert!(Target::parse("host:notaport").is_err());
        assert!(Target::parse("host:70000").is_err());
        assert!(Target::parse("[::1").is_err());
        assert!(Target::parse("[::1]80").is_err());
        assert!(Target::parse("[]").is_err());
        assert!(Target::parse("[]:80").is_err());
    }

    struct MockResolver {
        response: Vec<SocketAddr>,
    }

    impl Resolve for MockResolver {
        fn resolve(&self, _name: Name) -> Resolving {
            let addrs = self.response.clone();
            Box::pin(async move { Ok(Box::new(addrs.into_iter()) as Addrs) })
        }
    }

    #[tokio::test]
    async fn test_static_resolver_hit() {
        let resolver = StaticResolver::new();
        resolver.set("svc.local", vec!["127.0.0.1:0".parse().unwrap()]);

        let addrs: Vec<_> = resolver.resolve(Name::new("svc.local")).await.unwrap().collect();
        assert_eq!(addrs, vec!["127.0.0.1:0".parse::<SocketAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn test_static_resolver_miss_without_fallback() {
        let resolver = StaticResolver::new();
        let err = match resolver.resolve(Name::new("nowhere.local")).await {
            Err(e) => e,
            Ok(_) => panic!("Expected resolution failure"),
        };
        assert!(matches!(err, NetError::NameNotResolvedFor { ref domain, .. } if domain == "nowhere.local"));
    }

    #[tokio::test]
    async fn test_static_resolver_fallback_and_update() {
        let mock = Arc::new(MockResolver { response: vec!["8.8.8.8:0".parse().unwrap()] });
        let resolver = StaticResolver::with_fallback(mock);

        let addrs: Vec<_> = resolver.resolve(Name::new("svc.local")).await.unwrap().collect();
        assert_eq!(addrs[0].ip(), IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)));

        resolver.set("svc.local", vec!["10.0.0.9:0".parse().unwrap()]);
        let addrs: Vec<_> = resolver.resolve(Name::new("svc.local")).await.unwrap().collect();
        assert_eq!(addrs[0].ip(), IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9)));

        assert!(resolver.remove(&Name::new("svc.local")).is_some());
        assert!(resolver.is_empty());
    }
}
