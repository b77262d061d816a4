//! System resolver (`getaddrinfo`).

use super::lookup;
use super::{Name, Resolve, Resolving};
use std::io;
use std::net::{IpAddr, ToSocketAddrs};

/// Looks names up with the platform resolver, so `/etc/hosts` and
/// nsswitch apply.
///
/// Each lookup holds a tokio blocking-pool thread until `getaddrinfo`
/// returns; [`HickoryResolver`](super::HickoryResolver) scales better when
/// many targets refresh at once.
#[derive(Clone, Debug, Default)]
pub struct GaiResolver;

impl GaiResolver {
    pub fn new() -> Self {
        Self
    }
}

fn getaddrinfo(host: &str) -> io::Result<Vec<IpAddr>> {
    Ok((host, 0u16).to_socket_addrs()?.map(|addr| addr.ip()).collect())
}

impl Resolve for GaiResolver {
    fn resolve(&self, name: Name) -> Resolving {
        lookup::drive(name, "getaddrinfo", |host| async move {
            tokio::task::spawn_blocking(move || getaddrinfo(&host))
                .await
                .map_err(io::Error::other)?
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, SocketAddr};

    #[tokio::test]
    async fn test_ip_literal() {
        let addrs: Vec<_> =
            GaiResolver::new().resolve(Name::new("192.168.1.7")).await.unwrap().collect();
        assert_eq!(addrs, vec![SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 7)), 0)]);
    }

    #[tokio::test]
    async fn test_localhost_goes_through_getaddrinfo() {
        let addrs: Vec<_> =
            GaiResolver::new().resolve(Name::new("localhost")).await.unwrap().collect();
        assert!(!addrs.is_empty());
        assert!(addrs.iter().all(|a| a.ip().is_loopback() && a.port() == 0));
    }

    #[test]
    fn test_getaddrinfo_rejects_bad_host() {
        let err = getaddrinfo("bad\0host").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
