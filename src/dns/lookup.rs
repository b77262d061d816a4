//! Shared path for resolvers that answer with bare IP addresses.

use super::{Addrs, Name, Resolving};
use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use std::collections::HashSet;
use std::future::Future;
use std::io;
use std::net::{IpAddr, SocketAddr};

/// Runs `lookup` for `name` and shapes the answer the way a
/// [`ResultProducer`](crate::resolver::ResultProducer) consumes it.
///
/// IP literals are answered without calling `lookup`. Lookup errors and
/// empty answers become `NameNotResolvedFor`. Repeated IPs are dropped,
/// keeping answer order, and every address carries port 0.
pub(super) fn drive<F, Fut>(name: Name, via: &'static str, lookup: F) -> Resolving
where
    F: FnOnce(Box<str>) -> Fut,
    Fut: Future<Output = io::Result<Vec<IpAddr>>> + Send + 'static,
{
    if let Some(ip) = name.ip_literal() {
        tracing::trace!(host = %name, via, "ip literal, skipping lookup");
        let addrs: Addrs = Box::new(std::iter::once(SocketAddr::new(ip, 0)));
        return Box::pin(std::future::ready(Ok(addrs)));
    }

    let pending = lookup(name.as_str().into());
    Box::pin(async move {
        let ips = pending.await.dns_context(name.as_str()).inspect_err(|e| {
            tracing::debug!(host = %name, via, error = %e, "lookup failed");
        })?;

        let addrs = to_answer(&name, ips)?;
        tracing::debug!(host = %name, via, count = addrs.len(), "lookup complete");
        Ok(Box::new(addrs.into_iter()) as Addrs)
    })
}

fn to_answer(name: &Name, ips: Vec<IpAddr>) -> Result<Vec<SocketAddr>, NetError> {
    let mut seen = HashSet::new();
    let addrs: Vec<SocketAddr> = ips
        .into_iter()
        .filter(|ip| seen.insert(*ip))
        .map(|ip| SocketAddr::new(ip, 0))
        .collect();

    if addrs.is_empty() {
        return Err(NetError::no_addresses(name.as_str(), "lookup returned no addresses"));
    }
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::{ready, Ready};
    use std::net::Ipv4Addr;

    type Answer = Ready<io::Result<Vec<IpAddr>>>;

    fn answering(result: io::Result<Vec<IpAddr>>) -> impl FnOnce(Box<str>) -> Answer {
        move |_host| ready(result)
    }

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[tokio::test]
    async fn test_ip_literal_never_calls_lookup() {
        let lookup = |_host: Box<str>| -> Answer { panic!("lookup called for an IP literal") };

        let addrs: Vec<_> = drive(Name::new("[2001:db8::7]"), "test", lookup).await.unwrap().collect();
        assert_eq!(addrs, vec!["[2001:db8::7]:0".parse::<SocketAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn test_lookup_receives_host() {
        let lookup = |host: Box<str>| -> Answer {
            assert_eq!(&*host, "svc.local");
            ready(Ok(vec![v4(10, 0, 0, 1)]))
        };

        let addrs: Vec<_> = drive(Name::new("svc.local"), "test", lookup).await.unwrap().collect();
        assert_eq!(addrs, vec![SocketAddr::new(v4(10, 0, 0, 1), 0)]);
    }

    #[tokio::test]
    async fn test_answer_dedups_in_order() {
        let ips = vec![v4(10, 0, 0, 2), v4(10, 0, 0, 1), v4(10, 0, 0, 2)];

        let addrs: Vec<_> =
            drive(Name::new("svc.local"), "test", answering(Ok(ips))).await.unwrap().collect();
        assert_eq!(
            addrs,
            vec![SocketAddr::new(v4(10, 0, 0, 2), 0), SocketAddr::new(v4(10, 0, 0, 1), 0)]
        );
    }

    #[tokio::test]
    async fn test_lookup_error_names_the_host() {
        let failure = io::Error::new(io::ErrorKind::NotFound, "nxdomain");

        let err = match drive(Name::new("gone.local"), "test", answering(Err(failure))).await {
            Err(e) => e,
            Ok(_) => panic!("Expected lookup failure"),
        };
        assert!(matches!(err, NetError::NameNotResolvedFor { ref domain, .. } if domain == "gone.local"));
        assert!(err.to_string().contains("nxdomain"));
        assert_eq!(err.as_i32(), -105);
    }

    #[tokio::test]
    async fn test_empty_answer_is_an_error() {
        let err = match drive(Name::new("empty.local"), "test", answering(Ok(Vec::new()))).await {
            Err(e) => e,
            Ok(_) => panic!("Expected empty answer to fail"),
        };
        assert!(err.is_resolution_error());
    }
}
