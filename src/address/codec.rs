//! `SocketAddr` <-> raw address bytes.
//!
//! The byte form is a portable wire format shaped after the Linux
//! `sockaddr_in` / `sockaddr_in6` structs: family in native byte order,
//! port, address and flow info in network byte order, scope id in native
//! byte order. The family tags are the Linux values on every platform, so
//! the bytes are not a native `sockaddr` on macOS or the BSDs and must not
//! be handed to the OS as one.

use super::ResolvedAddress;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};

/// Family tag for IPv4 (Linux `AF_INET`, on every platform).
pub const AF_INET: u16 = 2;
/// Family tag for IPv6 (Linux `AF_INET6`, on every platform).
pub const AF_INET6: u16 = 10;

/// `sizeof(struct sockaddr_in)`
pub const SOCKADDR_IN_LEN: usize = 16;
/// `sizeof(struct sockaddr_in6)`
pub const SOCKADDR_IN6_LEN: usize = 28;

impl ResolvedAddress {
    /// Serializes a socket address into the wire layout above.
    pub fn from_socket_addr(addr: SocketAddr) -> Self {
        let mut out = ResolvedAddress::default();
        match addr {
            SocketAddr::V4(v4) => {
                let raw = out.raw_mut();
                raw[0..2].copy_from_slice(&AF_INET.to_ne_bytes());
                raw[2..4].copy_from_slice(&v4.port().to_be_bytes());
                raw[4..8].copy_from_slice(&v4.ip().octets());
                out.set_len(SOCKADDR_IN_LEN);
            }
            SocketAddr::V6(v6) => {
                let raw = out.raw_mut();
                raw[0..2].copy_from_slice(&AF_INET6.to_ne_bytes());
                raw[2..4].copy_from_slice(&v6.port().to_be_bytes());
                raw[4..8].copy_from_slice(&v6.flowinfo().to_be_bytes());
                raw[8..24].copy_from_slice(&v6.ip().octets());
                raw[24..28].copy_from_slice(&v6.scope_id().to_ne_bytes());
                out.set_len(SOCKADDR_IN6_LEN);
            }
        }
        out
    }

    /// Parses the bytes back into a socket address.
    ///
    /// Returns `None` for unknown families or buffers shorter than the
    /// family's struct size.
    pub fn to_socket_addr(&self) -> Option<SocketAddr> {
        let bytes = self.as_bytes();
        if bytes.len() < 2 {
            return None;
        }
        let family = u16::from_ne_bytes([bytes[0], bytes[1]]);
        match family {
            AF_INET if bytes.len() >= SOCKADDR_IN_LEN => {
                let port = u16::from_be_bytes([bytes[2], bytes[3]]);
                let ip = Ipv4Addr::new(bytes[4], bytes[5], bytes[6], bytes[7]);
                Some(SocketAddr::V4(SocketAddrV4::new(ip, port)))
            }
            AF_INET6 if bytes.len() >= SOCKADDR_IN6_LEN => {
                let port = u16::from_be_bytes([bytes[2], bytes[3]]);
                let flowinfo = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
                let mut octets = [0u8; 16];
                octets.copy_from_slice(&bytes[8..24]);
                let scope_id = u32::from_ne_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]);
                Some(SocketAddr::V6(SocketAddrV6::new(
                    Ipv6Addr::from(octets),
                    port,
                    flowinfo,
                    scope_id,
                )))
            }
            _ => None,
        }
    }
}

impl From<SocketAddr> for ResolvedAddress {
    fn from(addr: SocketAddr) -> Self {
        ResolvedAddress::from_socket_addr(addr)
    }
}
