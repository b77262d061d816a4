//! Resolved address lists.
//!
//! An [`AddressList`] is sized once, when the resolver knows how many
//! endpoints a lookup produced, then populated slot by slot and handed off
//! read-only. Every slot starts zeroed: an empty address tagged as a
//! backend.
//!
//! # Example
//!
//! ```rust
//! use resolvnet::address::AddressList;
//!
//! let mut list = AddressList::new(2);
//! list.set_address(0, &[127, 0, 0, 1], false);
//! list.set_address(1, &[0u8; 16], true);
//!
//! assert_eq!(list[0].address().as_bytes(), &[127, 0, 0, 1]);
//! assert!(list[1].is_balancer());
//! ```

mod codec;

pub use codec::{AF_INET, AF_INET6, SOCKADDR_IN6_LEN, SOCKADDR_IN_LEN};

use crate::base::neterror::NetError;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;
use std::ops::Index;

/// Capacity of a single address slot, matching `sizeof(struct sockaddr_storage)`.
pub const MAX_ADDRESS_LEN: usize = 128;

/// A serialized socket address of at most [`MAX_ADDRESS_LEN`] bytes.
///
/// Every constructor checks the length, so `len() <= MAX_ADDRESS_LEN`
/// always holds.
#[derive(Clone, Copy)]
pub struct ResolvedAddress {
    raw: [u8; MAX_ADDRESS_LEN],
    len: usize,
}

impl ResolvedAddress {
    /// Copies `bytes` into a new address.
    pub fn new(bytes: &[u8]) -> Result<Self, NetError> {
        if bytes.len() > MAX_ADDRESS_LEN {
            return Err(NetError::AddressTooLong { len: bytes.len(), max: MAX_ADDRESS_LEN });
        }
        let mut out = Self::default();
        out.raw[..bytes.len()].copy_from_slice(bytes);
        out.len = bytes.len();
        Ok(out)
    }

    /// The valid bytes of the address.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw[..self.len]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn raw_mut(&mut self) -> &mut [u8; MAX_ADDRESS_LEN] {
        &mut self.raw
    }

    fn set_len(&mut self, len: usize) {
        debug_assert!(len <= MAX_ADDRESS_LEN);
        self.len = len;
    }
}

impl Default for ResolvedAddress {
    fn default() -> Self {
        Self { raw: [0; MAX_ADDRESS_LEN], len: 0 }
    }
}

impl PartialEq for ResolvedAddress {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ResolvedAddress {}

impl Hash for ResolvedAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl fmt::Debug for ResolvedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_socket_addr() {
            Some(addr) => write!(f, "ResolvedAddress({addr})"),
            None => f.debug_tuple("ResolvedAddress").field(&self.as_bytes()).finish(),
        }
    }
}

/// One slot of an [`AddressList`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AddressEntry {
    address: ResolvedAddress,
    is_balancer: bool,
}

impl AddressEntry {
    #[inline]
    pub fn address(&self) -> &ResolvedAddress {
        &self.address
    }

    /// True if this endpoint is a load-balancer redirect target rather than
    /// a backend.
    #[inline]
    pub fn is_balancer(&self) -> bool {
        self.is_balancer
    }

    /// Convenience for `address().to_socket_addr()`.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.address.to_socket_addr()
    }
}

/// Fixed-size list of resolved endpoints.
///
/// Population needs `&mut self`; once the list is shared behind a `&` or an
/// `Arc` it is read-only. Dropping the list releases its storage.
#[derive(Clone, PartialEq, Eq)]
pub struct AddressList {
    entries: Box<[AddressEntry]>,
}

impl AddressList {
    /// Creates a list of `count` zeroed slots. `count == 0` is allowed.
    pub fn new(count: usize) -> Self {
        tracing::trace!(count, "creating address list");
        Self { entries: vec![AddressEntry::default(); count].into_boxed_slice() }
    }

    /// Builds a list holding `backends` followed by `balancers`.
    pub fn from_socket_addrs<B, L>(backends: B, balancers: L) -> Self
    where
        B: IntoIterator<Item = SocketAddr>,
        L: IntoIterator<Item = SocketAddr>,
    {
        let tagged: Vec<(SocketAddr, bool)> = backends
            .into_iter()
            .map(|a| (a, false))
            .chain(balancers.into_iter().map(|a| (a, true)))
            .collect();

        let mut list = Self::new(tagged.len());
        for (index, (addr, is_balancer)) in tagged.into_iter().enumerate() {
            list.set_resolved(index, ResolvedAddress::from_socket_addr(addr), is_balancer);
        }
        list
    }

    /// Number of slots, fixed at construction.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies `bytes` into slot `index` and records the balancer tag.
    ///
    /// # Panics
    ///
    /// If `index >= len()` or `bytes.len() > MAX_ADDRESS_LEN`. Both are
    /// caller bugs; use [`try_set_address`](Self::try_set_address) for
    /// input that has not been validated.
    pub fn set_address(&mut self, index: usize, bytes: &[u8], is_balancer: bool) {
        self.check_index(index);
        assert!(
            bytes.len() <= MAX_ADDRESS_LEN,
            "address of {} bytes exceeds the {}-byte capacity",
            bytes.len(),
            MAX_ADDRESS_LEN
        );
        let mut address = ResolvedAddress::default();
        address.raw_mut()[..bytes.len()].copy_from_slice(bytes);
        address.set_len(bytes.len());
        self.entries[index] = AddressEntry { address, is_balancer };
    }

    /// Stores an already-built address in slot `index`.
    ///
    /// # Panics
    ///
    /// If `index >= len()`.
    pub fn set_resolved(&mut self, index: usize, address: ResolvedAddress, is_balancer: bool) {
        self.check_index(index);
        self.entries[index] = AddressEntry { address, is_balancer };
    }

    /// Non-panicking form of [`set_address`](Self::set_address).
    pub fn try_set_address(
        &mut self,
        index: usize,
        bytes: &[u8],
        is_balancer: bool,
    ) -> Result<(), NetError> {
        let len = self.len();
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(NetError::AddressIndexOutOfRange { index, len })?;
        *slot = AddressEntry { address: ResolvedAddress::new(bytes)?, is_balancer };
        Ok(())
    }

    /// Returns slot `index`.
    ///
    /// # Panics
    ///
    /// If `index >= len()`.
    pub fn get(&self, index: usize) -> &AddressEntry {
        self.check_index(index);
        &self.entries[index]
    }

    pub fn get_checked(&self, index: usize) -> Option<&AddressEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AddressEntry> {
        self.entries.iter()
    }

    /// Entries tagged as ordinary backends.
    pub fn backends(&self) -> impl Iterator<Item = &AddressEntry> + '_ {
        self.entries.iter().filter(|e| !e.is_balancer)
    }

    /// Entries tagged as balancer redirect targets.
    pub fn balancers(&self) -> impl Iterator<Item = &AddressEntry> + '_ {
        self.entries.iter().filter(|e| e.is_balancer)
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.entries.len(),
            "address index {} out of range for list of {}",
            index,
            self.entries.len()
        );
    }
}

impl Index<usize> for AddressList {
    type Output = AddressEntry;

    fn index(&self, index: usize) -> &Self::Output {
        self.get(index)
    }
}

impl<'a> IntoIterator for &'a AddressList {
    type Item = &'a AddressEntry;
    type IntoIter = std::slice::Iter<'a, AddressEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for AddressList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AddressList")
            .field("len", &self.len())
            .field("balancers", &self.balancers().count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_list_is_zeroed() {
        for count in [0usize, 1, 7] {
            let list = AddressList::new(count);
            assert_eq!(list.len(), count);
            for entry in &list {
                assert!(entry.address().is_empty());
                assert!(!entry.is_balancer());
            }
        }
    }

    #[test]
    fn test_empty_list() {
        let list = AddressList::new(0);
        assert!(list.is_empty());
        assert!(list.get_checked(0).is_none());
    }

    #[test]
    fn test_set_and_get() {
        let mut list = AddressList::new(3);
        list.set_address(1, &[1, 2, 3, 4], true);

        let entry = list.get(1);
        assert_eq!(entry.address().as_bytes(), &[1, 2, 3, 4]);
        assert_eq!(entry.address().len(), 4);
        assert!(entry.is_balancer());

        // Neighbours untouched
        assert!(list[0].address().is_empty());
        assert!(list[2].address().is_empty());
    }

    #[test]
    fn test_set_max_len_address() {
        let mut list = AddressList::new(1);
        let bytes = [0xabu8; MAX_ADDRESS_LEN];
        list.set_address(0, &bytes, false);
        assert_eq!(list[0].address().len(), MAX_ADDRESS_LEN);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_out_of_range_panics() {
        let mut list = AddressList::new(2);
        list.set_address(2, &[1, 2, 3, 4], false);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_on_empty_list_panics() {
        let mut list = AddressList::new(0);
        list.set_address(0, &[], false);
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn test_set_oversize_panics() {
        let mut list = AddressList::new(1);
        list.set_address(0, &[0u8; MAX_ADDRESS_LEN + 1], false);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_get_out_of_range_panics() {
        let list = AddressList::new(1);
        let _ = list.get(5);
    }

    #[test]
    fn test_try_set_reports_errors() {
        let mut list = AddressList::new(1);

        let err = list.try_set_address(4, &[1], false).unwrap_err();
        assert!(matches!(err, NetError::AddressIndexOutOfRange { index: 4, len: 1 }));

        let err = list.try_set_address(0, &[0u8; 200], false).unwrap_err();
        assert!(matches!(err, NetError::AddressTooLong { len: 200, .. }));

        // Failed writes leave the slot untouched
        assert!(list[0].address().is_empty());

        list.try_set_address(0, &[9, 9], true).unwrap();
        assert_eq!(list[0].address().as_bytes(), &[9, 9]);
    }

    #[test]
    fn test_from_socket_addrs_tags_balancers() {
        let backends: Vec<SocketAddr> =
            vec!["10.0.0.1:443".parse().unwrap(), "10.0.0.2:443".parse().unwrap()];
        let balancers: Vec<SocketAddr> = vec!["[2001:db8::1]:9000".parse().unwrap()];

        let list = AddressList::from_socket_addrs(backends.clone(), balancers.clone());
        assert_eq!(list.len(), 3);
        assert_eq!(list.backends().count(), 2);
        assert_eq!(list.balancers().count(), 1);

        let decoded: Vec<_> = list.backends().filter_map(|e| e.socket_addr()).collect();
        assert_eq!(decoded, backends);
        assert_eq!(list[2].socket_addr(), Some(balancers[0]));
    }

    #[test]
    fn test_resolved_address_equality_ignores_tail() {
        let a = ResolvedAddress::new(&[1, 2]).unwrap();
        let b = ResolvedAddress::new(&[1, 2]).unwrap();
        let c = ResolvedAddress::new(&[1, 2, 0]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
