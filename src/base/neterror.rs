use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the recoverable paths of the crate.
///
/// Contract violations (out-of-range slot writes, oversize addresses through
/// the panicking API) never reach this type; they abort the caller instead.
///
/// Codes follow Chromium's `net_error_list.h` where a matching entry exists.
/// Context-carrying variants report the code of their field-less family
/// member, so `NetError::from(err.as_i32())` yields the family variant.
#[derive(Debug, Error, Clone)]
pub enum NetError {
    // Generic Errors
    #[error("Invalid argument")]
    InvalidArgument,

    // Address / Resolution Errors
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("Address invalid")]
    AddressInvalid,
    #[error("Name resolution failed")]
    NameResolutionFailed,
    #[error("DNS timed out")]
    DnsTimedOut,

    // Load-balancing Errors (custom codes starting at -1000)
    #[error("Load-balancing policy unavailable")]
    LbPolicyUnavailable,
    #[error("Invalid resolver configuration")]
    InvalidConfiguration,
    #[error("Resolver shut down")]
    ResolverShutdown,

    // Context-carrying variants
    #[error("Address index {index} out of range for list of {len}")]
    AddressIndexOutOfRange { index: usize, len: usize },
    #[error("Address of {len} bytes exceeds the {max}-byte capacity")]
    AddressTooLong { len: usize, max: usize },
    #[error("Name {domain} not resolved: {source}")]
    NameNotResolvedFor {
        domain: String,
        #[source]
        source: Arc<io::Error>,
    },
    #[error("No load-balancing policy registered as {name:?}")]
    LbPolicyNotFound { name: String },
    #[error("Load-balancing policy {name:?} could not be created: {reason}")]
    LbPolicyCreationFailed { name: String, reason: String },
    #[error("Invalid resolver configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Unknown error {0}")]
    Unknown(i32),
}

impl NetError {
    /// Build a `NameNotResolvedFor` from an IO failure.
    pub fn dns_failed(domain: &str, source: io::Error) -> Self {
        NetError::NameNotResolvedFor { domain: domain.to_string(), source: Arc::new(source) }
    }

    /// Build a `NameNotResolvedFor` with a synthetic `NotFound` source.
    pub fn no_addresses(domain: &str, detail: &str) -> Self {
        Self::dns_failed(domain, io::Error::new(io::ErrorKind::NotFound, detail.to_string()))
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::InvalidArgument => -4,

            NetError::NameNotResolved | NetError::NameNotResolvedFor { .. } => -105,
            NetError::AddressInvalid
            | NetError::AddressIndexOutOfRange { .. }
            | NetError::AddressTooLong { .. } => -108,
            NetError::NameResolutionFailed => -137,
            NetError::DnsTimedOut => -803,

            NetError::LbPolicyUnavailable
            | NetError::LbPolicyNotFound { .. }
            | NetError::LbPolicyCreationFailed { .. } => -1000,
            NetError::InvalidConfiguration | NetError::InvalidConfig { .. } => -1001,
            NetError::ResolverShutdown => -1002,

            NetError::Unknown(code) => *code,
        }
    }

    /// True for failures a resolver may reasonably report and retry later.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            NetError::NameNotResolved
                | NetError::NameNotResolvedFor { .. }
                | NetError::NameResolutionFailed
                | NetError::DnsTimedOut
        )
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -4 => NetError::InvalidArgument,
            -105 => NetError::NameNotResolved,
            -108 => NetError::AddressInvalid,
            -137 => NetError::NameResolutionFailed,
            -803 => NetError::DnsTimedOut,
            -1000 => NetError::LbPolicyUnavailable,
            -1001 => NetError::InvalidConfiguration,
            -1002 => NetError::ResolverShutdown,
            _ => NetError::Unknown(code),
        }
    }
}
