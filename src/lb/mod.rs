//! Load-balancing policy seam.
//!
//! The selection algorithm of a policy is opaque to this crate. What the
//! crate relies on is the ownership contract: a policy lives behind an
//! `Arc`, retaining it is `Arc::clone`, releasing it is dropping the `Arc`,
//! and the policy's own teardown runs from its `Drop` impl when the last
//! reference goes away.
//!
//! # Architecture
//!
//! This mirrors gRPC's `lb_policy` / `lb_policy_factory` split. Resolvers look
//! a [`LbPolicyFactory`] up by name in an [`LbPolicyRegistry`], hand it the
//! freshly resolved [`AddressList`](crate::address::AddressList) and bind the
//! returned [`PolicyRef`] into a
//! [`ResolverResult`](crate::resolver::ResolverResult).

mod registry;

pub use registry::{LbPolicyArgs, LbPolicyFactory, LbPolicyRegistry};

use std::fmt;
use std::sync::Arc;

/// A pluggable traffic-distribution strategy.
///
/// Implementations must be thread-safe: a policy bound into a published
/// result is reachable from every thread holding that result.
pub trait LoadBalancingPolicy: Send + Sync + fmt::Debug {
    /// Registry name of the policy, e.g. `"pick_first"`.
    fn name(&self) -> &str;
}

/// Shared reference to a policy.
pub type PolicyRef = Arc<dyn LoadBalancingPolicy>;

/// Blanket implementation for Arc-wrapped policies.
impl<P: LoadBalancingPolicy + ?Sized> LoadBalancingPolicy for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }
}
