//! Resolver results and their hand-off to dispatch.
//!
//! A resolver finishes its work by binding a load-balancing policy into a
//! [`ResolverResult`] and publishing it. From then on the result is a plain
//! shared value: any number of threads may retain and release it without
//! talking to the resolver again.
//!
//! - [`ResolverResult`] / [`ResultBuilder`]: the shared handle and its
//!   one-shot finalisation
//! - [`ResultProducer`]: resolve, build the address list, create the policy
//! - [`result_channel`]: latest-value publication to subscribers
//! - [`ResolverConfig`]: producer settings

mod channel;
mod config;
mod producer;
mod result;

pub use channel::{result_channel, ResultPublisher, ResultSubscriber};
pub use config::ResolverConfig;
pub use producer::ResultProducer;
pub use result::{ResolverResult, ResultBuilder};
