//! # resolvnet
//!
//! The hand-off point between name resolution and call dispatch.
//!
//! A resolver turns a lookup into an [`AddressList`](address::AddressList),
//! builds a load-balancing policy over it, and binds that policy into a
//! [`ResolverResult`](resolver::ResolverResult). The result is a
//! reference-counted handle that dispatch threads retain and release
//! freely; the last release hands the policy to a deferred teardown context
//! so policy shutdown never runs inside a release call.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use resolvnet::dns::{GaiResolver, Target};
//! use resolvnet::exec::Reaper;
//! use resolvnet::lb::LbPolicyRegistry;
//! use resolvnet::resolver::{result_channel, ResolverConfig, ResultProducer};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(LbPolicyRegistry::new());
//!     registry.register(Arc::new(MyPickFirstFactory));
//!
//!     let (reaper, _task) = Reaper::spawn();
//!     let producer = ResultProducer::new(Arc::new(GaiResolver::new()), registry, ResolverConfig::new())
//!         .unwrap()
//!         .with_teardown(reaper);
//!
//!     let (publisher, subscriber) = result_channel();
//!     producer
//!         .produce_and_publish(&Target::parse("example.com:443").unwrap(), &publisher)
//!         .await
//!         .unwrap();
//!
//!     let result = subscriber.current().unwrap();
//!     println!("policy: {:?}", result.lb_policy().map(|p| p.name()));
//! }
//! ```
//!
//! ## Modules
//!
//! - [`address`] - Fixed-size resolved address lists
//! - [`base`] - Error definitions
//! - [`dns`] - Resolver adapters (static, getaddrinfo, hickory-dns)
//! - [`exec`] - Deferred teardown contexts
//! - [`lb`] - Load-balancing policy trait, factories and registry
//! - [`resolver`] - Resolver results, production and publication

pub mod address;
pub mod base;
pub mod dns;
pub mod exec;
pub mod lb;
pub mod resolver;
