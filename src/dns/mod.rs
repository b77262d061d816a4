//! Name resolution adapters.
//!
//! Address discovery itself is delegated to existing resolvers; this module
//! only adapts them to one trait so a
//! [`ResultProducer`](crate::resolver::ResultProducer) can turn their answers
//! into address lists:
//! - [`StaticResolver`]: in-memory table with optional fallback
//! - [`GaiResolver`]: system resolver (getaddrinfo via thread pool)
//! - [`HickoryResolver`]: async hickory-dns resolver (DoH/DoT capable)
//!
//! The two network resolvers share one answer path: IP literals skip the
//! lookup, repeated IPs are dropped, and failures or empty answers come back
//! as `NameNotResolvedFor` naming the host.
//!
//! # Example
//!
//! ```rust,ignore
//! use resolvnet::dns::{HickoryResolver, Name, Resolve};
//!
//! let resolver = HickoryResolver::new();
//! let addrs = resolver.resolve(Name::new("example.com")).await?;
//! for addr in addrs {
//!     println!("Resolved: {}", addr);
//! }
//! ```

mod gai;
mod hickory;
mod lookup;
mod resolve;

pub use gai::GaiResolver;
pub use hickory::HickoryResolver;
pub use resolve::{Addrs, Name, Resolve, Resolving, StaticResolver, Target};
