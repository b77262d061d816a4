//! Policy factories and the name -> factory registry.

use super::PolicyRef;
use crate::address::AddressList;
use crate::base::neterror::NetError;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Inputs handed to a factory when a resolver needs a new policy.
///
/// The address list is moved in; a factory that needs the endpoints after
/// construction keeps it, otherwise it is dropped with the args.
#[derive(Debug)]
pub struct LbPolicyArgs {
    pub addresses: AddressList,
}

impl LbPolicyArgs {
    pub fn new(addresses: AddressList) -> Self {
        Self { addresses }
    }
}

/// Builds policies of one kind.
pub trait LbPolicyFactory: Send + Sync {
    /// Name the factory is registered under.
    fn name(&self) -> &str;

    /// Creates a policy over the given addresses.
    fn create(&self, args: LbPolicyArgs) -> Result<PolicyRef, NetError>;
}

/// Blanket implementation for Arc-wrapped factories.
impl<F: LbPolicyFactory + ?Sized> LbPolicyFactory for Arc<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn create(&self, args: LbPolicyArgs) -> Result<PolicyRef, NetError> {
        (**self).create(args)
    }
}

/// Concurrent map from policy names to factories.
///
/// Registration may happen from any thread at any time; lookups clone the
/// factory `Arc` out so no map shard stays locked while a policy is built.
#[derive(Default)]
pub struct LbPolicyRegistry {
    factories: DashMap<String, Arc<dyn LbPolicyFactory>>,
}

impl LbPolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under its own name, returning the factory it
    /// replaced, if any.
    pub fn register(&self, factory: Arc<dyn LbPolicyFactory>) -> Option<Arc<dyn LbPolicyFactory>> {
        let name = factory.name().to_string();
        tracing::debug!(policy = %name, "registering load-balancing policy factory");
        self.factories.insert(name, factory)
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn LbPolicyFactory>> {
        self.factories.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Looks up `name` and builds a policy from `args`.
    pub fn create_policy(&self, name: &str, args: LbPolicyArgs) -> Result<PolicyRef, NetError> {
        let factory = self
            .lookup(name)
            .ok_or_else(|| NetError::LbPolicyNotFound { name: name.to_string() })?;

        let address_count = args.addresses.len();
        let policy = factory.create(args).map_err(|e| {
            tracing::debug!(policy = %name, error = %e, "load-balancing policy creation failed");
            match e {
                NetError::LbPolicyCreationFailed { .. } => e,
                other => NetError::LbPolicyCreationFailed {
                    name: name.to_string(),
                    reason: other.to_string(),
                },
            }
        })?;

        tracing::debug!(policy = %name, addresses = address_count, "created load-balancing policy");
        Ok(policy)
    }
}

impl fmt::Debug for LbPolicyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        names.sort();
        f.debug_struct("LbPolicyRegistry").field("policies", &names).finish()
    }
}
