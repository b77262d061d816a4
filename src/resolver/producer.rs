//! Turns a resolution into a published [`ResolverResult`].

use super::{ResolverConfig, ResolverResult, ResultPublisher};
use crate::address::AddressList;
use crate::base::neterror::NetError;
use crate::dns::{Resolve, Target};
use crate::exec::Teardown;
use crate::lb::{LbPolicyArgs, LbPolicyRegistry};
use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

/// Resolver-side driver: resolve, build the address list, pick a policy,
/// bind it into a result.
///
/// The address list is moved into the policy factory; the result only
/// keeps the policy.
pub struct ResultProducer {
    resolver: Arc<dyn Resolve>,
    registry: Arc<LbPolicyRegistry>,
    config: ResolverConfig,
    teardown: Teardown,
}

impl ResultProducer {
    /// Fails with `InvalidConfig` when `config` does not validate.
    pub fn new(
        resolver: Arc<dyn Resolve>,
        registry: Arc<LbPolicyRegistry>,
        config: ResolverConfig,
    ) -> Result<Self, NetError> {
        config.validate()?;
        Ok(Self { resolver, registry, config, teardown: Teardown::Inline })
    }

    /// Sets the teardown sink given to every produced result.
    pub fn with_teardown(mut self, teardown: impl Into<Teardown>) -> Self {
        self.teardown = teardown.into();
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves `target` into the address list handed to the policy factory.
    ///
    /// Backends get the target's port (or the configured default), are
    /// de-duplicated in answer order and capped at `max_addresses`; the
    /// configured balancers follow them.
    pub async fn resolve_addresses(&self, target: &Target) -> Result<AddressList, NetError> {
        let port = target.port_or(self.config.default_port);
        let timeout = self.config.resolve_timeout_duration();

        let answer = tokio::time::timeout(timeout, self.resolver.resolve(target.name().clone()))
            .await
            .map_err(|_| {
                tracing::debug!(host = %target, ?timeout, "resolution timed out");
                NetError::DnsTimedOut
            })??;

        let mut seen = HashSet::new();
        let backends: Vec<SocketAddr> = answer
            .map(|addr| SocketAddr::new(addr.ip(), port))
            .filter(|addr| seen.insert(*addr))
            .take(self.config.max_addresses)
            .collect();

        let addresses = AddressList::from_socket_addrs(
            backends,
            self.config.balancer_addresses.iter().copied(),
        );
        if addresses.is_empty() {
            return Err(NetError::no_addresses(target.name().as_str(), "resolution returned no addresses"));
        }

        tracing::debug!(
            host = %target,
            backends = addresses.backends().count(),
            balancers = addresses.balancers().count(),
            "built address list"
        );
        Ok(addresses)
    }

    /// Resolves `target` and binds a fresh policy into a new result.
    pub async fn produce(&self, target: &Target) -> Result<ResolverResult, NetError> {
        let addresses = self.resolve_addresses(target).await?;
        let policy = self
            .registry
            .create_policy(&self.config.lb_policy_name, LbPolicyArgs::new(addresses))?;

        Ok(ResolverResult::builder().teardown(self.teardown.clone()).set_lb_policy(Some(&policy)))
    }

    /// [`produce`](Self::produce), then publish. The previously published
    /// result, if any, is released.
    pub async fn produce_and_publish(
        &self,
        target: &Target,
        publisher: &ResultPublisher,
    ) -> Result<(), NetError> {
        let result = self.produce(target).await?;
        publisher.publish(result);
        Ok(())
    }
}

impl fmt::Debug for ResultProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultProducer")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("teardown", &self.teardown)
            .finish_non_exhaustive()
    }
}
