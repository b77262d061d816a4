//! The shareable resolver result.

use crate::exec::{ExecCtx, Teardown};
use crate::lb::PolicyRef;
use std::fmt;
use std::sync::Arc;

/// Shared state behind every [`ResolverResult`] handle.
struct Inner {
    policy: Option<PolicyRef>,
    teardown: Teardown,
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(policy) = self.policy.take() {
            tracing::debug!(policy = %policy.name(), "last resolver result reference released");
            self.teardown.release(policy);
        }
    }
}

/// Finalisation step for a [`ResolverResult`].
///
/// The builder is the creator's single reference to a result that has not
/// been published yet. It cannot be cloned or shared; binding the policy
/// consumes it and yields the shareable handle, so a result's policy is
/// assigned exactly once. Dropping a builder destroys the unpublished result.
#[derive(Debug, Default)]
#[must_use = "a result builder does nothing until `set_lb_policy` is called"]
pub struct ResultBuilder {
    teardown: Teardown,
}

impl ResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets where the policy reference goes when the last handle is dropped.
    /// Defaults to [`Teardown::Inline`].
    pub fn teardown(mut self, teardown: impl Into<Teardown>) -> Self {
        self.teardown = teardown.into();
        self
    }

    /// The policy bound so far: always `None`, binding happens in
    /// [`set_lb_policy`](Self::set_lb_policy).
    pub fn lb_policy(&self) -> Option<&PolicyRef> {
        None
    }

    /// Binds `policy` and publishes the result.
    ///
    /// With `Some`, the result takes one new reference to the policy; the
    /// caller keeps its own. With `None` the result carries no policy and no
    /// reference is taken.
    ///
    /// The builder is consumed either way, so a result finalized without a
    /// policy cannot have one bound later. Decide on the policy before
    /// finalizing; a result that needs one afterwards is a new result.
    pub fn set_lb_policy(self, policy: Option<&PolicyRef>) -> ResolverResult {
        let policy = policy.map(Arc::clone);
        tracing::debug!(
            policy = policy.as_ref().map(|p| p.name()).unwrap_or("none"),
            "resolver result finalized"
        );
        ResolverResult { inner: Arc::new(Inner { policy, teardown: self.teardown }) }
    }
}

/// A reference-counted handle pairing a resolution with its load-balancing
/// policy.
///
/// Cloning retains, dropping releases. Every handle is equal: whichever
/// drop brings the count to zero releases the policy reference through the
/// result's [`Teardown`] sink, exactly once, then frees the result.
///
/// # Example
///
/// ```rust
/// use resolvnet::exec::ExecCtx;
/// use resolvnet::lb::{LoadBalancingPolicy, PolicyRef};
/// use resolvnet::resolver::ResolverResult;
/// use std::sync::Arc;
///
/// #[derive(Debug)]
/// struct PickFirst;
///
/// impl LoadBalancingPolicy for PickFirst {
///     fn name(&self) -> &str {
///         "pick_first"
///     }
/// }
///
/// let policy: PolicyRef = Arc::new(PickFirst);
/// let result = ResolverResult::builder().set_lb_policy(Some(&policy));
///
/// let for_dispatch = result.retain();
/// assert_eq!(result.ref_count(), 2);
/// assert_eq!(for_dispatch.lb_policy().map(|p| p.name()), Some("pick_first"));
///
/// let ctx = ExecCtx::new();
/// result.release(&ctx);
/// for_dispatch.release(&ctx);
/// assert_eq!(Arc::strong_count(&policy), 2); // queued on ctx
/// ctx.flush();
/// assert_eq!(Arc::strong_count(&policy), 1);
/// ```
#[derive(Clone)]
pub struct ResolverResult {
    inner: Arc<Inner>,
}

impl ResolverResult {
    /// Starts a new result. The builder holds the creator's reference.
    pub fn builder() -> ResultBuilder {
        ResultBuilder::new()
    }

    /// Takes another reference. Same as `clone`.
    #[inline]
    pub fn retain(&self) -> Self {
        self.clone()
    }

    /// Gives up this reference.
    ///
    /// If it was the last one, the policy release is queued on `ctx` rather
    /// than run on the current stack. Otherwise this is a plain drop.
    pub fn release(self, ctx: &ExecCtx) {
        if let Some(mut inner) = Arc::into_inner(self.inner) {
            if let Some(policy) = inner.policy.take() {
                tracing::debug!(
                    policy = %policy.name(),
                    "last resolver result reference released, deferring policy teardown"
                );
                ctx.defer_release(policy);
            }
        }
    }

    /// The bound policy, if any. Borrowed from this handle: retain the
    /// `Arc` to keep the policy beyond the handle's lifetime.
    #[inline]
    pub fn lb_policy(&self) -> Option<&PolicyRef> {
        self.inner.policy.as_ref()
    }

    /// Number of live handles.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// True if both handles refer to the same result.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl fmt::Debug for ResolverResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverResult")
            .field("policy", &self.lb_policy().map(|p| p.name()))
            .field("ref_count", &self.ref_count())
            .field("teardown_inline", &self.inner.teardown.is_inline())
            .finish()
    }
}
