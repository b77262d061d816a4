//! Deferred execution for teardown work.
//!
//! Releasing the last reference to a resolver result releases its
//! load-balancing policy, and a policy's teardown may cascade into further
//! releases. None of that should run on a stack that is itself inside a
//! release or a completion callback, so teardown is routed through one of:
//!
//! - [`ExecCtx`]: a caller-owned batch, run on `flush()` or drop.
//! - [`Reaper`]: a dedicated tokio task fed over a channel.
//!
//! [`Teardown`] is the sink a result is configured with at build time.

mod ctx;
mod reaper;

pub use ctx::ExecCtx;
pub use reaper::{Reaper, ReaperHandle};

/// A unit of deferred work.
pub type Closure = Box<dyn FnOnce() + Send + 'static>;

/// Where a value released by a last-reference drop is sent.
#[derive(Debug, Clone, Default)]
pub enum Teardown {
    /// Drop on the releasing thread.
    #[default]
    Inline,
    /// Post to a reaper task.
    Reaper(ReaperHandle),
}

impl Teardown {
    /// Releases `value` through this sink.
    pub fn release<T: Send + 'static>(&self, value: T) {
        match self {
            Teardown::Inline => drop(value),
            Teardown::Reaper(handle) => handle.defer_release(value),
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Teardown::Inline)
    }
}

impl From<ReaperHandle> for Teardown {
    fn from(handle: ReaperHandle) -> Self {
        Teardown::Reaper(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_inline_release_drops_immediately() {
        let value = Arc::new(());
        Teardown::Inline.release(Arc::clone(&value));
        assert_eq!(Arc::strong_count(&value), 1);
        assert!(Teardown::default().is_inline());
    }

    #[tokio::test]
    async fn test_reaper_release_runs_on_task() {
        let (handle, task) = Reaper::spawn();
        let teardown = Teardown::from(handle);
        assert!(!teardown.is_inline());

        let value = Arc::new(());
        teardown.release(Arc::clone(&value));
        drop(teardown);

        assert_eq!(task.await.unwrap(), 1);
        assert_eq!(Arc::strong_count(&value), 1);
    }
}
