//! Publishing results from a resolver to dispatch.
//!
//! Backed by `tokio::sync::watch`: subscribers always see the latest
//! result, and the channel's internal lock provides the happens-before edge
//! between the resolver building a result and a subscriber reading it.

use super::ResolverResult;
use crate::base::neterror::NetError;
use tokio::sync::watch;

/// Creates a connected publisher / subscriber pair with nothing published.
pub fn result_channel() -> (ResultPublisher, ResultSubscriber) {
    let (tx, rx) = watch::channel(None);
    (ResultPublisher { tx }, ResultSubscriber { rx })
}

/// Resolver side of a result channel.
#[derive(Debug)]
pub struct ResultPublisher {
    tx: watch::Sender<Option<ResolverResult>>,
}

impl ResultPublisher {
    /// Replaces the current result. The channel's reference to the previous
    /// result is released; subscribers still holding it keep it alive.
    pub fn publish(&self, result: ResolverResult) {
        tracing::debug!(?result, "publishing resolver result");
        drop(self.tx.send_replace(Some(result)));
    }

    /// Withdraws the current result, e.g. after a resolution failure.
    pub fn clear(&self) {
        drop(self.tx.send_replace(None));
    }

    pub fn subscribe(&self) -> ResultSubscriber {
        ResultSubscriber { rx: self.tx.subscribe() }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Dispatch side of a result channel.
#[derive(Debug, Clone)]
pub struct ResultSubscriber {
    rx: watch::Receiver<Option<ResolverResult>>,
}

impl ResultSubscriber {
    /// Retains the latest result, if any.
    pub fn current(&self) -> Option<ResolverResult> {
        self.rx.borrow().clone()
    }

    /// Waits for the next publish (or clear) and retains what it carried.
    ///
    /// Fails with `ResolverShutdown` once the publisher is gone.
    pub async fn changed(&mut self) -> Result<Option<ResolverResult>, NetError> {
        self.rx.changed().await.map_err(|_| NetError::ResolverShutdown)?;
        Ok(self.rx.borrow_and_update().clone())
    }
}
