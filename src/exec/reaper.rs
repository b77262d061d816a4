//! Dedicated cleanup task.

use super::Closure;
use std::fmt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Spawns the cleanup task that runs teardown work posted by
/// [`ReaperHandle`]s.
///
/// The task exits once every handle has been dropped and the channel has
/// drained; its `JoinHandle` resolves to the number of jobs it ran.
pub struct Reaper;

impl Reaper {
    /// Spawns the task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// If called outside a tokio runtime, like `tokio::spawn`.
    pub fn spawn() -> (ReaperHandle, JoinHandle<usize>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Closure>();

        let task = tokio::spawn(async move {
            tracing::debug!("reaper started");
            let mut ran = 0usize;
            while let Some(job) = rx.recv().await {
                job();
                ran += 1;
            }
            tracing::debug!(ran, "reaper stopped");
            ran
        });

        (ReaperHandle { tx }, task)
    }
}

/// Cheap, cloneable sender side of a [`Reaper`].
#[derive(Clone)]
pub struct ReaperHandle {
    tx: mpsc::UnboundedSender<Closure>,
}

impl ReaperHandle {
    /// Posts `f` to the reaper task.
    ///
    /// Never blocks. If the task has already stopped the closure runs on the
    /// calling thread instead, so posted work is never lost.
    pub fn defer<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(mpsc::error::SendError(job)) = self.tx.send(Box::new(f)) {
            tracing::warn!("reaper stopped, running teardown inline");
            job();
        }
    }

    /// Posts the drop of `value` to the reaper task.
    pub fn defer_release<T: Send + 'static>(&self, value: T) {
        self.defer(move || drop(value));
    }

    /// True once the reaper task has exited.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl fmt::Debug for ReaperHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaperHandle").field("closed", &self.is_closed()).finish()
    }
}
