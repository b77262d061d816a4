//! Batched deferred execution.

use super::Closure;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// A caller-owned scope that collects teardown work for later.
///
/// Release paths that may sit inside sensitive completion code push their
/// follow-up work here instead of running it on the current stack. The
/// owner runs the batch with [`flush`](Self::flush) once it is back at a
/// safe point; whatever is still queued when the context drops runs then.
///
/// Closures run in FIFO order. Closures queued while a flush is running are
/// picked up by the same flush.
///
/// # Example
///
/// ```rust
/// use resolvnet::exec::ExecCtx;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
///
/// let ran = Arc::new(AtomicUsize::new(0));
/// let ctx = ExecCtx::new();
///
/// let counter = Arc::clone(&ran);
/// ctx.defer(move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
/// assert_eq!(ran.load(Ordering::SeqCst), 0);
///
/// ctx.flush();
/// assert_eq!(ran.load(Ordering::SeqCst), 1);
/// ```
#[derive(Default)]
pub struct ExecCtx {
    queue: Mutex<VecDeque<Closure>>,
}

impl ExecCtx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `f` to run on the next flush.
    pub fn defer<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.lock().push_back(Box::new(f));
    }

    /// Queues the drop of `value`.
    pub fn defer_release<T: Send + 'static>(&self, value: T) {
        self.defer(move || drop(value));
    }

    /// Number of closures waiting to run.
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }

    /// Runs queued closures until the queue is empty, returning how many ran.
    ///
    /// The queue lock is not held while a closure runs, so closures may
    /// defer more work on the same context.
    pub fn flush(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.lock().pop_front();
            match next {
                Some(job) => {
                    job();
                    ran += 1;
                }
                None => break,
            }
        }
        if ran > 0 {
            tracing::trace!(ran, "flushed exec ctx");
        }
        ran
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Closure>> {
        // A panicking closure never runs with the lock held.
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for ExecCtx {
    fn drop(&mut self) {
        self.flush();
    }
}

impl fmt::Debug for ExecCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecCtx").field("pending", &self.pending()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_flush_runs_in_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let ctx = ExecCtx::new();

        for i in 0..3 {
            let order = Arc::clone(&order);
            ctx.defer(move || order.lock().unwrap().push(i));
        }
        assert_eq!(ctx.pending(), 3);
        assert!(order.lock().unwrap().is_empty());

        assert_eq!(ctx.flush(), 3);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_nested_defer_runs_in_same_flush() {
        let ctx = Arc::new(ExecCtx::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let inner_ctx = Arc::clone(&ctx);
        let inner_hits = Arc::clone(&hits);
        ctx.defer(move || {
            inner_hits.fetch_add(1, Ordering::SeqCst);
            let hits = Arc::clone(&inner_hits);
            inner_ctx.defer(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        });

        assert_eq!(ctx.flush(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_drop_flushes() {
        let hits = Arc::new(AtomicUsize::new(0));
        {
            let ctx = ExecCtx::new();
            let hits = Arc::clone(&hits);
            ctx.defer(move || {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_defer_release_drops_on_flush() {
        let value = Arc::new(());
        let ctx = ExecCtx::new();

        ctx.defer_release(Arc::clone(&value));
        assert_eq!(Arc::strong_count(&value), 2);

        ctx.flush();
        assert_eq!(Arc::strong_count(&value), 1);
    }

    #[test]
    fn test_flush_empty() {
        let ctx = ExecCtx::new();
        assert_eq!(ctx.flush(), 0);
    }
}
