use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    outstanding: AtomicUsize,
    notify: Notify,
}

/// Counts workers that have not exited yet.
///
/// Every worker holds a [`BarrierGuard`] obtained from [`register`] before it
/// is spawned. Dropping the guard marks the worker as exited, which happens
/// exactly once per worker no matter how the worker's task ends (including
/// panics, since the guard is dropped during unwinding).
///
/// [`register`]: CompletionBarrier::register
#[derive(Debug, Clone, Default)]
pub struct CompletionBarrier {
    inner: Arc<Inner>,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one more outstanding worker
    pub fn register(&self) -> BarrierGuard {
        self.inner.outstanding.fetch_add(1, Ordering::SeqCst);
        BarrierGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of workers that have registered but not exited
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::SeqCst)
    }

    /// Wait until every registered worker has exited.
    /// Returns immediately if nothing is outstanding.
    pub async fn wait(&self) {
        loop {
            // Created before the check so a wakeup between check and await
            // is not lost.
            let notified = self.inner.notify.notified();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Proof of registration with a [`CompletionBarrier`]
#[derive(Debug)]
pub struct BarrierGuard {
    inner: Arc<Inner>,
}

impl Drop for BarrierGuard {
    fn drop(&mut self) {
        if self.inner.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.notify.notify_waiters();
        }
    }
}
