//! Bounded multi-consumer work queue of hosts.
//!
//! The producing side is a single [`Producer`]; closing the queue consumes it,
//! so the queue is closed at most once and nothing can be enqueued afterwards.
//! Any number of [`Consumer`] clones share the queue and every host is handed
//! to exactly one of them.
use crate::{ErrorKind, Host, Result};
use async_channel::{Receiver, Sender};

/// Constructor for the two ends of a work queue
pub struct WorkQueue;

impl WorkQueue {
    /// Create a queue holding at most `capacity` hosts at a time.
    ///
    /// A capacity of zero is bumped to one.
    pub fn bounded(capacity: usize) -> (Producer, Consumer) {
        let (tx, rx) = async_channel::bounded(capacity.max(1));
        (Producer { tx }, Consumer { rx })
    }
}

#[derive(Debug)]
pub struct Producer {
    tx: Sender<Host>,
}

impl Producer {
    /// Add a host, waiting while the queue is full.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::QueueClosed`] if every consumer has been
    /// dropped.
    pub async fn enqueue(&self, host: Host) -> Result<()> {
        self.tx
            .send(host)
            .await
            .map_err(|e| ErrorKind::QueueClosed(e.into_inner().to_string()))
    }

    /// Signal that no more hosts will be enqueued.
    /// Hosts already in the queue are still delivered.
    pub fn close(self) {
        self.tx.close();
    }
}

#[derive(Debug, Clone)]
pub struct Consumer {
    rx: Receiver<Host>,
}

impl Consumer {
    /// Next host, or `None` once the queue is closed and drained.
    /// Waits while the queue is open but empty.
    pub async fn receive(&self) -> Option<Host> {
        self.rx.recv().await.ok()
    }
}
