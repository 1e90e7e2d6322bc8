use crate::barrier::BarrierGuard;
use crate::client::Probe;
use crate::queue::Consumer;
use crate::types::{Host, Response, Status};
use log::{debug, trace};
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

/// Pulls hosts from the work queue until it is closed and drained.
pub struct Worker<P> {
    id: usize,
    hosts: Consumer,
    responses: Sender<Response>,
    probe: P,
    cancel: CancellationToken,
    _guard: BarrierGuard,
}

impl<P: Probe> Worker<P> {
    pub fn new(
        id: usize,
        hosts: Consumer,
        responses: Sender<Response>,
        probe: P,
        cancel: CancellationToken,
        guard: BarrierGuard,
    ) -> Self {
        Worker {
            id,
            hosts,
            responses,
            probe,
            cancel,
            _guard: guard,
        }
    }

    /// Process hosts until the queue is exhausted or the scan is cancelled.
    /// Returns the number of hosts this worker handled.
    ///
    /// The barrier guard is released when the worker is dropped at the end
    /// of this call.
    pub async fn listen(self) -> usize {
        let mut handled = 0;
        while let Some(host) = self.next_host().await {
            let status = self.check(&host).await;
            handled += 1;
            if self.responses.send(Response::new(host, status)).await.is_err() {
                // Nobody is listening for results anymore
                break;
            }
        }
        trace!("Worker {} exiting after {} host(s)", self.id, handled);
        handled
    }

    async fn next_host(&self) -> Option<Host> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => None,
            host = self.hosts.receive() => host,
        }
    }

    async fn check(&self, host: &Host) -> Status {
        if self.cancel.is_cancelled() {
            return Status::Cancelled;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => {
                debug!("Request to {} cancelled", host);
                Status::Cancelled
            }
            status = self.probe.probe(host) => status,
        }
    }
}
