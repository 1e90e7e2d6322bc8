use crate::barrier::CompletionBarrier;
use crate::client::{Client, ClientBuilder, Probe};
use crate::config::ScanConfig;
use crate::queue::{Producer, WorkQueue};
use crate::types::{Response, Status};
use crate::worker::Worker;
use crate::Result;
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

type ProbeFactory<P> = Box<dyn FnMut() -> Result<P> + Send>;

/// Tally of the responses seen during a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total: usize,
    pub found: usize,
    pub missing: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl ScanSummary {
    fn add(&mut self, status: &Status) {
        self.total += 1;
        match status {
            Status::Found(_) => self.found += 1,
            Status::Missing(_) => self.missing += 1,
            Status::Timeout | Status::Error(_) => self.failed += 1,
            Status::Cancelled => self.cancelled += 1,
        }
    }
}

/// Runs a scan: starts the worker pool, feeds it every configured host and
/// waits until all workers have exited.
pub struct Scanner<P> {
    config: ScanConfig,
    make_probe: ProbeFactory<P>,
    cancel: CancellationToken,
}

impl Scanner<Client> {
    /// Scanner whose workers each get their own HTTP client from `builder`
    pub fn new(config: ScanConfig, mut builder: ClientBuilder) -> Self {
        Self::with_probe_factory(config, move || builder.build())
    }
}

impl<P: Probe + 'static> Scanner<P> {
    /// Scanner whose workers get their probe from `make_probe`, called once
    /// per worker.
    pub fn with_probe_factory<F>(config: ScanConfig, make_probe: F) -> Self
    where
        F: FnMut() -> Result<P> + Send + 'static,
    {
        Scanner {
            config,
            make_probe: Box::new(make_probe),
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the scan when cancelled.
    ///
    /// Workers check it before taking a host and before every request;
    /// requests in flight are abandoned.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Scan every configured host, calling `on_response` for each processed
    /// host as results come in.
    ///
    /// # Errors
    ///
    /// Fails only if a worker's probe cannot be created, in which case no
    /// host is enqueued. Failing hosts are reported through `on_response`.
    pub async fn run<F>(mut self, mut on_response: F) -> Result<ScanSummary>
    where
        F: FnMut(&Response),
    {
        let workers = self.config.worker_count();
        let barrier = CompletionBarrier::new();
        let (producer, consumer) = WorkQueue::bounded(self.config.queue_capacity());
        let (send_resp, mut recv_resp) = mpsc::channel(workers);

        // Build every probe first so a failure leaves no worker running
        let probes = (0..workers)
            .map(|_| (self.make_probe)())
            .collect::<Result<Vec<_>>>()?;

        for (id, probe) in probes.into_iter().enumerate() {
            // Registered before spawning; the count can't reach zero early
            let guard = barrier.register();
            let worker = Worker::new(
                id,
                consumer.clone(),
                send_resp.clone(),
                probe,
                self.cancel.clone(),
                guard,
            );
            tokio::spawn(worker.listen());
        }
        drop(consumer);
        drop(send_resp);
        debug!("Started {} workers", workers);

        let feed = feed(producer, &self.config, &self.cancel);
        let collect = async {
            let mut summary = ScanSummary::default();
            while let Some(response) = recv_resp.recv().await {
                summary.add(&response.status);
                on_response(&response);
            }
            summary
        };
        let ((), summary) = tokio::join!(feed, collect);

        barrier.wait().await;
        info!(
            "Scanned {} host(s): {} found, {} failed",
            summary.total, summary.found, summary.failed
        );
        Ok(summary)
    }
}

/// Enqueue all hosts in order, then close the queue.
/// Stops early on cancellation; the queue is closed either way.
async fn feed(producer: Producer, config: &ScanConfig, cancel: &CancellationToken) {
    for host in config.hosts() {
        if cancel.is_cancelled() {
            debug!("Scan cancelled, not enqueueing remaining hosts");
            break;
        }
        let enqueued = tokio::select! {
            _ = cancel.cancelled() => break,
            res = producer.enqueue(host.clone()) => res,
        };
        if let Err(e) = enqueued {
            warn!("{}", e);
            break;
        }
    }
    producer.close();
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{get_mock_server, get_mock_server_with_header, RecordingProbe};
    use crate::{ErrorKind, Host};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn recording_scanner(config: ScanConfig, probe: &RecordingProbe) -> Scanner<RecordingProbe> {
        let probe = probe.clone();
        Scanner::with_probe_factory(config, move || Ok(probe.clone()))
    }

    async fn found_lines<P: Probe + 'static>(scanner: Scanner<P>) -> (Vec<String>, ScanSummary) {
        let mut lines = Vec::new();
        let summary = scanner
            .run(|response| {
                if response.status.is_found() {
                    lines.push(response.to_string());
                }
            })
            .await
            .unwrap();
        (lines, summary)
    }

    #[tokio::test]
    async fn test_every_host_attempted_once() {
        let hosts: Vec<String> = (0..500).map(|i| format!("http://host-{}", i)).collect();
        let config = ScanConfig::new(hosts.clone(), 16).unwrap();
        let probe = RecordingProbe::new(&[], Duration::from_millis(1));

        let (_, summary) = found_lines(recording_scanner(config, &probe)).await;

        let calls = probe.calls();
        assert_eq!(calls.len(), 500);
        assert!(calls.values().all(|&count| count == 1));
        for host in hosts {
            assert_eq!(calls.get(&Host::new(host)), Some(&1));
        }
        assert_eq!(summary.total, 500);
        assert_eq!(summary.missing, 500);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let hosts: Vec<String> = (0..200).map(|i| format!("http://host-{}", i)).collect();
        let config = ScanConfig::new(hosts, 8).unwrap();
        let probe = RecordingProbe::new(&[], Duration::from_millis(10));

        found_lines(recording_scanner(config, &probe)).await;

        assert!(probe.max_in_flight() <= 8);
        assert!(probe.max_in_flight() > 1);
    }

    #[tokio::test]
    async fn test_found_lines_exactly_once() {
        let config = ScanConfig::new(vec!["http://a", "http://b", "http://c"], 4).unwrap();
        let probe = RecordingProbe::new(
            &[("http://a", "1.2.3.4"), ("http://c", "10.1.1.1")],
            Duration::from_millis(0),
        );

        let (mut lines, summary) = found_lines(recording_scanner(config, &probe)).await;
        lines.sort();

        assert_eq!(
            lines,
            vec![
                "Found on host http://a 1.2.3.4".to_string(),
                "Found on host http://c 10.1.1.1".to_string(),
            ]
        );
        assert_eq!(summary.found, 2);
        assert_eq!(summary.missing, 1);
    }

    #[tokio::test]
    async fn test_runs_are_repeatable() {
        let found = [("http://x", "1.1.1.1"), ("http://y", "2.2.2.2")];
        let hosts = vec!["http://x", "http://y", "http://z"];

        let mut results = Vec::new();
        for _ in 0..2 {
            let probe = RecordingProbe::new(&found, Duration::from_millis(1));
            let config = ScanConfig::new(hosts.clone(), 3).unwrap();
            let (lines, _) = found_lines(recording_scanner(config, &probe)).await;
            results.push(lines.into_iter().collect::<HashSet<_>>());
        }
        assert_eq!(results[0], results[1]);
    }

    #[tokio::test]
    async fn test_empty_host_list() {
        let config = ScanConfig::new(Vec::<Host>::new(), 256).unwrap();
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let probe = RecordingProbe::default();
        let scanner = Scanner::with_probe_factory(config, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(probe.clone())
        });

        let (lines, summary) = found_lines(scanner).await;
        assert!(lines.is_empty());
        assert_eq!(summary, ScanSummary::default());
        assert_eq!(built.load(Ordering::SeqCst), 256);
    }

    #[tokio::test]
    async fn test_cancelled_before_run() {
        let config = ScanConfig::new(vec!["http://a", "http://b"], 2).unwrap();
        let probe = RecordingProbe::new(&[("http://a", "1.2.3.4")], Duration::from_millis(0));
        let scanner = recording_scanner(config, &probe);
        scanner.cancellation_token().cancel();

        let (lines, summary) = found_lines(scanner).await;
        assert!(lines.is_empty());
        assert_eq!(summary.total, 0);
        assert!(probe.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_scan() {
        let hosts: Vec<String> = (0..100).map(|i| format!("http://host-{}", i)).collect();
        let config = ScanConfig::new(hosts, 2).unwrap();
        let probe = RecordingProbe::new(&[], Duration::from_secs(60));
        let scanner = recording_scanner(config, &probe);
        let cancel = scanner.cancellation_token();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        });

        let summary = tokio::time::timeout(Duration::from_secs(10), scanner.run(|_| {}))
            .await
            .expect("cancelled scan did not finish")
            .unwrap();
        assert_eq!(summary.cancelled, 2);
        assert!(probe.calls().len() <= 2);
    }

    #[tokio::test]
    async fn test_probe_factory_failure() {
        let config = ScanConfig::new(vec!["http://a"], 2).unwrap();
        let scanner: Scanner<RecordingProbe> = Scanner::with_probe_factory(config, || {
            Err(ErrorKind::InvalidHeaderName("bad header".to_string()))
        });
        let err = scanner.run(|_| {}).await.unwrap_err();
        assert_eq!(err, ErrorKind::InvalidHeaderName("bad header".to_string()));
    }

    #[tokio::test]
    async fn test_scan_mock_servers() {
        let with_header = get_mock_server_with_header(200, "x-forwarded-for", "1.2.3.4").await;
        let without_header = get_mock_server(200).await;
        let hosts = vec![
            with_header.uri(),
            without_header.uri(),
            // Nothing listens here
            "http://127.0.0.1:1".to_string(),
            // No scheme, never a valid request target
            "10.0.0.2".to_string(),
        ];
        let config = ScanConfig::new(hosts, 4).unwrap();

        let (lines, summary) = found_lines(Scanner::new(config, ClientBuilder::default())).await;

        assert_eq!(
            lines,
            vec![format!("Found on host {} 1.2.3.4", with_header.uri())]
        );
        assert_eq!(summary.total, 4);
        assert_eq!(summary.found, 1);
        assert_eq!(summary.missing, 1);
        assert_eq!(summary.failed, 2);
    }
}
