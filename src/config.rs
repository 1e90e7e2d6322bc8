use crate::{ErrorKind, Host, Result};
use std::num::NonZeroUsize;

/// Number of concurrent workers used when nothing else is configured
pub const DEFAULT_WORKERS: usize = 256;

/// Hosts scanned when no targets are given
pub const DEFAULT_HOSTS: &[&str] = &["10.0.0.1", "10.0.0.2", "10.0.0.3"];

/// What to scan and with how many workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    hosts: Vec<Host>,
    worker_count: NonZeroUsize,
}

impl ScanConfig {
    /// Create a new scan configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidWorkerCount`] if `worker_count` is zero.
    pub fn new<I, H>(hosts: I, worker_count: usize) -> Result<Self>
    where
        I: IntoIterator<Item = H>,
        H: Into<Host>,
    {
        let worker_count =
            NonZeroUsize::new(worker_count).ok_or(ErrorKind::InvalidWorkerCount(worker_count))?;
        Ok(ScanConfig {
            hosts: hosts.into_iter().map(Into::into).collect(),
            worker_count,
        })
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count.get()
    }

    /// Capacity of the work queue, twice the number of workers
    pub fn queue_capacity(&self) -> usize {
        self.worker_count().saturating_mul(2)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            hosts: DEFAULT_HOSTS.iter().map(|h| Host::new(*h)).collect(),
            worker_count: NonZeroUsize::new(DEFAULT_WORKERS).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zero_workers_rejected() {
        let err = ScanConfig::new(vec!["http://10.0.0.1"], 0).unwrap_err();
        assert_eq!(err, ErrorKind::InvalidWorkerCount(0));
    }

    #[test]
    fn test_queue_capacity() {
        let config = ScanConfig::new(Vec::<Host>::new(), 8).unwrap();
        assert_eq!(config.queue_capacity(), 16);
        assert!(config.hosts().is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.worker_count(), 256);
        assert_eq!(
            config.hosts().to_vec(),
            vec![
                Host::new("10.0.0.1"),
                Host::new("10.0.0.2"),
                Host::new("10.0.0.3")
            ]
        );
    }
}
