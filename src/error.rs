use thiserror::Error;

/// Possible errors when setting up or running a scan.
///
/// Per-host request failures are not errors at this level; they are reported
/// as a [`Status`](crate::Status) on the host's [`Response`](crate::Response).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A scan needs at least one worker
    #[error("Worker count must be greater than zero, got {0}")]
    InvalidWorkerCount(usize),
    /// The HTTP client for a worker could not be constructed
    #[error("Cannot build HTTP client: {0}")]
    BuildClient(#[from] reqwest::Error),
    /// The header to search for is not a valid header name
    #[error("Invalid header name `{0}`")]
    InvalidHeaderName(String),
    /// A header value (e.g. the user agent) could not be parsed.
    #[error("Header value could not be parsed")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
    /// All workers went away while hosts were still being enqueued
    #[error("Work queue closed before host `{0}` could be enqueued")]
    QueueClosed(String),
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidWorkerCount(c1), Self::InvalidWorkerCount(c2)) => c1 == c2,
            (Self::BuildClient(e1), Self::BuildClient(e2)) => e1.to_string() == e2.to_string(),
            (Self::InvalidHeaderName(n1), Self::InvalidHeaderName(n2))
            | (Self::QueueClosed(n1), Self::QueueClosed(n2)) => n1 == n2,
            (Self::InvalidHeaderValue(_), Self::InvalidHeaderValue(_)) => true,
            _ => false,
        }
    }
}

/// The result type used throughout `hdrscan`.
pub type Result<T> = std::result::Result<T, ErrorKind>;
