use std::fmt::Display;
use url::Url;

/// A scan target as it was configured, e.g. `http://10.0.0.1`.
///
/// The string is kept verbatim and only interpreted as a URL when the request
/// is made, so a bare address without a scheme stays a valid `Host` but fails
/// at request time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Host(String);

impl Host {
    pub fn new<S: Into<String>>(host: S) -> Self {
        Host(host.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the host as an absolute URL
    pub fn url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.0)
    }
}

impl Display for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Host {
    fn from(s: &str) -> Self {
        Host::new(s)
    }
}

impl From<String> for Host {
    fn from(s: String) -> Self {
        Host(s)
    }
}

/// Outcome of probing a single host
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum Status {
    /// The response carried the header with this (non-empty) value
    Found(String),
    /// A response was received, but the header was absent or empty
    Missing(http::StatusCode),
    /// Request timed out
    Timeout,
    /// Low-level error while requesting the host (DNS, connection, bad URL)
    Error(String),
    /// The scan was cancelled before this host was fully processed
    Cancelled,
}

impl Status {
    pub fn is_found(&self) -> bool {
        matches!(self, Status::Found(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Timeout | Status::Error(_))
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Found(v) => write!(f, "Found ({})", v),
            Status::Missing(c) => write!(f, "Missing ({})", c),
            Status::Timeout => f.write_str("Timeout"),
            Status::Error(e) => write!(f, "Runtime error ({})", e),
            Status::Cancelled => f.write_str("Cancelled"),
        }
    }
}

impl From<reqwest::Error> for Status {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Status::Timeout
        } else {
            Status::Error(e.to_string())
        }
    }
}

/// A host together with the outcome of probing it
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Response {
    pub host: Host,
    pub status: Status,
}

impl Response {
    pub fn new(host: Host, status: Status) -> Self {
        Response { host, status }
    }
}

impl Display for Response {
    /// Matches are rendered as `Found on host <host> <value>`, everything
    /// else as `<host> <status>`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            Status::Found(value) => write!(f, "Found on host {} {}", self.host, value),
            status => write!(f, "{} {}", self.host, status),
        }
    }
}
