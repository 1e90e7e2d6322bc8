//! `hdrscan` scans a list of hosts concurrently and reports every host whose
//! HTTP response carries a given header (by default `X-Forwarded-For`).
//!
//! The main entry point is [`Scanner`], which runs a fixed pool of workers
//! over a bounded work queue. Each worker owns its own HTTP client.
//!
//! Example:
//! ```no_run
//! use hdrscan::{ClientBuilder, ScanConfig, Scanner};
//! use std::error::Error;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn Error>> {
//!   let config = ScanConfig::new(vec!["http://10.0.0.1"], 256)?;
//!   let scanner = Scanner::new(config, ClientBuilder::default());
//!   scanner
//!       .run(|response| {
//!           if response.status.is_found() {
//!               println!("{}", response);
//!           }
//!       })
//!       .await?;
//!   println!("All done");
//!   Ok(())
//! }
//! ```

mod barrier;
mod client;
mod config;
mod error;
mod scanner;
mod types;
mod worker;

pub mod queue;

#[cfg(test)]
mod test_utils;

pub use barrier::{BarrierGuard, CompletionBarrier};
pub use client::{Client, ClientBuilder, Probe, DEFAULT_HEADER, USER_AGENT};
pub use config::{ScanConfig, DEFAULT_HOSTS, DEFAULT_WORKERS};
pub use error::{ErrorKind, Result};
pub use scanner::{ScanSummary, Scanner};
pub use tokio_util::sync::CancellationToken;
pub use types::{Host, Response, Status};
pub use worker::Worker;
