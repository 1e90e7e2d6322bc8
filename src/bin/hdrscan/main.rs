#[macro_use]
extern crate log;

use anyhow::{anyhow, Result};
use headers::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;
use structopt::StructOpt;

mod options;
mod stats;

use crate::options::{Config, HdrscanOptions};
use crate::stats::ResponseStats;

use hdrscan::{ClientBuilder, Host, ScanConfig, Scanner};

fn main() -> Result<()> {
    pretty_env_logger::init();
    let mut opts = HdrscanOptions::from_args();

    // Load a potentially existing config file and merge it into the config from the CLI
    if let Some(c) = Config::load_from_file(&opts.config_file)? {
        opts.config.merge(c)
    }
    let hosts = opts.hosts()?;
    let cfg = &opts.config;

    let runtime = match cfg.threads {
        Some(0) => return Err(anyhow!("Number of threads must be greater than zero")),
        Some(threads) => {
            // We define our own runtime instead of the `tokio::main` attribute
            // since we want to make the number of threads configurable
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(threads)
                .enable_all()
                .build()?
        }
        None => tokio::runtime::Runtime::new()?,
    };

    runtime.block_on(run(cfg, hosts))
}

async fn run(cfg: &Config, hosts: Vec<Host>) -> Result<()> {
    let headers = parse_headers(&cfg.request_headers)?;
    let timeout = cfg.timeout.map(parse_timeout);

    let mut builder = ClientBuilder::default();
    builder
        .header(cfg.header.clone())
        .user_agent(cfg.user_agent.clone())
        .custom_headers(headers)
        .timeout(timeout);

    let config = ScanConfig::new(hosts, cfg.workers)?;
    debug!(
        "Scanning {} host(s) with {} workers",
        config.hosts().len(),
        config.worker_count()
    );
    let scanner = Scanner::new(config, builder);

    let cancel = scanner.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping scan");
            cancel.cancel();
        }
    });

    let mut stats = ResponseStats::new();
    let summary = scanner
        .run(|response| {
            if response.status.is_found() {
                println!("{}", response);
            }
            stats.add(response);
        })
        .await?;
    stats.finish(summary);

    if cfg.verbose {
        println!("\n{}", stats);
    }
    println!("All done");
    Ok(())
}

fn read_header(input: &str) -> Result<(String, String)> {
    let elements: Vec<_> = input.split('=').collect();
    if elements.len() != 2 {
        return Err(anyhow!(
            "Header value should be of the form key=value, got {}",
            input
        ));
    }
    Ok((elements[0].into(), elements[1].into()))
}

fn parse_timeout(timeout: u64) -> Duration {
    Duration::from_secs(timeout)
}

fn parse_headers<T: AsRef<str>>(headers: &[T]) -> Result<HeaderMap> {
    let mut out = HeaderMap::new();
    for header in headers {
        let (key, val) = read_header(header.as_ref())?;
        out.insert(
            HeaderName::from_bytes(key.as_bytes())?,
            HeaderValue::from_str(&val)?,
        );
    }
    Ok(out)
}
