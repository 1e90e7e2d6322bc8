use hdrscan::{Host, ScanConfig, DEFAULT_HEADER, DEFAULT_WORKERS, USER_AGENT};

use anyhow::{Context, Error, Result};
use lazy_static::lazy_static;
use serde::Deserialize;
use std::{fs, io::ErrorKind, path::Path, path::PathBuf};
use structopt::StructOpt;

// this exists because structopt requires `&str` type values for defaults
// (we can't use e.g. `DEFAULT_WORKERS` or `workers()` which gets created for serde)
lazy_static! {
    static ref WORKERS_STR: String = DEFAULT_WORKERS.to_string();
}

// Macro for generating default functions to be used by serde
macro_rules! default_function {
    ( $( $name:ident : $T:ty = $e:expr; )* ) => {
        $(
            fn $name() -> $T {
                $e
            }
        )*
    };
}

// Generate the functions for serde defaults
default_function! {
    workers: usize = DEFAULT_WORKERS;
    header: String = DEFAULT_HEADER.to_string();
    user_agent: String = USER_AGENT.to_string();
}

// Macro for merging configuration values
macro_rules! fold_in {
    ( $cli:ident , $toml:ident ; $( $key:ident : $default:expr; )* ) => {
        $(
            if $cli.$key == $default && $toml.$key != $default {
                $cli.$key = $toml.$key;
            }
        )*
    };
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "hdrscan",
    about = "Scan hosts for an HTTP response header.\n\n\
             Prints `Found on host <host> <value>` for every host whose response \
             carries the header, then `All done`."
)]
pub(crate) struct HdrscanOptions {
    /// Hosts to scan, as URLs (e.g. `http://10.0.0.1`).
    /// Without any hosts (here, in the config file, or via `--hosts-file`),
    /// a small built-in list is scanned.
    #[structopt(name = "hosts")]
    raw_hosts: Vec<String>,

    /// Configuration file to use
    #[structopt(short, long = "config", default_value = "./hdrscan.toml")]
    pub config_file: String,

    #[structopt(flatten)]
    pub config: Config,
}

impl HdrscanOptions {
    /// All hosts to scan, in order: command line, config file, hosts file.
    pub(crate) fn hosts(&self) -> Result<Vec<Host>> {
        let mut hosts: Vec<Host> = self
            .raw_hosts
            .iter()
            .chain(self.config.hosts.iter())
            .map(|h| Host::new(h.as_str()))
            .collect();

        if let Some(path) = &self.config.hosts_file {
            hosts.extend(read_hosts_file(path)?);
        } else if hosts.is_empty() {
            hosts.extend_from_slice(ScanConfig::default().hosts());
        }
        Ok(hosts)
    }
}

/// One host per line. Blank lines and lines starting with `#` are skipped.
fn read_hosts_file(path: &Path) -> Result<Vec<Host>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Cannot read hosts file {}", path.display()))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(Host::new)
        .collect())
}

#[derive(Debug, Deserialize, StructOpt)]
pub struct Config {
    /// Verbose program output (prints a summary before exiting)
    #[structopt(short, long)]
    #[serde(default)]
    pub verbose: bool,

    /// Number of concurrent workers
    #[structopt(short, long, default_value = &WORKERS_STR)]
    #[serde(default = "workers")]
    pub workers: usize,

    /// Number of runtime threads to utilize.
    /// Defaults to number of cores available to the system
    #[structopt(short = "T", long)]
    #[serde(default)]
    pub threads: Option<usize>,

    /// Response header to look for (case-insensitive)
    #[structopt(short = "H", long, default_value = DEFAULT_HEADER)]
    #[serde(default = "header")]
    pub header: String,

    /// File with hosts to scan, one per line
    #[structopt(short = "f", long, parse(from_os_str))]
    #[serde(default)]
    pub hosts_file: Option<PathBuf>,

    /// Hosts to scan (config file only)
    #[structopt(skip)]
    #[serde(default)]
    pub hosts: Vec<String>,

    /// User agent
    #[structopt(short, long, default_value = USER_AGENT)]
    #[serde(default = "user_agent")]
    pub user_agent: String,

    /// Custom request headers, e.g. `accept=text/html`
    #[structopt(long = "request-header")]
    #[serde(default)]
    pub request_headers: Vec<String>,

    /// Request timeout in seconds. Without it, requests never time out.
    #[structopt(short, long)]
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Config {
    /// Load configuration from a file
    pub(crate) fn load_from_file(path: &str) -> Result<Option<Config>> {
        // Read configuration file
        let result = fs::read(path);

        // Ignore a file not found error
        let contents = match result {
            Ok(c) => c,
            Err(e) => {
                return match e.kind() {
                    ErrorKind::NotFound => Ok(None),
                    _ => Err(Error::from(e)),
                }
            }
        };

        Ok(Some(toml::from_slice(&contents)?))
    }

    /// Merge the configuration from TOML into the CLI configuration
    pub(crate) fn merge(&mut self, toml: Config) {
        fold_in! {
            // Destination and source configs
            self, toml;

            // Keys with defaults to assign
            verbose: false;
            workers: DEFAULT_WORKERS;
            threads: None;
            header: DEFAULT_HEADER;
            hosts_file: None;
            hosts: Vec::<String>::new();
            user_agent: USER_AGENT;
            request_headers: Vec::<String>::new();
            timeout: None;
        }
    }
}
