use crate::{
    types::{Host, Status},
    ErrorKind, Result,
};
use async_trait::async_trait;
use derive_builder::Builder;
use headers::{HeaderMap, HeaderName, HeaderValue};
use log::trace;
use reqwest::header;
use std::time::Duration;

/// Header searched for when none is configured
pub const DEFAULT_HEADER: &str = "x-forwarded-for";

/// Default `User-Agent` sent with every request
pub const USER_AGENT: &str = concat!("hdrscan/", env!("CARGO_PKG_VERSION"));

/// Something that can request a host and tell whether the target header is
/// present.
///
/// Each worker owns one probe for its entire lifetime.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, host: &Host) -> Status;
}

/// HTTP client that issues a GET request per host and inspects the response
/// headers.
#[derive(Debug, Clone)]
pub struct Client {
    reqwest_client: reqwest::Client,
    header: HeaderName,
}

/// Builder for [`Client`].
///
/// The builder is cheap to clone and [`ClientBuilder::build`] can be called
/// repeatedly; every call creates an independent connection pool.
#[derive(Builder, Debug)]
#[builder(build_fn(skip))]
#[builder(setter(into))]
#[builder(name = "ClientBuilder")]
#[allow(dead_code)]
pub struct ClientBuilderInternal {
    /// Name of the header to look for, matched case-insensitively
    header: String,
    user_agent: String,
    /// Timeout for the whole request. Without it, the client's defaults apply.
    timeout: Option<Duration>,
    custom_headers: HeaderMap,
}

impl ClientBuilder {
    pub fn build(&mut self) -> Result<Client> {
        let name = self
            .header
            .clone()
            .unwrap_or_else(|| DEFAULT_HEADER.to_string());
        let header = canonical_header_name(&name)?;

        let user_agent = self
            .user_agent
            .clone()
            .unwrap_or_else(|| USER_AGENT.to_string());

        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_str(&user_agent)?);
        if let Some(custom) = &self.custom_headers {
            headers.extend(custom.clone());
        }

        let builder = reqwest::ClientBuilder::new().default_headers(headers);
        let builder = match self.timeout.flatten() {
            Some(t) => builder.timeout(t),
            None => builder,
        };

        Ok(Client {
            reqwest_client: builder.build()?,
            header,
        })
    }
}

/// Header names are case-insensitive; `HeaderName` stores them lowercased.
fn canonical_header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|_| ErrorKind::InvalidHeaderName(name.to_string()))
}

/// Look up `name` in `headers`.
/// Only the first value counts, and an empty value is the same as no header.
fn header_status(status: http::StatusCode, headers: &HeaderMap, name: &HeaderName) -> Status {
    match headers.get(name) {
        Some(value) if !value.is_empty() => {
            Status::Found(String::from_utf8_lossy(value.as_bytes()).into_owned())
        }
        _ => Status::Missing(status),
    }
}

impl Client {
    /// The header this client looks for
    #[cfg(test)]
    pub(crate) fn header(&self) -> &HeaderName {
        &self.header
    }

    pub async fn check(&self, host: &Host) -> Status {
        let url = match host.url() {
            Ok(url) => url,
            Err(e) => {
                trace!("Skipping {}: not a valid URL ({})", host, e);
                return Status::Error(format!("Cannot parse {} as URL: {}", host, e));
            }
        };

        match self.reqwest_client.get(url).send().await {
            Ok(response) => header_status(response.status(), response.headers(), &self.header),
            Err(e) => {
                trace!("Request to {} failed: {:?}", host, e);
                e.into()
            }
        }
    }
}

#[async_trait]
impl Probe for Client {
    async fn probe(&self, host: &Host) -> Status {
        self.check(host).await
    }
}
