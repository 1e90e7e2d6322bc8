use crate::{Host, Probe, Status};
use async_trait::async_trait;
use http::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

pub(crate) async fn get_mock_server(response_code: u16) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(response_code))
        .mount(&mock_server)
        .await;
    mock_server
}

pub(crate) async fn get_mock_server_with_header(
    response_code: u16,
    name: &str,
    value: &str,
) -> MockServer {
    let mock_server = MockServer::start().await;
    let template = ResponseTemplate::new(response_code).insert_header(name, value);
    Mock::given(method("GET"))
        .respond_with(template)
        .mount(&mock_server)
        .await;
    mock_server
}

/// Probe that answers from a fixed table and records every call.
///
/// Hosts in the table are `Found` with the given value, all others `Missing`.
/// Each call sleeps for `delay`, so concurrent calls overlap and the
/// in-flight high-water mark becomes observable.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingProbe {
    found: Arc<HashMap<Host, String>>,
    delay: Duration,
    calls: Arc<Mutex<HashMap<Host, usize>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl RecordingProbe {
    pub(crate) fn new(found: &[(&str, &str)], delay: Duration) -> Self {
        RecordingProbe {
            found: Arc::new(
                found
                    .iter()
                    .map(|(h, v)| (Host::new(*h), (*v).to_string()))
                    .collect(),
            ),
            delay,
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> HashMap<Host, usize> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Probe for RecordingProbe {
    async fn probe(&self, host: &Host) -> Status {
        *self.calls.lock().unwrap().entry(host.clone()).or_default() += 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match self.found.get(host) {
            Some(value) => Status::Found(value.clone()),
            None => Status::Missing(StatusCode::OK),
        }
    }
}
