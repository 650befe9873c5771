use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::dates::ServerDateConverter;
use crate::forms::ApplicationFormClient;
use crate::resource::{HttpRequest, HttpResponse, Transport, TransportError};

/// Replays canned responses in order and records every request it sees.
#[derive(Default)]
pub(super) struct RecordingTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub(super) fn replying(body: Option<&str>) -> Self {
        let transport = Self::default();
        transport.push_body(body);
        transport
    }

    pub(super) fn failing(status: u16, body: &str) -> Self {
        let transport = Self::default();
        transport
            .responses
            .lock()
            .expect("response mutex poisoned")
            .push_back(Err(TransportError::Status {
                status,
                body: body.to_string(),
            }));
        transport
    }

    pub(super) fn push_body(&self, body: Option<&str>) {
        self.responses
            .lock()
            .expect("response mutex poisoned")
            .push_back(Ok(HttpResponse {
                status: 200,
                body: body.map(str::to_string),
            }));
    }

    pub(super) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request mutex poisoned").clone()
    }

    pub(super) fn single_request(&self) -> HttpRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().expect("one request")
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests
            .lock()
            .expect("request mutex poisoned")
            .push(request);
        self.responses
            .lock()
            .expect("response mutex poisoned")
            .pop_front()
            .unwrap_or(Ok(HttpResponse {
                status: 204,
                body: None,
            }))
    }
}

pub(super) type TestClient = ApplicationFormClient<RecordingTransport, ServerDateConverter>;

pub(super) fn client_with(transport: RecordingTransport) -> (TestClient, Arc<RecordingTransport>) {
    let transport = Arc::new(transport);
    let client = ApplicationFormClient::new(
        Arc::clone(&transport),
        Arc::new(ServerDateConverter::default()),
    );
    (client, transport)
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn body_json(request: &HttpRequest) -> Value {
    let body = request.body.as_deref().expect("request carries a body");
    serde_json::from_str(body).expect("request body is json")
}
