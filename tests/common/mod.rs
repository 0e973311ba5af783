#![allow(dead_code)]
use async_trait::async_trait;
use http_client::{Error, HttpClient, Request, Response};
use http_types::StatusCode;
use lead_capture::{LeadCaptureClient, StaticEnvironment};
use std::sync::{Arc, Mutex};

pub const PAGE_URL: &str = "https://www.example.com/contact";
pub const ENDPOINT: &str = "https://app-sjqe.marketo.com";
pub const MUNCHKIN_ID: &str = "718-GIV-198";
pub const FORM_ID: u64 = 621;

/// A request as it reached the transport.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// URL-decoded body, for url-encoded submissions.
    pub fn decoded_body(&self) -> String {
        urlencoding::decode(&self.body)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| self.body.clone())
    }
}

/// HTTP client that records every request and answers with a canned response.
#[derive(Debug, Clone)]
pub struct RecordingClient {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    status: StatusCode,
    body: String,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::with_response(
            StatusCode::Ok,
            r#"{"formId":"621","followupUrl":"https://www.example.com/thanks"}"#,
        )
    }

    pub fn with_response(status: StatusCode, body: &str) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            status,
            body: body.to_string(),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn only_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }
}

#[async_trait]
impl HttpClient for RecordingClient {
    async fn send(&self, mut req: Request) -> Result<Response, Error> {
        let body = req.body_string().await?;
        let headers = req
            .iter()
            .map(|(name, values)| (name.as_str().to_string(), values.last().as_str().to_string()))
            .collect();

        self.requests.lock().unwrap().push(RecordedRequest {
            method: req.method().to_string(),
            url: req.url().to_string(),
            headers,
            body,
        });

        let mut response = Response::new(self.status);
        response.set_body(self.body.clone());
        Ok(response)
    }
}

/// HTTP client whose every request fails at the transport layer.
#[derive(Debug, Clone)]
pub struct FailingClient;

#[async_trait]
impl HttpClient for FailingClient {
    async fn send(&self, _req: Request) -> Result<Response, Error> {
        Err(Error::from_str(StatusCode::BadGateway, "upstream unavailable"))
    }
}

pub fn page_environment() -> StaticEnvironment {
    StaticEnvironment::new(PAGE_URL.parse().unwrap())
}

pub fn recording_client(environment: StaticEnvironment) -> (LeadCaptureClient, RecordingClient) {
    let recorder = RecordingClient::new();
    let client = LeadCaptureClient::new(Box::new(recorder.clone()), Arc::new(environment));
    (client, recorder)
}
