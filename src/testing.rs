//! Offline HTTP plumbing for tests and dry runs.
//!
//! [`ScriptedHttpClient`] answers requests from a queue of canned responses
//! and records what was sent, so sources and the catalog client can be
//! exercised without network access.

use http_client::{Error, HttpClient, Request, Response};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A canned response.
#[derive(Debug, Clone)]
pub struct ScriptedResponse {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

impl ScriptedResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// What the client under test actually sent.
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
}

/// HTTP client that replays queued responses in order.
///
/// Running out of responses is reported as a transport error.
#[derive(Debug, Default)]
pub struct ScriptedHttpClient {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        let client = Self::new();
        for response in responses {
            client.push(response);
        }
        client
    }

    pub fn push(&self, response: ScriptedResponse) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait::async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn send(&self, mut req: Request) -> Result<Response, Error> {
        let headers = req
            .iter()
            .map(|(name, values)| {
                let joined = values
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                (name.as_str().to_string(), joined)
            })
            .collect();
        let body = req.body_string().await.unwrap_or_default();

        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                method: req.method().to_string(),
                url: req.url().to_string(),
                headers,
                body,
            });

        let scripted = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| Error::from_str(500, "no scripted response left"))?;

        let mut response = Response::new(scripted.status);
        for (name, value) in &scripted.headers {
            response.insert_header(name.as_str(), value.as_str());
        }
        response.set_body(scripted.body);
        Ok(response)
    }
}
