//! Scripted transport shared by the unit tests.

use std::collections::VecDeque;

use crate::http::{HttpRequest, HttpResponse, Transport, TransportError};

/// Replays queued responses in order and records every request it sees.
/// Running out of responses is reported as a transport failure.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    responses: VecDeque<Result<HttpResponse, TransportError>>,
    pub requests: Vec<HttpRequest>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, status: u16, body: &str) -> Self {
        self.push(status, body);
        self
    }

    pub fn fail(mut self, message: &str) -> Self {
        self.responses
            .push_back(Err(TransportError(message.to_string())));
        self
    }

    pub fn push(&mut self, status: u16, body: &str) {
        self.responses.push_back(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }));
    }

    /// `"METHOD path"` for each recorded request, base URL stripped.
    pub fn calls(&self) -> Vec<String> {
        self.requests
            .iter()
            .map(|r| {
                let path = r.path.split_once("://").map_or(r.path.as_str(), |(_, rest)| {
                    rest.find('/').map_or("/", |i| &rest[i..])
                });
                format!("{} {path}", r.method)
            })
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&mut self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.push(request);
        self.responses
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted response".to_string())))
    }
}
