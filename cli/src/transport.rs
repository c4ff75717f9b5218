//! Blocking HTTP transport backed by a ureq agent.
//!
//! The agent's cookie jar plays the browser's part: the session cookie set by
//! `/auth/login` is sent with every later request in the same process.

use book_core::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        // Non-2xx responses are data for the client to interpret, not errors.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn prepare<B>(mut builder: ureq::RequestBuilder<B>, req: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (key, value) in &req.query {
        builder = builder.query(key, value);
    }
    for (key, value) in &req.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&mut self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let body = req.body.as_deref().unwrap_or_default();
        let result = match req.method {
            HttpMethod::Get => prepare(self.agent.get(&req.path), &req).call(),
            HttpMethod::Delete => prepare(self.agent.delete(&req.path), &req).call(),
            HttpMethod::Post => prepare(self.agent.post(&req.path), &req).send(body.as_bytes()),
            HttpMethod::Put => prepare(self.agent.put(&req.path), &req).send(body.as_bytes()),
        };
        let mut response = result.map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError(e.to_string()))?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
