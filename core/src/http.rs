//! HTTP transport types and the execution seam.
//!
//! # Design
//! `HttpRequest` and `HttpResponse` describe a round trip as plain data, so
//! request assembly and response interpretation stay deterministic and
//! testable without a network. The actual I/O happens behind the
//! `HttpTransport` trait — the client performs exactly one `execute` per
//! operation, and tests substitute a spy to assert what was (or was not)
//! sent. `UreqTransport` is the production implementation.
//!
//! All fields use owned types (`String`, `Vec`) so values can be captured
//! and compared freely in tests.

use crate::error::ApiError;

/// HTTP method for a request. The rewards API only uses GET and POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An HTTP request described as plain data.
///
/// `path` is the full URL (endpoint plus resource path). Headers carry the
/// basic-auth credentials and, for POST, the JSON content type.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes a single blocking HTTP round trip.
///
/// Implementations must not retry and must return non-2xx responses as data:
/// the client interprets the provider's JSON envelope, not the status code.
pub trait HttpTransport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Production transport backed by a blocking `ureq` agent.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the client
/// handle envelope interpretation.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
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

impl HttpTransport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::debug!(path = %request.path, method = ?request.method, "executing request");

        let mut response = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.path);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.path);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                let body = request.body.as_deref().unwrap_or("");
                builder.content_type("application/json").send(body.as_bytes())
            }
        }
        .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        tracing::debug!(path = %request.path, status, "received response");

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}
