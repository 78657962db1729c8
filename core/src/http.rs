//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. `ApiClient` builds `HttpRequest`
//! values and hands them to a `Transport` for the actual round-trip, so the
//! request-shaping and envelope-unwrapping logic never touches the network
//! directly. Production code uses the ureq-backed transport from
//! `crate::transport`; tests substitute a scripted one through
//! `TransportFactory`.

/// HTTP method for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// An HTTP request described as plain data.
///
/// The `url` already carries the encoded query string; `body`, when present,
/// is a JSON document.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// `(user, password)` pair sent as an HTTP Basic `Authorization` header.
    pub basic_auth: Option<(String, String)>,
}

/// An HTTP response described as plain data.
///
/// The body is kept as raw text; envelope interpretation (including JSON
/// parsing) belongs to the client, not the transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// The error state a transport reports when the round-trip itself fails.
///
/// `code` is the transport's native error code, or 0 when it has none.
#[derive(Debug, Clone)]
pub struct TransportFailure {
    pub message: String,
    pub code: i32,
}

/// A single-use HTTP transport handle.
///
/// `ApiClient` recreates its transport before every logical request, so an
/// implementation may hold per-handle configuration (TLS mode, agent state)
/// without worrying about reuse across calls.
pub trait Transport {
    fn execute(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

/// Creates transport handles on demand.
///
/// `secure` is false when TLS peer verification has been disabled on the
/// client; the factory must honor it on every handle it creates.
pub trait TransportFactory {
    fn create(&self, secure: bool) -> Box<dyn Transport>;
}
