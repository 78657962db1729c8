//! Default production transport backed by ureq.
//!
//! # Design
//! One `UreqTransport` wraps one ureq agent, configured at creation time
//! with the client's TLS-verification flag. HTTP status codes are never
//! treated as transport errors (`http_status_as_error(false)`): 4xx/5xx
//! bodies flow back as data and the client decides what they mean. Only
//! failures of the round-trip itself (connect, DNS, TLS) surface as
//! `TransportFailure`.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportFactory, TransportFailure};

/// A ureq-backed transport handle.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Build an agent honoring the TLS-verification flag.
    pub fn new(secure: bool) -> Self {
        let mut config = ureq::Agent::config_builder().http_status_as_error(false);
        if !secure {
            config = config.tls_config(
                ureq::tls::TlsConfig::builder()
                    .disable_verification(true)
                    .build(),
            );
        }
        Self {
            agent: config.build().new_agent(),
        }
    }
}

impl Transport for UreqTransport {
    fn execute(&mut self, request: &HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let result = match (&request.method, &request.body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&request.url), request).call(),
            (HttpMethod::Delete, _) => {
                with_headers(self.agent.delete(&request.url), request).call()
            }
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&request.url), request)
                    .content_type("application/json")
                    .send(body.as_bytes())
            }
            (HttpMethod::Post, None) => {
                with_headers(self.agent.post(&request.url), request).send_empty()
            }
            (HttpMethod::Put, Some(body)) => {
                with_headers(self.agent.put(&request.url), request)
                    .content_type("application/json")
                    .send(body.as_bytes())
            }
            (HttpMethod::Put, None) => {
                with_headers(self.agent.put(&request.url), request).send_empty()
            }
        };

        let mut response = result.map_err(failure)?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().map_err(failure)?;
        Ok(HttpResponse { status, body })
    }
}

/// Apply basic auth and extra headers to a request builder.
fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
) -> ureq::RequestBuilder<B> {
    if let Some((user, password)) = &request.basic_auth {
        let credentials = BASE64.encode(format!("{user}:{password}"));
        builder = builder.header("Authorization", format!("Basic {credentials}"));
    }
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn failure(error: ureq::Error) -> TransportFailure {
    TransportFailure {
        message: error.to_string(),
        code: 0,
    }
}

/// Creates one `UreqTransport` per logical request.
pub struct UreqFactory;

impl TransportFactory for UreqFactory {
    fn create(&self, secure: bool) -> Box<dyn Transport> {
        Box::new(UreqTransport::new(secure))
    }
}
