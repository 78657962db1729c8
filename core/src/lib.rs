//! Synchronous client SDK for the Mediative REST API.
//!
//! # Overview
//! Authenticates with a public/secret developer key pair against the central
//! login endpoint, stores the session token, and issues CRUD requests
//! against named resources on the working domain
//! (`https://{domain}/{resource}.json`), unwrapping the service's
//! `{response: {...}}` envelopes.
//!
//! # Design
//! - `ApiClient` owns its HTTP transport and recreates it before every
//!   logical request; there is no connection reuse, retry, or caching.
//! - The transport is a trait seam (`Transport` / `TransportFactory`): the
//!   client shapes `HttpRequest` values and interprets `HttpResponse`
//!   values, the transport only moves them across the network. Production
//!   code uses the ureq-backed default; tests script their own.
//! - Every failure is a typed `ApiError` that aborts the current call.
//! - Operations block until the round-trip completes; one client per
//!   caller, the type is not safe for concurrent use.

pub mod client;
pub mod error;
pub mod http;
pub mod params;
pub mod transport;

pub use client::{ApiClient, API_BASE, VERSION};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportFactory, TransportFailure};
pub use params::{encode_query, merge_options, Options, Params};
pub use transport::{UreqFactory, UreqTransport};
