//! Error types for the Mediative API client.
//!
//! # Design
//! One variant per failure class, surfaced as-is to the caller: nothing is
//! retried or recovered internally, every error aborts the current call.
//! `Transport` carries the message and code reported by the HTTP transport
//! so network, DNS, and TLS failures stay distinguishable from protocol
//! problems.

use std::fmt;

use crate::http::TransportFailure;

/// Errors returned by `ApiClient` operations.
#[derive(Debug)]
pub enum ApiError {
    /// A credential or the domain was empty or malformed.
    Config(String),

    /// The session token was read before being set by `auth()` or
    /// `set_token()`.
    Session,

    /// The login response did not contain `auth.token.token`.
    Auth,

    /// The HTTP round-trip itself failed (network, DNS, TLS).
    Transport { message: String, code: i32 },

    /// The response body did not contain the `response` envelope field.
    Parse,

    /// `put` was called without a resolvable resource id.
    Validation,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "invalid configuration: {msg}"),
            ApiError::Session => {
                write!(f, "set your session token before making a request")
            }
            ApiError::Auth => write!(f, "invalid developer login"),
            ApiError::Transport { message, code } => {
                write!(f, "transport error {code}: {message}")
            }
            ApiError::Parse => write!(f, "cannot parse response data"),
            ApiError::Validation => write!(f, "an id is required to update"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<TransportFailure> for ApiError {
    fn from(failure: TransportFailure) -> Self {
        ApiError::Transport {
            message: failure.message,
            code: failure.code,
        }
    }
}
