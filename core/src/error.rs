//! Error types for the test client.
//!
//! # Design
//! Every fault the client can hit while shaping or executing a request has
//! its own variant. The fluent methods on `Client` panic with the rendered
//! message so a failing test aborts at the call site; the `try_*` methods hand
//! the same value back instead.

use thiserror::Error;

/// Boxed error produced by a handler or its response body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building, executing or decoding a request.
#[derive(Debug, Error)]
pub enum Error {
    /// `set_body` received a JSON value that is neither an object nor an array.
    #[error("unsupported body type: {0}")]
    UnsupportedBody(&'static str),

    /// A structured body could not be encoded as JSON.
    #[error("serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A header name or value is not valid HTTP.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The method or path could not form a request.
    #[error("invalid request: {0}")]
    Request(#[from] http::Error),

    /// The handler failed before producing a response.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),

    /// The runtime driving an async handler could not be started, or the
    /// caller is already inside a tokio runtime.
    #[error("runtime unavailable: {0}")]
    Runtime(#[source] std::io::Error),

    /// Reading the response body failed.
    #[error("reading response body failed: {0}")]
    Drain(#[source] BoxError),

    /// The response body could not be decoded into the registered target.
    #[error("decoding response body failed: {0}")]
    Decode(#[source] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
