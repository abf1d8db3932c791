//! Fluent, in-process HTTP test client.
//!
//! # Overview
//! `Client` fires synthetic requests straight into a handler under test and
//! captures the output as a `Response`, without opening a socket. Headers,
//! query parameters and bodies are configured by chaining; JSON request
//! bodies are encoded and JSON responses decoded on request.
//!
//! ```ignore
//! let mut api = testy::Client::from_service(app());
//! let response = api.set_header("X-UserName", "bob").get("/hello");
//! assert_eq!(response.status_code(), 200);
//! assert_eq!(response.text(), "hello, bob!");
//! ```
//!
//! # Design
//! - `Handler` is the only seam: closures implement it directly and any
//!   `tower::Service` does through `ServiceHandler`.
//! - Pending state persists across executions; each execution is a single
//!   synchronous pass with no retries.
//! - Faults panic so the calling test aborts where it stands. `try_*`
//!   variants return `Error` instead.

pub mod body;
pub mod client;
pub mod error;
pub mod handler;
pub mod params;
pub mod response;
pub mod target;

pub use body::RequestBody;
pub use client::Client;
pub use error::{BoxError, Error, Result};
pub use handler::{Handler, ServiceHandler};
pub use http::{Method, StatusCode};
pub use params::{Params, QueryError};
pub use response::Response;
pub use target::Target;
