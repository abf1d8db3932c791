//! Captured handler output.

use std::fmt;

use bytes::Bytes;
use http::response::Parts;
use http::{HeaderMap, StatusCode, Version};
use serde::de::DeserializeOwned;

/// Immutable snapshot of one execution's response.
#[derive(Debug)]
pub struct Response {
    head: Parts,
    status_line: String,
    body: Bytes,
}

impl Response {
    pub(crate) fn new(response: http::Response<Bytes>) -> Self {
        let (head, body) = response.into_parts();
        let status_line = match head.status.canonical_reason() {
            Some(reason) => format!("{} {reason}", head.status.as_u16()),
            None => head.status.as_u16().to_string(),
        };
        Self {
            head,
            status_line,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.head.status
    }

    pub fn status_code(&self) -> u16 {
        self.head.status.as_u16()
    }

    /// Status code and reason phrase, e.g. `"200 OK"`.
    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    pub fn version(&self) -> Version {
        self.head.version
    }

    /// Response head as produced by the handler.
    pub fn raw(&self) -> &Parts {
        &self.head
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Length of the body in bytes.
    pub fn size(&self) -> usize {
        self.body.len()
    }

    /// The body reinterpreted as text. Invalid UTF-8 is replaced, not rejected.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON, panicking on malformed input.
    pub fn json<T: DeserializeOwned>(&self) -> T {
        match self.try_json() {
            Ok(value) => value,
            Err(e) => panic!("response body is not valid JSON: {e}"),
        }
    }

    pub fn try_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.body))
    }
}
