//! Fluent request builder that fires requests into an in-process handler.
//!
//! # Design
//! `Client` owns the handler under test and the pending-request state:
//! query parameters, headers, an optional body and an optional decode target.
//! Configuration methods mutate that state and return `&mut Self` so calls
//! chain. Nothing is cleared after a request, so one configured client can be
//! fired repeatedly.
//!
//! Faults abort the calling test by panicking, except a malformed query
//! string, which is logged and ignored. Every fallible method has a `try_*`
//! twin that returns the error instead.

use std::fmt;

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::body::RequestBody;
use crate::error::{Error, Result};
use crate::handler::{Handler, ServiceHandler};
use crate::params::Params;
use crate::response::Response;
use crate::target::{Decode, Target};

/// Test client bound to a single handler.
pub struct Client {
    handler: Box<dyn Handler>,
    query: Params,
    headers: HeaderMap,
    body: Option<Bytes>,
    result: Option<Box<dyn Decode>>,
}

#[track_caller]
fn fail(err: Error) -> ! {
    panic!("{err}")
}

impl Client {
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            query: Params::new(),
            headers: HeaderMap::new(),
            body: None,
            result: None,
        }
    }

    /// Bind a `tower::Service` such as an axum `Router`.
    ///
    /// Panics if the private runtime cannot be started.
    #[track_caller]
    pub fn from_service<S>(service: S) -> Self
    where
        ServiceHandler<S>: Handler + 'static,
    {
        match Self::try_from_service(service) {
            Ok(client) => client,
            Err(e) => fail(e),
        }
    }

    pub fn try_from_service<S>(service: S) -> Result<Self>
    where
        ServiceHandler<S>: Handler + 'static,
    {
        Ok(Self::new(ServiceHandler::new(service)?))
    }

    // -- headers --

    /// Replace all values of header `name` with `value`.
    #[track_caller]
    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        if let Err(e) = self.try_set_header(name, value) {
            fail(e);
        }
        self
    }

    pub fn try_set_header(&mut self, name: &str, value: &str) -> Result<&mut Self> {
        let (name, value) = header_pair(name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Append `value` to header `name`, keeping earlier values.
    #[track_caller]
    pub fn add_header(&mut self, name: &str, value: &str) -> &mut Self {
        match header_pair(name, value) {
            Ok((name, value)) => {
                self.headers.append(name, value);
            }
            Err(e) => fail(e),
        }
        self
    }

    #[track_caller]
    pub fn set_headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in headers {
            self.set_header(name.as_ref(), value.as_ref());
        }
        self
    }

    // -- query parameters --

    /// Replace all values of query parameter `name` with `value`.
    pub fn set_query_param(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.query.set(name, value);
        self
    }

    /// Append `value` to query parameter `name`.
    pub fn add_query_param(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.query.add(name, value);
        self
    }

    pub fn set_query_params<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in params {
            self.query.set(name, value);
        }
        self
    }

    /// Append every value of a multi-valued mapping. Never replaces.
    pub fn set_query_params_from_values<I, K, V, S>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (name, values) in params {
            for value in values {
                self.query.add(name.as_ref(), value);
            }
        }
        self
    }

    /// Append every pair of a URL-encoded query string.
    ///
    /// Malformed input is logged at `warn` and otherwise ignored; the pending
    /// query parameters are left exactly as they were.
    pub fn set_query_string(&mut self, query: &str) -> &mut Self {
        match Params::parse(query.trim()) {
            Ok(params) => self.query.extend(params),
            Err(e) => warn!(query, error = %e, "ignoring malformed query string"),
        }
        self
    }

    // -- body and result --

    /// Set the request body. Bytes and text are sent as-is; JSON objects and
    /// arrays are encoded. Panics on any other JSON shape.
    #[track_caller]
    pub fn set_body(&mut self, body: impl Into<RequestBody>) -> &mut Self {
        if let Err(e) = self.try_set_body(body) {
            fail(e);
        }
        self
    }

    pub fn try_set_body(&mut self, body: impl Into<RequestBody>) -> Result<&mut Self> {
        self.body = Some(body.into().into_bytes()?);
        Ok(self)
    }

    /// Serialize `value` and use it as the body, same rules as `set_body`.
    #[track_caller]
    pub fn set_json<T: Serialize + ?Sized>(&mut self, value: &T) -> &mut Self {
        if let Err(e) = self.try_set_json(value) {
            fail(e);
        }
        self
    }

    pub fn try_set_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        self.try_set_body(RequestBody::json(value)?)
    }

    /// Decode every subsequent response body into `target`.
    pub fn set_result<T>(&mut self, target: &Target<T>) -> &mut Self
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.result = Some(Box::new(target.clone()));
        self
    }

    // -- pending state --

    pub fn query(&self) -> &Params {
        &self.query
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    // -- execution --

    #[track_caller]
    pub fn get(&self, path: &str) -> Response {
        self.execute(Method::GET, path)
    }

    #[track_caller]
    pub fn post(&self, path: &str) -> Response {
        self.execute(Method::POST, path)
    }

    #[track_caller]
    pub fn put(&self, path: &str) -> Response {
        self.execute(Method::PUT, path)
    }

    #[track_caller]
    pub fn delete(&self, path: &str) -> Response {
        self.execute(Method::DELETE, path)
    }

    #[track_caller]
    pub fn patch(&self, path: &str) -> Response {
        self.execute(Method::PATCH, path)
    }

    #[track_caller]
    pub fn head(&self, path: &str) -> Response {
        self.execute(Method::HEAD, path)
    }

    #[track_caller]
    pub fn options(&self, path: &str) -> Response {
        self.execute(Method::OPTIONS, path)
    }

    /// Fire a request and capture the response. Panics on any fault.
    #[track_caller]
    pub fn execute(&self, method: Method, path: &str) -> Response {
        match self.try_execute(method, path) {
            Ok(response) => response,
            Err(e) => fail(e),
        }
    }

    /// Fire a request built from the pending state.
    ///
    /// Pending query parameters are appended to `path` after a `?` without
    /// looking at any query `path` already carries. The request headers are
    /// exactly the pending header set.
    pub fn try_execute(&self, method: Method, path: &str) -> Result<Response> {
        let uri = if self.query.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{}", self.query.encode())
        };

        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .body(self.body.clone().unwrap_or_default())?;
        *request.headers_mut() = self.headers.clone();

        debug!(method = %request.method(), uri = %request.uri(), "dispatching request");
        let response = Response::new(self.handler.serve(request)?);
        debug!(
            status = response.status_code(),
            size = response.size(),
            "response captured"
        );

        if let Some(target) = &self.result {
            target.decode(response.body()).map_err(Error::Decode)?;
        }
        Ok(response)
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let invalid = |reason: String| Error::InvalidHeader {
        name: name.to_string(),
        reason,
    };
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    Ok((header_name, header_value))
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("result", &self.result.is_some())
            .finish_non_exhaustive()
    }
}
