//! The handler seam between the client and the code under test.
//!
//! # Design
//! `Handler::serve` is synchronous: a request goes in, a fully buffered
//! response comes out. Plain closures implement it directly. Async
//! `tower::Service`s (an axum `Router`, for instance) are wrapped in
//! `ServiceHandler`, which owns a current-thread tokio runtime and blocks on
//! the service call and on draining the response body. No socket is opened
//! either way.

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use tower::{Service, ServiceExt};

use crate::error::{BoxError, Error, Result};

/// Anything that turns a request into a buffered response in-process.
pub trait Handler {
    fn serve(&self, request: Request<Bytes>) -> Result<Response<Bytes>>;
}

impl<F, B> Handler for F
where
    F: Fn(Request<Bytes>) -> Response<B>,
    B: Into<Bytes>,
{
    fn serve(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        Ok(self(request).map(Into::into))
    }
}

/// Runs a `tower::Service` to completion on a private runtime.
///
/// `serve` blocks the calling thread. Called from inside another tokio
/// runtime it returns `Error::Runtime` without touching the service.
pub struct ServiceHandler<S> {
    service: S,
    runtime: tokio::runtime::Runtime,
}

impl<S> ServiceHandler<S> {
    pub fn new(service: S) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;
        Ok(Self { service, runtime })
    }
}

impl<S, B> Handler for ServiceHandler<S>
where
    S: Service<Request<Full<Bytes>>, Response = Response<B>> + Clone,
    S::Error: Into<BoxError>,
    B: http_body::Body,
    B::Error: Into<BoxError>,
{
    fn serve(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::Runtime(std::io::Error::other(
                "cannot block on a handler from inside a tokio runtime",
            )));
        }

        let service = self.service.clone();
        self.runtime.block_on(async move {
            let response = service
                .oneshot(request.map(Full::new))
                .await
                .map_err(|e| Error::Handler(e.into()))?;

            let (parts, body) = response.into_parts();
            let collected = body.collect().await.map_err(|e| Error::Drain(e.into()))?;
            Ok::<_, Error>(Response::from_parts(parts, collected.to_bytes()))
        })
    }
}
