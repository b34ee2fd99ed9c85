use std::time::Duration;

use bytes::Bytes;
use futures::TryStreamExt;
use http::{Request, Response};

use crate::error::{format_err_chain, TransportError};
use crate::transport::{cancellation_of, Body, BoxFuture, Dispatch, Transport};

/// The real delegate: sends every request over the network.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Http(format_err_chain(&e)))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn round_trip(&self, req: Request<Bytes>) -> BoxFuture<'_, Result<Dispatch, TransportError>> {
        Box::pin(async move {
            let cancel = cancellation_of(&req);
            let (parts, body) = req.into_parts();

            tracing::trace!(method = %parts.method, uri = %parts.uri, "sending request");

            let request = self
                .client
                .request(parts.method, parts.uri.to_string())
                .headers(parts.headers)
                .body(body);

            let resp = tokio::select! {
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                resp = request.send() => resp.map_err(|e| TransportError::Http(format_err_chain(&e)))?,
            };

            let mut builder = Response::builder().status(resp.status());
            if let Some(headers) = builder.headers_mut() {
                headers.extend(resp.headers().clone());
            }

            let stream = resp
                .bytes_stream()
                .map_err(|e| TransportError::Http(format_err_chain(&e)));

            builder
                .body(Body::Stream(Box::pin(stream)))
                .map(Dispatch::Response)
                .map_err(|e| TransportError::Http(e.to_string()))
        })
    }
}
