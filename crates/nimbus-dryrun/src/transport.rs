use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use http::{Request, Response};
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Response body: either already buffered or still streaming in.
pub enum Body {
    Full(Bytes),
    Stream(BodyStream),
}

impl Body {
    pub fn empty() -> Self {
        Self::Full(Bytes::new())
    }

    /// Drain the body into one buffer. Blocks for as long as the underlying
    /// stream does.
    pub async fn collect(self) -> Result<Bytes, TransportError> {
        match self {
            Self::Full(bytes) => Ok(bytes),
            Self::Stream(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Full(bytes)
    }
}

/// Outcome of one round trip.
#[derive(Debug)]
pub enum Dispatch {
    /// The request went out (or was answered locally) and produced a response.
    Response(Response<Body>),
    /// The request was deliberately not sent. There is no response to read.
    Skipped,
}

impl Dispatch {
    /// For callers that cannot act on a skip: turns it into the
    /// [`TransportError::DryRun`] sentinel.
    pub fn into_response(self) -> Result<Response<Body>, TransportError> {
        match self {
            Self::Response(resp) => Ok(resp),
            Self::Skipped => Err(TransportError::DryRun),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// One outbound HTTP exchange.
///
/// The request's cancellation token, if any, travels in its extensions (see
/// [`with_cancellation`]). Methods return boxed futures for dyn compatibility.
pub trait Transport: Send + Sync {
    fn round_trip(&self, req: Request<Bytes>) -> BoxFuture<'_, Result<Dispatch, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn round_trip(&self, req: Request<Bytes>) -> BoxFuture<'_, Result<Dispatch, TransportError>> {
        (**self).round_trip(req)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn round_trip(&self, req: Request<Bytes>) -> BoxFuture<'_, Result<Dispatch, TransportError>> {
        (**self).round_trip(req)
    }
}

/// Attach the pass's cancellation token to a request.
pub fn with_cancellation(mut req: Request<Bytes>, cancel: &CancellationToken) -> Request<Bytes> {
    req.extensions_mut().insert(cancel.clone());
    req
}

/// The request's cancellation token. Requests without one get a token that
/// is never cancelled.
pub fn cancellation_of<B>(req: &Request<B>) -> CancellationToken {
    req.extensions()
        .get::<CancellationToken>()
        .cloned()
        .unwrap_or_else(CancellationToken::new)
}
