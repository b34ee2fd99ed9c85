use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request};

use crate::error::TransportError;
use crate::recorder::Recorder;
use crate::transport::{cancellation_of, BoxFuture, Dispatch, Transport};
use crate::verbs::VerbTable;
use crate::watch::{blocking_watch_response, is_watch};

/// Transport wrapper for dry-run passes.
///
/// - safe verbs (GET, HEAD, CONNECT, TRACE) go to the delegate unchanged
/// - a GET carrying `watch=true` is answered locally with a body that blocks
///   until the request is cancelled, so nothing streams in mid-pass
/// - every other verb is never sent: it is recorded as a planned action and
///   answered with [`Dispatch::Skipped`]
pub struct DryRunTransport<T> {
    delegate: T,
    recorder: Arc<dyn Recorder>,
    verbs: VerbTable,
}

impl<T: Transport> DryRunTransport<T> {
    pub fn new(delegate: T, recorder: Arc<dyn Recorder>, verbs: VerbTable) -> Self {
        Self {
            delegate,
            recorder,
            verbs,
        }
    }
}

fn is_safe(method: &Method) -> bool {
    method == Method::GET
        || method == Method::HEAD
        || method == Method::CONNECT
        || method == Method::TRACE
}

impl<T: Transport> Transport for DryRunTransport<T> {
    fn round_trip(&self, req: Request<Bytes>) -> BoxFuture<'_, Result<Dispatch, TransportError>> {
        Box::pin(async move {
            if !is_safe(req.method()) {
                let label = self.verbs.label(req.method());
                let path = req.uri().path();
                tracing::debug!(method = %req.method(), path = %path, "suppressing call");
                self.recorder
                    .record_fmt(&label, format_args!("Would {label} {path}"));
                return Ok(Dispatch::Skipped);
            }

            if req.method() == Method::GET && is_watch(req.uri().query())? {
                tracing::debug!(path = %req.uri().path(), "answering watch with blocking body");
                return Ok(Dispatch::Response(blocking_watch_response(
                    cancellation_of(&req),
                )));
            }

            self.delegate.round_trip(req).await
        })
    }
}
