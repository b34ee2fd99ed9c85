use bytes::Bytes;
use futures::StreamExt;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, Response, StatusCode};
use percent_encoding::percent_decode_str;
use tokio_util::sync::CancellationToken;

use crate::error::TransportError;
use crate::transport::Body;

/// Whether a query string asks for a streaming watch (`watch=true`).
///
/// The whole query is validated before the first `watch` parameter is read:
/// a `;` separator or a broken percent escape anywhere is an error.
pub fn is_watch(query: Option<&str>) -> Result<bool, TransportError> {
    let Some(query) = query else {
        return Ok(false);
    };

    let mut watch = None;
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        if pair.contains(';') {
            return Err(TransportError::InvalidQuery(format!(
                "invalid semicolon separator in query: {pair}"
            )));
        }
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode_component(key)?;
        let value = decode_component(value)?;
        if key == "watch" && watch.is_none() {
            watch = Some(value == "true" || value == "1");
        }
    }
    Ok(watch.unwrap_or(false))
}

fn decode_component(input: &str) -> Result<String, TransportError> {
    let bytes = input.as_bytes();
    let well_formed = bytes.iter().enumerate().all(|(i, b)| {
        *b != b'%'
            || bytes
                .get(i + 1..i + 3)
                .is_some_and(|h| h.iter().all(u8::is_ascii_hexdigit))
    });
    if !well_formed {
        return Err(TransportError::InvalidQuery(format!(
            "invalid percent escape in {input}"
        )));
    }

    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| TransportError::InvalidQuery(format!("{input}: {e}")))
}

/// Synthetic answer to a watch request.
///
/// Watch consumers block until data arrives or the request is cancelled, so
/// the body yields nothing and ends exactly when `cancel` fires. The caller
/// then sees an empty, closed stream.
pub fn blocking_watch_response(cancel: CancellationToken) -> Response<Body> {
    let stream = futures::stream::once(async move { cancel.cancelled_owned().await })
        .filter_map(|()| futures::future::ready(None::<Result<Bytes, TransportError>>));

    let mut resp = Response::new(Body::Stream(Box::pin(stream)));
    *resp.status_mut() = StatusCode::OK;
    resp.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    resp
}
