//! Response header filtering.

use http::HeaderMap;
use http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE, HeaderName, HeaderValue};

/// Headers that describe one hop of the connection and must not be copied
/// across the relay.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "trailers",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// Whether an upstream response header may be forwarded downstream.
pub fn should_forward_header(name: &HeaderName) -> bool {
    !HOP_BY_HOP.contains(&name.as_str())
}

/// Build the downstream response headers from the upstream ones.
///
/// Streaming responses always advertise an uncached event stream so that
/// intermediaries flush each chunk.
pub fn downstream_headers(upstream: &HeaderMap, streaming: bool) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(upstream.len() + 4);
    for (name, value) in upstream {
        if should_forward_header(name) {
            out.append(name, value.clone());
        }
    }

    if streaming {
        out.insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
        out.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        out.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        out.insert(
            HeaderName::from_static("x-accel-buffering"),
            HeaderValue::from_static("no"),
        );
    } else if !out.contains_key(CONTENT_TYPE) {
        out.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }
    out
}
