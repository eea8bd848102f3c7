//! Cross-origin isolation headers
//!
//! Browsers only expose `SharedArrayBuffer` (and with it threaded WebAssembly)
//! to cross-origin isolated pages. Without these headers the client silently
//! falls back to a single thread, so they go on every response.

use hyper::header::{HeaderMap, HeaderName, HeaderValue};

pub const EMBEDDER_POLICY: HeaderName = HeaderName::from_static("cross-origin-embedder-policy");
pub const OPENER_POLICY: HeaderName = HeaderName::from_static("cross-origin-opener-policy");
pub const RESOURCE_POLICY: HeaderName = HeaderName::from_static("cross-origin-resource-policy");

/// Add the isolation headers, replacing any earlier value
pub fn apply(headers: &mut HeaderMap) {
    headers.insert(EMBEDDER_POLICY, HeaderValue::from_static("require-corp"));
    headers.insert(OPENER_POLICY, HeaderValue::from_static("same-origin"));
    // Lets COEP pages on other origins embed the assets served here
    headers.insert(RESOURCE_POLICY, HeaderValue::from_static("cross-origin"));
}
