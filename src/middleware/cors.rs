//! CORS policy
//!
//! Any origin may fetch the served assets. Preflight requests are answered
//! directly with 204; every other response gains `Access-Control-Allow-Origin: *`.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_LENGTH, VARY,
};
use hyper::{Method, Response, StatusCode};

use crate::handler::RequestContext;

const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE";

/// Allow every origin
pub fn apply(headers: &mut HeaderMap) {
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
}

/// `OPTIONS` carrying `Access-Control-Request-Method`
pub fn is_preflight(ctx: &RequestContext<'_>) -> bool {
    *ctx.method == Method::OPTIONS && ctx.preflight_method.is_some()
}

/// Answer a preflight request, or `None` if this is not one
pub fn preflight_response(ctx: &RequestContext<'_>) -> Option<Response<Full<Bytes>>> {
    if !is_preflight(ctx) {
        return None;
    }

    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;

    let headers = response.headers_mut();
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));

    // Echo the requested headers back
    if let Some(requested) = ctx
        .preflight_headers
        .as_deref()
        .and_then(|h| HeaderValue::from_str(h).ok())
    {
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested);
        headers.append(
            VARY,
            HeaderValue::from_static("Access-Control-Request-Headers"),
        );
    }

    Some(response)
}
