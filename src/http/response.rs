//! HTTP response building module
//!
//! Provides builders for various HTTP status code responses, decoupled from specific business logic.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};

use super::cache::{CachePolicy, Validators};
use super::range::ByteRange;

/// Build an empty-bodied response with the given status
pub fn build_empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}

/// Build 404 Not Found response (empty body)
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_empty_response(StatusCode::NOT_FOUND)
}

/// Build 500 Internal Server Error response (empty body)
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_empty_response(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Build 304 Not Modified response
pub fn build_304_response(validators: &Validators, cache: CachePolicy) -> Response<Full<Bytes>> {
    let builder = with_validators(Response::builder().status(304), validators)
        .header(CACHE_CONTROL, cache.to_header_value());

    finish(builder, Bytes::new(), "304")
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(file_size: u64) -> Response<Full<Bytes>> {
    let builder = Response::builder()
        .status(416)
        .header(CONTENT_RANGE, format!("bytes */{file_size}"));

    finish(builder, Bytes::new(), "416")
}

/// Build JSON response that must be revalidated on every request
pub fn build_json_response(data: Bytes, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    let builder = Response::builder()
        .status(200)
        .header(CONTENT_TYPE, "application/json; charset=utf-8")
        .header(CONTENT_LENGTH, content_length)
        .header(CACHE_CONTROL, CachePolicy::NoCache.to_header_value());

    finish(builder, body, "JSON")
}

/// Build full file response with validators and cache control
///
/// `body` is empty for `HEAD`; `content_length` is always the file size.
pub fn build_cached_response(
    body: Bytes,
    content_length: u64,
    content_type: &str,
    validators: &Validators,
    cache: CachePolicy,
) -> Response<Full<Bytes>> {
    let builder = with_validators(Response::builder().status(200), validators)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, content_length)
        .header(ACCEPT_RANGES, "bytes")
        .header(CACHE_CONTROL, cache.to_header_value());

    finish(builder, body, "200")
}

/// Build 206 Partial Content response
///
/// `body` holds only the bytes of `range` (empty for `HEAD`).
pub fn build_partial_response(
    body: Bytes,
    range: ByteRange,
    file_size: u64,
    content_type: &str,
    validators: &Validators,
    cache: CachePolicy,
) -> Response<Full<Bytes>> {
    let builder = with_validators(Response::builder().status(206), validators)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_LENGTH, range.byte_count())
        .header(CONTENT_RANGE, range.content_range(file_size))
        .header(ACCEPT_RANGES, "bytes")
        .header(CACHE_CONTROL, cache.to_header_value());

    finish(builder, body, "206")
}

fn with_validators(builder: Builder, validators: &Validators) -> Builder {
    let builder = builder.header(ETAG, validators.etag.as_str());
    match validators.last_modified_header() {
        Some(date) => builder.header(LAST_MODIFIED, date),
        None => builder,
    }
}

/// Finish a builder, falling back to an empty 500 if a header was invalid
fn finish(builder: Builder, body: Bytes, label: &str) -> Response<Full<Bytes>> {
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error(label, &e);
        build_500_response()
    })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
