//! Request handler module
//!
//! Responsible for the request pipeline: decoration, access logging, and the
//! ordered routing stages (preflight, discovery, static files, 404).

pub mod discovery;
pub mod pipeline;
pub mod static_files;

use hyper::header::{HeaderMap, HeaderName};
use hyper::{Method, Request};
use std::net::SocketAddr;

// Re-export main entry point
pub use pipeline::handle_request;

/// Request context encapsulating information needed for request processing
#[derive(Debug)]
pub struct RequestContext<'a> {
    pub method: &'a Method,
    /// Raw (still percent-encoded) request path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub if_range: Option<String>,
    pub range_header: Option<String>,
    /// `Access-Control-Request-Method`, present on CORS preflight
    pub preflight_method: Option<String>,
    /// `Access-Control-Request-Headers`
    pub preflight_headers: Option<String>,
    pub remote_addr: Option<SocketAddr>,
}

impl<'a> RequestContext<'a> {
    pub fn from_request<B>(req: &'a Request<B>, remote_addr: Option<SocketAddr>) -> Self {
        let headers = req.headers();
        let method = req.method();

        Self {
            method,
            path: req.uri().path(),
            query: req.uri().query(),
            is_head: *method == Method::HEAD,
            if_none_match: header_string(headers, &hyper::header::IF_NONE_MATCH),
            if_modified_since: header_string(headers, &hyper::header::IF_MODIFIED_SINCE),
            if_range: header_string(headers, &hyper::header::IF_RANGE),
            range_header: header_string(headers, &hyper::header::RANGE),
            preflight_method: header_string(
                headers,
                &hyper::header::ACCESS_CONTROL_REQUEST_METHOD,
            ),
            preflight_headers: header_string(
                headers,
                &hyper::header::ACCESS_CONTROL_REQUEST_HEADERS,
            ),
            remote_addr,
        }
    }

    /// `GET` or `HEAD`
    pub fn is_read(&self) -> bool {
        *self.method == Method::GET || self.is_head
    }
}

/// Header value as an owned string; non-ASCII values are ignored
fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
