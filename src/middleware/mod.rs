//! Response decoration middleware
//!
//! Headers that every response carries, decided before routing.

pub mod cors;
pub mod isolation;

use hyper::header::HeaderMap;

/// Headers applied to every response, in pipeline order: CORS, then isolation
pub fn response_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    cors::apply(&mut headers);
    isolation::apply(&mut headers);
    headers
}
