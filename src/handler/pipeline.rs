//! Request pipeline
//!
//! Every request passes through, in order: CORS and isolation headers, the
//! access log, then the routing stages. The first stage that produces a
//! response finalizes the request; if none does, the answer is an empty 404.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderMap;
use hyper::{Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use super::{discovery, static_files, RequestContext};
use crate::config::{AppState, ServerConfig};
use crate::error::ServeError;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::middleware::{self, cors};

/// Result of one routing stage
#[derive(Debug)]
pub enum StageOutcome {
    /// Response is final; later stages are skipped
    Handled(Response<Full<Bytes>>),
    /// Not this stage's request
    Next,
}

pub type StageResult = Result<StageOutcome, ServeError>;

/// Routing stages, run after decoration and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preflight,
    Discovery,
    Static,
}

impl Stage {
    pub const PIPELINE: [Self; 3] = [Self::Preflight, Self::Discovery, Self::Static];

    async fn run(self, ctx: &RequestContext<'_>, config: &ServerConfig) -> StageResult {
        match self {
            Self::Preflight => Ok(cors::preflight_response(ctx)
                .map_or(StageOutcome::Next, StageOutcome::Handled)),
            Self::Discovery => discovery::serve_stages(ctx, &config.stages_file).await,
            Self::Static => static_files::serve(ctx, config).await,
        }
    }
}

/// Main entry point for HTTP request handling
///
/// The request body is never read, so any body type is accepted.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let ctx = RequestContext::from_request(&req, remote_addr);

    // 1. CORS, then cross-origin isolation
    let decorations = middleware::response_headers();

    // 2. Access log
    let logging = &state.config.logging;
    if logging.access_log {
        logger::log_access(
            &state.access_log,
            &AccessLogEntry::from_context(&ctx),
            &logging.access_log_format,
        );
    }

    // 3. Routing stages, then 404
    let mut response = route_request(&ctx, &state.config).await;

    finalize(&mut response, &decorations);
    Ok(response)
}

async fn route_request(ctx: &RequestContext<'_>, config: &ServerConfig) -> Response<Full<Bytes>> {
    for stage in Stage::PIPELINE {
        match stage.run(ctx, config).await {
            Ok(StageOutcome::Handled(response)) => return response,
            Ok(StageOutcome::Next) => {}
            Err(e) => {
                logger::log_error(&format!("{stage:?} stage failed for {}: {e}", ctx.path));
                return http::build_500_response();
            }
        }
    }

    http::build_404_response()
}

/// Merge the decoration headers into the final response
fn finalize(response: &mut Response<Full<Bytes>>, decorations: &HeaderMap) {
    let headers = response.headers_mut();
    for (name, value) in decorations {
        headers.insert(name.clone(), value.clone());
    }
}
