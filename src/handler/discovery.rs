//! Discovery endpoint
//!
//! `GET /stages` returns the raw bytes of `stages.json` from the install
//! directory. The file is read on every request so edits show up immediately.

use hyper::body::Bytes;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use super::pipeline::{StageOutcome, StageResult};
use super::RequestContext;
use crate::error::ServeError;
use crate::http::{self, response};

pub const STAGES_ROUTE: &str = "/stages";

/// Route matching is case-insensitive and tolerates one trailing slash
fn matches_route(path: &str) -> bool {
    let path = path.strip_suffix('/').unwrap_or(path);
    path.eq_ignore_ascii_case(STAGES_ROUTE)
}

/// Serve the discovery manifest.
///
/// A missing file finalizes the request with an empty 404; static lookup is not
/// attempted. A file that exists but cannot be read is an error (500).
pub async fn serve_stages(ctx: &RequestContext<'_>, stages_file: &Path) -> StageResult {
    if !ctx.is_read() || !matches_route(ctx.path) {
        return Ok(StageOutcome::Next);
    }

    match fs::read(stages_file).await {
        Ok(data) => Ok(StageOutcome::Handled(response::build_json_response(
            Bytes::from(data),
            ctx.is_head,
        ))),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Ok(StageOutcome::Handled(http::build_404_response()))
        }
        Err(source) => Err(ServeError::Read {
            path: stages_file.to_path_buf(),
            source,
        }),
    }
}
