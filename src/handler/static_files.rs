//! Static file serving module
//!
//! Maps request paths onto files under the root directory, with index file
//! support, conditional requests and single byte ranges.

use hyper::body::Bytes;
use hyper::Response;
use http_body_util::Full;
use percent_encoding::percent_decode_str;
use std::fs::Metadata;
use std::io::{self, ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use super::pipeline::{StageOutcome, StageResult};
use super::RequestContext;
use crate::config::ServerConfig;
use crate::error::ServeError;
use crate::http::cache::{CachePolicy, Validators};
use crate::http::{self, mime, response, RangeParseResult};
use crate::logger;

/// Serve a file from the root directory, or fall through
pub async fn serve(ctx: &RequestContext<'_>, config: &ServerConfig) -> StageResult {
    if !ctx.is_read() {
        return Ok(StageOutcome::Next);
    }

    let Some(relative) = sanitize_path(ctx.path) else {
        logger::log_warning(&format!("Rejected request path: {}", ctx.path));
        return Ok(StageOutcome::Next);
    };

    let Some((file_path, metadata)) =
        locate_file(&config.root_dir, &relative, &config.http.index_files).await
    else {
        return Ok(StageOutcome::Next);
    };

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    let validators = Validators::new(metadata.len(), metadata.modified().ok());
    let cache = CachePolicy::Public(config.http.max_age);

    match build_static_file_response(
        ctx,
        &file_path,
        metadata.len(),
        content_type,
        &validators,
        cache,
    )
    .await
    {
        Ok(response) => Ok(StageOutcome::Handled(response)),
        // Removed between lookup and read
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(StageOutcome::Next),
        Err(source) => Err(ServeError::Read {
            path: file_path,
            source,
        }),
    }
}

/// Decode a request path into a relative path that cannot climb out of the root.
///
/// Returns `None` for invalid encodings, NUL bytes, backslashes and any `..`
/// segment. Empty and `.` segments are dropped.
pub fn sanitize_path(path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    if decoded.contains('\0') || decoded.contains('\\') {
        return None;
    }

    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            s => relative.push(s),
        }
    }
    Some(relative)
}

/// Resolve `relative` under `root` to a regular file, trying index files for
/// directories. Anything that escapes `root` after symlink resolution is
/// treated as absent.
async fn locate_file(
    root: &Path,
    relative: &Path,
    index_files: &[String],
) -> Option<(PathBuf, Metadata)> {
    let (path, metadata) = contained(root, &root.join(relative)).await?;

    if metadata.is_file() {
        return Some((path, metadata));
    }
    if !metadata.is_dir() {
        return None;
    }

    for index_file in index_files {
        if let Some((index_path, index_meta)) = contained(root, &path.join(index_file)).await {
            if index_meta.is_file() {
                return Some((index_path, index_meta));
            }
        }
    }
    None
}

/// Canonicalize `candidate` and require it to stay under `root`
async fn contained(root: &Path, candidate: &Path) -> Option<(PathBuf, Metadata)> {
    // File not found is common (404), no need to log
    let canonical = fs::canonicalize(candidate).await.ok()?;
    if !canonical.starts_with(root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            candidate.display(),
            canonical.display()
        ));
        return None;
    }
    let metadata = fs::metadata(&canonical).await.ok()?;
    Some((canonical, metadata))
}

/// Build static file response with conditional and Range support.
///
/// Only the bytes that end up in the body are read; `HEAD` and 304 read nothing.
async fn build_static_file_response(
    ctx: &RequestContext<'_>,
    path: &Path,
    size: u64,
    content_type: &str,
    validators: &Validators,
    cache: CachePolicy,
) -> io::Result<Response<Full<Bytes>>> {
    // Check if client has cached version
    if validators.is_not_modified(
        ctx.if_none_match.as_deref(),
        ctx.if_modified_since.as_deref(),
    ) {
        return Ok(response::build_304_response(validators, cache));
    }

    // A stale If-Range validator means the client wants the whole file
    let range_header = ctx
        .range_header
        .as_deref()
        .filter(|_| validators.if_range_matches(ctx.if_range.as_deref()));

    let response = match http::parse_range_header(range_header, size) {
        RangeParseResult::Valid(range) => {
            let body = if ctx.is_head {
                Bytes::new()
            } else {
                read_bytes(path, range.start, range.byte_count()).await?
            };
            response::build_partial_response(body, range, size, content_type, validators, cache)
        }
        RangeParseResult::NotSatisfiable => response::build_416_response(size),
        RangeParseResult::None => {
            let body = if ctx.is_head {
                Bytes::new()
            } else {
                read_bytes(path, 0, size).await?
            };
            response::build_cached_response(body, size, content_type, validators, cache)
        }
    };
    Ok(response)
}

/// Read exactly `count` bytes starting at `start` from the file at `path`
async fn read_bytes(path: &Path, start: u64, count: u64) -> io::Result<Bytes> {
    if count == 0 {
        return Ok(Bytes::new());
    }

    let mut file = fs::File::open(path).await?;
    file.seek(SeekFrom::Start(start)).await?;

    let mut buf = Vec::with_capacity(usize::try_from(count).unwrap_or_default());
    file.take(count).read_to_end(&mut buf).await?;

    // Truncated after the metadata was read
    if u64::try_from(buf.len()).ok() != Some(count) {
        return Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            "file shrank while being served",
        ));
    }
    Ok(Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{HttpConfig, LoggingConfig};
    use http_body_util::BodyExt;
    use hyper::{Method, Request, StatusCode};
    use std::fs as std_fs;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        dir: TempDir,
        config: ServerConfig,
    }

    /// Root with `index.html`, `app.wasm`, `assets/style.css`, and a secret
    /// file next to (outside) the root
    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let root = dir.path().join("public");
        std_fs::create_dir_all(root.join("assets")).unwrap();
        std_fs::create_dir_all(root.join("empty")).unwrap();
        std_fs::write(root.join("index.html"), b"<h1>hi</h1>").unwrap();
        std_fs::write(root.join("app.wasm"), vec![7u8; 1000]).unwrap();
        std_fs::write(root.join("assets").join("style.css"), b"body{}").unwrap();
        std_fs::write(root.join("assets").join("index.html"), b"assets").unwrap();
        std_fs::write(root.join("with space.txt"), b"spaced").unwrap();
        std_fs::write(root.join("ramp.bin"), (0..=255u8).collect::<Vec<_>>()).unwrap();
        std_fs::write(dir.path().join("secret.txt"), b"top secret").unwrap();

        let config = ServerConfig {
            addr: "127.0.0.1:8080".parse().unwrap(),
            port: 8080,
            root_dir: root.canonicalize().unwrap(),
            stages_file: dir.path().join("stages.json"),
            logging: LoggingConfig {
                access_log: false,
                access_log_format: "default".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            http: HttpConfig {
                index_files: vec!["index.html".to_string()],
                max_age: 0,
                keep_alive: true,
            },
        };
        Fixture { dir, config }
    }

    async fn get(config: &ServerConfig, req: Request<()>) -> Option<Response<Full<Bytes>>> {
        let ctx = RequestContext::from_request(&req, None);
        match serve(&ctx, config).await.unwrap() {
            StageOutcome::Handled(resp) => Some(resp),
            StageOutcome::Next => None,
        }
    }

    fn request(path: &str) -> Request<()> {
        Request::builder().uri(path).body(()).unwrap()
    }

    async fn body(resp: Response<Full<Bytes>>) -> Bytes {
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/"), Some(PathBuf::new()));
        assert_eq!(
            sanitize_path("/a/./b//c.js"),
            Some(PathBuf::from("a").join("b").join("c.js"))
        );
        assert_eq!(
            sanitize_path("/with%20space.txt"),
            Some(PathBuf::from("with space.txt"))
        );
        assert_eq!(sanitize_path("/../secret.txt"), None);
        assert_eq!(sanitize_path("/a/%2e%2e/%2e%2e/secret.txt"), None);
        assert_eq!(sanitize_path("/..%2fsecret.txt"), None);
        assert_eq!(sanitize_path("/a%5c..%5csecret.txt"), None);
        assert_eq!(sanitize_path("/a%00.txt"), None);
        assert_eq!(sanitize_path("/%ff"), None);
    }

    #[tokio::test]
    async fn test_serves_file_bytes() {
        let f = fixture();
        let resp = get(&f.config, request("/app.wasm")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "application/wasm");
        assert_eq!(resp.headers()["content-length"], "1000");
        assert!(resp.headers().contains_key("last-modified"));
        assert_eq!(body(resp).await, vec![7u8; 1000]);
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let f = fixture();
        let resp = get(&f.config, request("/")).await.unwrap();
        assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");
        assert_eq!(&body(resp).await[..], b"<h1>hi</h1>");

        let resp = get(&f.config, request("/assets")).await.unwrap();
        assert_eq!(&body(resp).await[..], b"assets");
    }

    #[tokio::test]
    async fn test_percent_encoded_name() {
        let f = fixture();
        let resp = get(&f.config, request("/with%20space.txt")).await.unwrap();
        assert_eq!(resp.headers()["content-type"], "text/plain; charset=utf-8");
        assert_eq!(&body(resp).await[..], b"spaced");
    }

    #[tokio::test]
    async fn test_directory_without_index_falls_through() {
        let f = fixture();
        assert!(get(&f.config, request("/empty/")).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_and_traversal_fall_through() {
        let f = fixture();
        assert!(get(&f.config, request("/missing.txt")).await.is_none());
        assert!(get(&f.config, request("/../secret.txt")).await.is_none());
        assert!(get(&f.config, request("/%2e%2e/secret.txt")).await.is_none());
        assert!(get(&f.config, request("/app.wasm/x")).await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_falls_through() {
        let f = fixture();
        let outside = f.dir.path().join("secret.txt");
        std::os::unix::fs::symlink(outside, f.config.root_dir.join("link.txt")).unwrap();
        assert!(get(&f.config, request("/link.txt")).await.is_none());
    }

    #[tokio::test]
    async fn test_non_read_methods_fall_through() {
        let f = fixture();
        let req = Request::builder()
            .method(Method::POST)
            .uri("/app.wasm")
            .body(())
            .unwrap();
        assert!(get(&f.config, req).await.is_none());
    }

    #[tokio::test]
    async fn test_head_has_length_but_no_body() {
        let f = fixture();
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/app.wasm")
            .body(())
            .unwrap();
        let resp = get(&f.config, req).await.unwrap();
        assert_eq!(resp.headers()["content-length"], "1000");
        assert!(body(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_range_request() {
        let f = fixture();
        let req = Request::builder()
            .uri("/app.wasm")
            .header("range", "bytes=100-199")
            .body(())
            .unwrap();
        let resp = get(&f.config, req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()["content-range"], "bytes 100-199/1000");
        assert_eq!(body(resp).await.len(), 100);

        let req = Request::builder()
            .uri("/app.wasm")
            .header("range", "bytes=5000-")
            .body(())
            .unwrap();
        let resp = get(&f.config, req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    }

    #[tokio::test]
    async fn test_range_reads_requested_slice() {
        let f = fixture();
        let req = Request::builder()
            .uri("/ramp.bin")
            .header("range", "bytes=10-19")
            .body(())
            .unwrap();
        let resp = get(&f.config, req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.headers()["content-range"], "bytes 10-19/256");
        assert_eq!(&body(resp).await[..], &(10..20u8).collect::<Vec<_>>()[..]);

        let req = Request::builder()
            .uri("/ramp.bin")
            .header("range", "bytes=-3")
            .body(())
            .unwrap();
        let resp = get(&f.config, req).await.unwrap();
        assert_eq!(&body(resp).await[..], &[253u8, 254, 255][..]);
    }

    #[tokio::test]
    async fn test_etag_comes_from_metadata() {
        let f = fixture();
        let path = f.config.root_dir.join("ramp.bin");
        let meta = std_fs::metadata(&path).unwrap();
        let expected = crate::http::cache::generate_etag(meta.len(), meta.modified().ok());

        let resp = get(&f.config, request("/ramp.bin")).await.unwrap();
        assert_eq!(resp.headers()["etag"], expected.as_str());
        assert_eq!(resp.headers()["content-length"], "256");
    }

    #[tokio::test]
    async fn test_empty_file() {
        let f = fixture();
        std_fs::write(f.config.root_dir.join("empty.txt"), b"").unwrap();
        let resp = get(&f.config, request("/empty.txt")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-length"], "0");
        assert!(body(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_stale_if_range_serves_full_file() {
        let f = fixture();
        let req = Request::builder()
            .uri("/app.wasm")
            .header("range", "bytes=0-9")
            .header("if-range", "\"stale\"")
            .body(())
            .unwrap();
        let resp = get(&f.config, req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body(resp).await.len(), 1000);
    }

    #[tokio::test]
    async fn test_conditional_requests() {
        let f = fixture();
        let first = get(&f.config, request("/index.html")).await.unwrap();
        let etag = first.headers()["etag"].to_str().unwrap().to_string();
        let last_modified = first.headers()["last-modified"].to_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/index.html")
            .header("if-none-match", etag.as_str())
            .body(())
            .unwrap();
        let resp = get(&f.config, req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert!(body(resp).await.is_empty());

        let req = Request::builder()
            .uri("/index.html")
            .header("if-modified-since", last_modified.as_str())
            .body(())
            .unwrap();
        let resp = get(&f.config, req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    }
}
