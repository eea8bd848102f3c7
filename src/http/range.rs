//! HTTP Range request parsing module
//!
//! Single `bytes=` ranges only (RFC 7233). Browsers fetching large `.wasm`
//! binaries issue these for streaming compilation and resumed downloads.

/// Inclusive byte range already clamped to the file size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    #[inline]
    pub const fn byte_count(self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value
    pub fn content_range(self, total_size: u64) -> String {
        format!("bytes {}-{}/{total_size}", self.start, self.end)
    }
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Satisfiable single range
    Valid(ByteRange),
    /// Well-formed but outside the file - should return 416
    NotSatisfiable,
    /// No Range header, other unit, multi-range or malformed (serve full content)
    None,
}

/// Parse HTTP Range header against a file of `file_size` bytes
///
/// Supported formats:
/// - `bytes=start-end` - Specific range, `end` clamped to the last byte
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::None;
    };

    // Multi-range responses are not produced; fall back to the full body
    if spec.contains(',') {
        return RangeParseResult::None;
    }

    let Some((first, last)) = spec.split_once('-') else {
        return RangeParseResult::None;
    };
    let (first, last) = (first.trim(), last.trim());

    let bound = |s: &str| -> Option<Option<u64>> {
        if s.is_empty() {
            Some(None)
        } else {
            s.parse::<u64>().ok().map(Some)
        }
    };
    let (Some(first), Some(last)) = (bound(first), bound(last)) else {
        return RangeParseResult::None;
    };

    match (first, last) {
        (None, None) => RangeParseResult::None,
        (None, Some(suffix)) => suffix_range(suffix, file_size),
        (Some(start), end) => bounded_range(start, end, file_size),
    }
}

/// Resolve `-suffix`; a suffix longer than the file selects the whole file
fn suffix_range(suffix: u64, file_size: u64) -> RangeParseResult {
    if suffix == 0 || file_size == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(ByteRange {
        start: file_size.saturating_sub(suffix),
        end: file_size - 1,
    })
}

/// Resolve `start-` or `start-end`
fn bounded_range(start: u64, end: Option<u64>, file_size: u64) -> RangeParseResult {
    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let last_byte = file_size - 1;
    let end = end.map_or(last_byte, |e| e.min(last_byte));

    if start > end {
        // `end < start` is a syntactically invalid range, which RFC 7233 says to ignore
        return RangeParseResult::None;
    }

    RangeParseResult::Valid(ByteRange { start, end })
}
