//! Static file serving.
//!
//! [`serve_file`] answers a request with the contents of one file on disk:
//! content type from the extension, `Last-Modified` / `If-Modified-Since`,
//! and single byte ranges. Failures become status responses, never errors.

use std::io;
use std::path::Path;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use mime_guess::mime;
use http::header::{self, HeaderValue};
use http::{Method, StatusCode};
use tracing::debug;

use crate::request::Request;
use crate::response::{ContentType, Response};

/// IMF-fixdate, the only format HTTP/1.1 servers generate.
const HTTP_DATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Serves the file at `path` for `req`.
///
/// The file is read into memory in one go and sent as a single body rather
/// than streamed in chunks; OpenAPI documents are small enough for that.
///
/// | Outcome | Status |
/// |---|---|
/// | file read | `200`, or `206` for a satisfiable `Range` |
/// | unchanged since `If-Modified-Since` | `304` |
/// | range past the end | `416` |
/// | missing file or a directory | `404` |
/// | permission denied | `403` |
/// | any other I/O failure | `500` |
pub async fn serve_file(req: &Request, path: &Path) -> Response {
    match load(path).await {
        Ok((content, modified)) => respond(req, path, content, modified),
        Err(e) => {
            debug!(path = %path.display(), "cannot serve file: {e}");
            error_response(&e)
        }
    }
}

async fn load(path: &Path) -> io::Result<(Bytes, Option<DateTime<Utc>>)> {
    let meta = tokio::fs::metadata(path).await?;
    if meta.is_dir() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "path is a directory"));
    }
    let modified = meta.modified().ok().map(DateTime::<Utc>::from);
    let content = tokio::fs::read(path).await?;
    Ok((Bytes::from(content), modified))
}

fn respond(
    req: &Request,
    path: &Path,
    content: Bytes,
    modified: Option<DateTime<Utc>>,
) -> Response {
    let last_modified = modified.map(|t| t.format(HTTP_DATE).to_string());

    if modified.is_some_and(|t| not_modified(req, t)) {
        let mut builder = Response::builder().status(StatusCode::NOT_MODIFIED);
        if let Some(value) = last_modified {
            builder = builder.header(header::LAST_MODIFIED, value);
        }
        return builder.no_body();
    }

    let content_type = content_type(path, &content);
    let mut builder = Response::builder()
        .header(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    if let Some(value) = last_modified {
        builder = builder.header(header::LAST_MODIFIED, value);
    }

    let len = content.len();
    match ByteRange::parse(req.header("range"), len) {
        ByteRange::Full => builder
            .header(header::CONTENT_TYPE, content_type)
            .body(content),
        ByteRange::Partial { start, end } => builder
            .status(StatusCode::PARTIAL_CONTENT)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_RANGE, format!("bytes {start}-{end}/{len}"))
            .body(content.slice(start..=end)),
        ByteRange::Unsatisfiable => builder
            .status(StatusCode::RANGE_NOT_SATISFIABLE)
            .header(header::CONTENT_RANGE, format!("bytes */{len}"))
            .text("invalid range: failed to overlap"),
    }
}

/// `If-Modified-Since` only applies to GET and HEAD, at one-second precision.
fn not_modified(req: &Request, modified: DateTime<Utc>) -> bool {
    if req.method() != Method::GET && req.method() != Method::HEAD {
        return false;
    }
    if req.headers().contains_key(header::IF_NONE_MATCH) {
        return false;
    }
    let Some(since) = req.header("if-modified-since").and_then(parse_http_date) else {
        return false;
    };
    modified.timestamp() <= since.timestamp()
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Guessed from the extension. Text types get an explicit UTF-8 charset;
/// without a known extension, valid UTF-8 is served as plain text.
fn content_type(path: &Path, content: &[u8]) -> String {
    match mime_guess::from_path(path).first() {
        Some(guess) if guess.type_() == mime::TEXT => format!("{guess}; charset=utf-8"),
        Some(guess) => guess.to_string(),
        None if std::str::from_utf8(content).is_ok() => ContentType::Text.as_str().to_owned(),
        None => mime::APPLICATION_OCTET_STREAM.to_string(),
    }
}

fn error_response(err: &io::Error) -> Response {
    let (status, body) = match err.kind() {
        io::ErrorKind::NotFound => (StatusCode::NOT_FOUND, "404 page not found"),
        io::ErrorKind::PermissionDenied => (StatusCode::FORBIDDEN, "403 Forbidden"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error"),
    };
    Response::builder().status(status).text(body)
}

// ── Range ─────────────────────────────────────────────────────────────────────

/// Outcome of reading a `Range` header against a body of known length.
#[derive(Debug, PartialEq, Eq)]
enum ByteRange {
    /// No header, another unit, several ranges or garbage: serve everything.
    Full,
    /// Inclusive byte offsets.
    Partial { start: usize, end: usize },
    Unsatisfiable,
}

impl ByteRange {
    fn parse(header: Option<&str>, len: usize) -> Self {
        let Some(spec) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
            return Self::Full;
        };
        if spec.contains(',') {
            return Self::Full;
        }
        let Some((first, last)) = spec.split_once('-') else {
            return Self::Full;
        };
        let (first, last) = (first.trim(), last.trim());

        // bytes=-N: the final N bytes
        if first.is_empty() {
            return match last.parse::<usize>() {
                Ok(0) => Self::Unsatisfiable,
                Ok(_) if len == 0 => Self::Unsatisfiable,
                Ok(n) => Self::Partial { start: len.saturating_sub(n), end: len - 1 },
                Err(_) => Self::Full,
            };
        }

        let Ok(start) = first.parse::<usize>() else {
            return Self::Full;
        };
        if start >= len {
            return Self::Unsatisfiable;
        }
        let end = if last.is_empty() {
            len - 1
        } else {
            match last.parse::<usize>() {
                Ok(e) if e < start => return Self::Unsatisfiable,
                Ok(e) => e.min(len - 1),
                Err(_) => return Self::Full,
            }
        };
        Self::Partial { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(headers: &[(&str, &str)]) -> Request {
        let mut builder = http::Request::builder().uri("/docs/swagger.json");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(Bytes::new()).unwrap().into()
    }

    fn fixture(name: &str, content: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn serves_whole_file_with_metadata() {
        let (_dir, path) = fixture("swagger.json", br#"{"openapi":"3.0.0"}"#);
        let res = serve_file(&get(&[]), &path).await;

        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), br#"{"openapi":"3.0.0"}"#);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.header("accept-ranges"), Some("bytes"));
        let last_modified = res.header("last-modified").unwrap();
        assert!(last_modified.ends_with(" GMT"));
        assert!(parse_http_date(last_modified).is_some());
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let res = serve_file(&get(&[]), &dir.path().join("nope.json")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), b"404 page not found");
    }

    #[tokio::test]
    async fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let res = serve_file(&get(&[]), dir.path()).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn if_modified_since_in_the_future_is_not_modified() {
        let (_dir, path) = fixture("swagger.json", b"{}");

        let res = serve_file(
            &get(&[("if-modified-since", "Fri, 01 Jan 2100 00:00:00 GMT")]),
            &path,
        )
        .await;
        assert_eq!(res.status_code(), StatusCode::NOT_MODIFIED);
        assert!(res.body().is_empty());

        let res = serve_file(
            &get(&[("if-modified-since", "Mon, 01 Jan 2001 00:00:00 GMT")]),
            &path,
        )
        .await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body(), b"{}");
    }

    #[tokio::test]
    async fn if_modified_since_ignored_for_post() {
        let (_dir, path) = fixture("swagger.json", b"{}");
        let req: Request = http::Request::builder()
            .method(Method::POST)
            .uri("/docs/swagger.json")
            .header("if-modified-since", "Fri, 01 Jan 2100 00:00:00 GMT")
            .body(Bytes::new())
            .unwrap()
            .into();
        let res = serve_file(&req, &path).await;
        assert_eq!(res.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn range_requests() {
        let (_dir, path) = fixture("spec.yaml", b"hello world");

        let res = serve_file(&get(&[("range", "bytes=0-4")]), &path).await;
        assert_eq!(res.status_code(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(res.body(), b"hello");
        assert_eq!(res.header("content-range"), Some("bytes 0-4/11"));
        assert_eq!(res.headers().get_all(header::CONTENT_TYPE).iter().count(), 1);

        let res = serve_file(&get(&[("range", "bytes=-5")]), &path).await;
        assert_eq!(res.body(), b"world");

        let res = serve_file(&get(&[("range", "bytes=20-")]), &path).await;
        assert_eq!(res.status_code(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(res.header("content-range"), Some("bytes */11"));
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
    }

    #[tokio::test]
    async fn unknown_extension_is_sniffed() {
        let (_dir, text) = fixture("spec", b"openapi: 3.0.0");
        let res = serve_file(&get(&[]), &text).await;
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));

        let (_dir, binary) = fixture("spec.bin", &[0xff, 0xfe, 0x00]);
        let res = serve_file(&get(&[]), &binary).await;
        assert_eq!(res.header("content-type"), Some("application/octet-stream"));
    }

    #[tokio::test]
    async fn text_types_carry_charset() {
        let (_dir, path) = fixture("notes.txt", b"hello");
        let res = serve_file(&get(&[]), &path).await;
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn io_errors_map_to_statuses() {
        let cases = [
            (io::ErrorKind::NotFound, StatusCode::NOT_FOUND, "404 page not found"),
            (io::ErrorKind::PermissionDenied, StatusCode::FORBIDDEN, "403 Forbidden"),
            (io::ErrorKind::Other, StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error"),
        ];
        for (kind, status, body) in cases {
            let res = error_response(&io::Error::new(kind, "boom"));
            assert_eq!(res.status_code(), status);
            assert_eq!(res.body(), body.as_bytes());
            assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
        }
    }

    #[test]
    fn range_parsing() {
        assert_eq!(ByteRange::parse(None, 100), ByteRange::Full);
        assert_eq!(
            ByteRange::parse(Some("bytes=10-"), 100),
            ByteRange::Partial { start: 10, end: 99 }
        );
        assert_eq!(
            ByteRange::parse(Some("bytes=90-500"), 100),
            ByteRange::Partial { start: 90, end: 99 }
        );
        assert_eq!(
            ByteRange::parse(Some("bytes=-500"), 100),
            ByteRange::Partial { start: 0, end: 99 }
        );
        assert_eq!(ByteRange::parse(Some("bytes=-0"), 100), ByteRange::Unsatisfiable);
        assert_eq!(ByteRange::parse(Some("bytes=0-"), 0), ByteRange::Unsatisfiable);
        assert_eq!(ByteRange::parse(Some("bytes=9-3"), 100), ByteRange::Unsatisfiable);
        assert_eq!(ByteRange::parse(Some("bytes=0-1,5-6"), 100), ByteRange::Full);
        assert_eq!(ByteRange::parse(Some("items=0-1"), 100), ByteRange::Full);
        assert_eq!(ByteRange::parse(Some("bytes=a-b"), 100), ByteRange::Full);
    }
}
