//! Incoming HTTP request type.

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};

/// An incoming HTTP request with its body already collected.
///
/// Built by the server from a hyper request, or directly from an
/// `http::Request<Bytes>` when driving a handler without a socket.
pub struct Request {
    inner: http::Request<Bytes>,
}

impl Request {
    pub fn method(&self) -> &Method { self.inner.method() }
    pub fn uri(&self) -> &Uri { self.inner.uri() }
    pub fn headers(&self) -> &HeaderMap { self.inner.headers() }
    pub fn body(&self) -> &[u8] { self.inner.body() }

    /// The path component of the request target. Never includes the query.
    pub fn path(&self) -> &str { self.inner.uri().path() }

    /// Header lookup. Names are case-insensitive; non-UTF-8 values are skipped.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name)?.to_str().ok()
    }

    pub fn into_inner(self) -> http::Request<Bytes> {
        self.inner
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(inner: http::Request<Bytes>) -> Self {
        Self { inner }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_excludes_query() {
        let req = Request::from(
            http::Request::builder()
                .uri("/docs?theme=dark")
                .header("If-Modified-Since", "Mon, 01 Jan 2024 00:00:00 GMT")
                .body(Bytes::new())
                .unwrap(),
        );
        assert_eq!(req.path(), "/docs");
        assert_eq!(req.method(), Method::GET);
        assert_eq!(
            req.header("if-modified-since"),
            Some("Mon, 01 Jan 2024 00:00:00 GMT")
        );
        assert!(req.header("range").is_none());
    }

    #[test]
    fn into_inner_returns_the_original_request() {
        let req = Request::from(
            http::Request::builder()
                .method(Method::POST)
                .uri("/pets?limit=1")
                .body(Bytes::from_static(b"{}"))
                .unwrap(),
        );
        let inner = req.into_inner();
        assert_eq!(inner.method(), Method::POST);
        assert_eq!(inner.uri().query(), Some("limit=1"));
        assert_eq!(inner.body().as_ref(), b"{}");
    }
}
