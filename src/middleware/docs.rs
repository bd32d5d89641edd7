//! ReDoc documentation middleware.
//!
//! Serves two routes in front of any handler:
//!
//! | Path | Response |
//! |---|---|
//! | `{mount}` | the rendered ReDoc page, `text/html; charset=utf-8` |
//! | `{mount}/swagger.json` | the file at [`DocsConfig::spec_path`] |
//!
//! where `mount` is `base_path` joined with `path`. Every other request goes
//! to the wrapped handler untouched.
//!
//! ```rust,no_run
//! use redoc_middleware::middleware::{Docs, DocsConfig};
//! use redoc_middleware::{Request, Response, Server};
//!
//! async fn app(_req: Request) -> Response {
//!     Response::text("hello")
//! }
//!
//! # async fn run() -> Result<(), redoc_middleware::Error> {
//! let docs = Docs::new(DocsConfig::new().base_path("/api").spec_path("openapi.json"));
//! Server::bind("0.0.0.0:3000").serve(docs.wrap(app)).await
//! # }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use tera::{Context, Tera};
use tracing::info;

use crate::fs::serve_file;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::request::Request;
use crate::response::{ContentType, Response};

/// Where the ReDoc bundle is loaded from unless configured otherwise.
pub const DEFAULT_SCRIPT_URL: &str =
    "https://rebilly.github.io/ReDoc/releases/latest/redoc.min.js";

const DEFAULT_BASE_PATH: &str = "/";
const DEFAULT_PATH: &str = "docs";
const DEFAULT_SPEC_PATH: &str = "./swagger.json";
const DEFAULT_TITLE: &str = "API documentation";

/// Appended to the mount path to form the spec file route.
const SPEC_ROUTE_SUFFIX: &str = "/swagger.json";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>{{ title }}</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
      body {
        margin: 0;
        padding: 0;
      }
    </style>
  </head>
  <body>
    <redoc spec-url='{{ path }}/swagger.json'></redoc>
    <script src="{{ script_url }}"> </script>
  </body>
</html>
"#;

// ── DocsConfig ────────────────────────────────────────────────────────────────

/// Configuration for [`Docs`].
///
/// Empty fields mean "use the default"; see [`DocsConfig::with_defaults`].
/// Deserializes with every field optional, so it can be embedded in a host
/// application's own config file:
///
/// ```rust
/// # use redoc_middleware::middleware::DocsConfig;
/// let config = DocsConfig::new()
///     .base_path("/api")
///     .title("Pet store")
///     .spec_path("./openapi.json");
/// assert_eq!(config.with_defaults().path, "docs");
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DocsConfig {
    /// Root segment the docs route hangs off. Default `/`.
    pub base_path: String,
    /// Segment joined onto `base_path`. Default `docs`.
    pub path: String,
    /// OpenAPI document on disk. Default `./swagger.json`.
    pub spec_path: PathBuf,
    /// ReDoc bundle URL. Default [`DEFAULT_SCRIPT_URL`].
    #[serde(alias = "redoc_url")]
    pub script_url: String,
    /// Page title. Default `API documentation`.
    pub title: String,
}

impl DocsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn spec_path(mut self, spec_path: impl Into<PathBuf>) -> Self {
        self.spec_path = spec_path.into();
        self
    }

    pub fn script_url(mut self, script_url: impl Into<String>) -> Self {
        self.script_url = script_url.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Returns a copy with every empty field replaced by its default.
    /// Set fields are kept as-is, so applying this twice changes nothing.
    pub fn with_defaults(self) -> Self {
        let spec_path = if self.spec_path.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_SPEC_PATH)
        } else {
            self.spec_path
        };
        Self {
            base_path: or_default(self.base_path, DEFAULT_BASE_PATH),
            path: or_default(self.path, DEFAULT_PATH),
            spec_path,
            script_url: or_default(self.script_url, DEFAULT_SCRIPT_URL),
            title: or_default(self.title, DEFAULT_TITLE),
        }
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() { default.to_owned() } else { value }
}

// ── Docs ──────────────────────────────────────────────────────────────────────

/// The documentation middleware.
///
/// Everything is computed once in [`Docs::new`]: defaults, the mount path,
/// the spec route and the rendered page. Cloning is one `Arc` increment and
/// request handling never mutates shared state.
///
/// The page's `spec-url` is `{path}/swagger.json` built from the raw `path`
/// field, not from the mount path. Browsers resolve it against the page URL,
/// so it lands on the spec route only while `path` is a single segment.
/// With `path = "v1/docs"` the page at `/v1/docs` asks for
/// `/v1/v1/docs/swagger.json`.
#[derive(Clone)]
pub struct Docs {
    inner: Arc<Mounted>,
}

struct Mounted {
    config: DocsConfig,
    mount_path: String,
    spec_route: String,
    page: Bytes,
}

impl Docs {
    /// Finalizes `config` and renders the page.
    ///
    /// # Panics
    ///
    /// Panics if the built-in page template fails to render. The template
    /// is fixed, so this indicates a bug rather than bad input.
    pub fn new(config: DocsConfig) -> Self {
        let config = config.with_defaults();
        let mount_path = join_paths(&config.base_path, &config.path);
        let spec_route = format!("{mount_path}{SPEC_ROUTE_SUFFIX}");
        let page = render_page(&config);

        info!(
            mount = %mount_path,
            spec = %config.spec_path.display(),
            "serving API documentation"
        );

        Self { inner: Arc::new(Mounted { config, mount_path, spec_route, page }) }
    }

    /// The configuration with defaults applied.
    pub fn config(&self) -> &DocsConfig { &self.inner.config }

    /// Path the documentation page is served at, e.g. `/docs`.
    pub fn mount_path(&self) -> &str { &self.inner.mount_path }

    /// Path the spec file is served at, e.g. `/docs/swagger.json`.
    pub fn spec_route(&self) -> &str { &self.inner.spec_route }

    /// The rendered HTML page.
    pub fn page(&self) -> &[u8] { &self.inner.page }

    /// Wraps `downstream`, answering the two docs routes and forwarding
    /// everything else unchanged.
    pub fn wrap<H: Handler>(&self, downstream: H) -> impl Handler + use<H> {
        let next = downstream.into_boxed_handler();
        let docs = self.clone();
        move |req: Request| -> BoxFuture {
            let docs = docs.clone();
            let next = Arc::clone(&next);
            Box::pin(async move { docs.handle(req, &next).await })
        }
    }

    /// Routes are compared against the percent-decoded path. A path that
    /// does not decode to UTF-8 always goes downstream.
    async fn handle(&self, req: Request, next: &BoxedHandler) -> Response {
        let (is_page, is_spec) = match percent_decode_str(req.path()).decode_utf8() {
            Ok(path) => (path == self.inner.mount_path, path == self.inner.spec_route),
            Err(_) => (false, false),
        };
        if is_page {
            return Response::builder().bytes(ContentType::Html, self.inner.page.clone());
        }
        if is_spec {
            return serve_file(&req, &self.inner.config.spec_path).await;
        }
        next.call(req).await
    }
}

fn render_page(config: &DocsConfig) -> Bytes {
    let mut ctx = Context::new();
    ctx.insert("title", &config.title);
    ctx.insert("path", &config.path);
    ctx.insert("script_url", &config.script_url);
    let html = Tera::one_off(PAGE_TEMPLATE, &ctx, true)
        .unwrap_or_else(|e| panic!("docs page template failed to render: {e}"));
    Bytes::from(html)
}

/// Joins two URL path segments and cleans the result lexically: repeated
/// slashes collapse, `.` is dropped, `..` removes its parent and a trailing
/// slash is stripped. A rooted result stays rooted.
fn join_paths(base: &str, path: &str) -> String {
    let joined = match (base.is_empty(), path.is_empty()) {
        (true, true) => return String::new(),
        (true, false) => path.to_owned(),
        (false, true) => base.to_owned(),
        (false, false) => format!("{base}/{path}"),
    };
    clean_path(&joined)
}

fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                // `..` at the root is the root
                _ if rooted => {}
                _ => segments.push(".."),
            },
            s => segments.push(s),
        }
    }
    let cleaned = segments.join("/");
    match (rooted, cleaned.is_empty()) {
        (true, _) => format!("/{cleaned}"),
        (false, true) => ".".to_owned(),
        (false, false) => cleaned,
    }
}
