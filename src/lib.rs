//! # redoc-middleware
//!
//! Serve a [ReDoc](https://github.com/Redocly/redoc) page for your OpenAPI
//! document from any handler, with two routes and no router.
//!
//! ## The contract
//!
//! [`Docs`](middleware::Docs) wraps the handler you already have:
//!
//! - `{base_path}/{path}`: the documentation page, rendered once at startup
//! - `{base_path}/{path}/swagger.json`: the spec file, read from disk per request
//! - anything else: your handler, untouched
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use redoc_middleware::middleware::{Docs, DocsConfig};
//! use redoc_middleware::{Request, Response, Server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let docs = Docs::new(
//!         DocsConfig::new()
//!             .title("Pet store")
//!             .spec_path("./openapi.json"),
//!     );
//!
//!     Server::bind("0.0.0.0:3000").serve(docs.wrap(app)).await.unwrap();
//! }
//!
//! async fn app(req: Request) -> Response {
//!     Response::text(format!("no docs at {}", req.path()))
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod server;

pub mod fs;
pub mod middleware;

pub use error::Error;
pub use handler::Handler;
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use server::Server;
