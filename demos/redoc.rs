//! ReDoc in front of a tiny JSON API.
//!
//! Run from a directory containing `swagger.json`:
//!   RUST_LOG=info cargo run --example redoc
//!
//! Try:
//!   open http://localhost:3000/docs
//!   curl http://localhost:3000/docs/swagger.json
//!   curl http://localhost:3000/pets/42

use redoc_middleware::middleware::{Docs, DocsConfig};
use redoc_middleware::{Request, Response, Server};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let docs = Docs::new(DocsConfig::new().title("Pet store"));

    Server::bind("0.0.0.0:3000")
        .serve(docs.wrap(app))
        .await
        .expect("server error");
}

// Everything the docs middleware does not claim lands here.
async fn app(req: Request) -> Response {
    match req.path().strip_prefix("/pets/") {
        Some(id) => Response::json(format!(r#"{{"id":"{id}","name":"rex"}}"#)),
        None => Response::builder()
            .status(http::StatusCode::NOT_FOUND)
            .text("not found"),
    }
}
