//! Middleware layer.
//!
//! A middleware takes a downstream [`Handler`](crate::Handler) and returns a
//! new one that answers some requests itself and forwards the rest.
//!
//! - [`Docs`] serves a ReDoc documentation page and the OpenAPI document it
//!   renders, under a configurable mount path.

mod docs;

pub use docs::{DEFAULT_SCRIPT_URL, Docs, DocsConfig};
