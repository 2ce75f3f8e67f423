//! Sherpa Server - serves a [`sherpa_core::Api`] over HTTP with Axum.
//!
//! ```rust,ignore
//! let api = sherpa_core::ApiBuilder::new("/", "demo", "Demo", "1.0.0")
//!     .function("sum", |a: i64, b: i64| async move { a + b })
//!     .build()?;
//! let addr = sherpa_server::start_server(api, &ServerOptions::default()).await?;
//! ```

pub mod example;
pub mod router;
pub mod server;

pub use router::{router, router_with_limit};
pub use server::{app, start_server, ServerOptions};
