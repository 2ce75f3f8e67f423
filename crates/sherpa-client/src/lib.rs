//! Sherpa Client - calls functions on a Sherpa API over HTTP.
//!
//! ```rust,ignore
//! use serde_json::json;
//!
//! let client = sherpa_client::Client::new("https://example.com/demo/", None).await?;
//! let sum: i64 = client.call("sum", &[json!(1), json!(2)]).await?;
//! ```
//!
//! Failures are [`sherpa_core::Error`]s. Errors raised by the server are
//! returned verbatim; transport problems use the `sherpaClientError`,
//! `sherpaBadFunction`, `sherpaHttpError` and `sherpaBadResponse` codes.

pub mod client;

pub use client::Client;
