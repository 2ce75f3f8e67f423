//! Sherpa Core - function registry and call dispatch for the Sherpa RPC protocol.
//!
//! Sherpa exposes a set of named functions over HTTP. A call is a POST of
//! `{"params": [...]}` to `<baseurl><function>`, answered with
//! `{"result": ...}` or `{"error": {"code": ..., "message": ...}}`. Every API
//! also serves a descriptor (`sherpa.json`), a browser client
//! (`sherpa.js`) and documentation through the reserved `_docs` function.
//!
//! This crate is transport agnostic. See `sherpa-server` for the HTTP router
//! and `sherpa-client` for the client.
//!
//! # Example
//!
//! ```rust,ignore
//! use sherpa_core::ApiBuilder;
//!
//! async fn sum(a: i64, b: i64) -> i64 {
//!     a + b
//! }
//!
//! let api = ApiBuilder::new("https://example.com/demo/", "demo", "Demo API", "1.0.0")
//!     .function("sum", sum)
//!     .build()?;
//!
//! let result = api.call("sum", br#"{"params":[1,2]}"#).await;
//! ```

pub mod config;
pub mod descriptor;
pub mod dispatch;
pub mod docs;
pub mod error;
pub mod handler;
pub mod intstr;
pub mod registry;
pub mod script;

mod api;

// Re-export commonly used types
pub use api::{Api, ApiBuilder};
pub use config::ProtocolConfig;
pub use descriptor::{BaseUrl, Descriptor};
pub use dispatch::CallResult;
pub use docs::{FieldDoc, FunctionDoc, Param, Section, TypeDoc, TypeExpr};
pub use error::{Error, ErrorCode, FunctionError, Result, SherpaError};
pub use handler::Handler;
pub use intstr::{Int64s, Uint64s};
pub use registry::{Function, Registry, Returned, Signature};
