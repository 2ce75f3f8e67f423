//! Protocol constants and limits.

use std::time::Duration;

/// Fixed protocol names and versions.
pub struct ProtocolConfig;

impl ProtocolConfig {
    /// Version of the Sherpa protocol implemented by this crate.
    pub const SHERPA_VERSION: i64 = 0;
    pub const DESCRIPTOR_PATH: &'static str = "sherpa.json";
    pub const SCRIPT_PATH: &'static str = "sherpa.js";
    /// Reserved function returning the documentation tree.
    pub const DOCS_FUNCTION: &'static str = "_docs";
    /// Names that can never be registered as functions.
    pub const RESERVED_NAMES: [&'static str; 3] =
        [Self::DOCS_FUNCTION, Self::DESCRIPTOR_PATH, Self::SCRIPT_PATH];
    /// Replaced with the descriptor JSON in the client script template.
    pub const SCRIPT_PLACEHOLDER: &'static str = "SHERPA_JSON";
}

/// Documentation viewer settings.
pub struct DocsConfig;

impl DocsConfig {
    pub const VIEWER_BASE: &'static str = "https://sherpa.irias.nl";
    pub const VIEWER_HTTP_SEGMENT: &'static str = "X";
    pub const VIEWER_HTTPS_SEGMENT: &'static str = "x";
    /// Documentation format version; version 1 carries type information.
    pub const FORMAT_VERSION: i64 = 1;
}

/// Server limits.
pub struct ServerConfig;

impl ServerConfig {
    pub const DEFAULT_HOST: &'static str = "127.0.0.1";
    pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024; // 10MB
}

/// Client defaults, used by the command line client.
pub struct ClientConfig;

impl ClientConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
    pub const USER_AGENT: &'static str = concat!("sherpa-client/", env!("CARGO_PKG_VERSION"));
}
