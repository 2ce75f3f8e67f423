//! Browser client script served as `sherpa.js`.

use crate::config::ProtocolConfig;
use bytes::Bytes;

const TEMPLATE: &str = include_str!("script.js");

/// Substitute the descriptor JSON into the script template.
pub fn render(descriptor_json: &[u8]) -> Bytes {
    let descriptor = String::from_utf8_lossy(descriptor_json);
    Bytes::from(TEMPLATE.replacen(ProtocolConfig::SCRIPT_PLACEHOLDER, &descriptor, 1))
}
