//! API descriptor (`sherpa.json`) and base URL handling.

use crate::config::{DocsConfig, ProtocolConfig};
use crate::error::{Result, SherpaError};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

/// Machine-readable description of an exposed API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub functions: Vec<String>,
    #[serde(rename = "baseurl", default)]
    pub base_url: String,
    #[serde(default)]
    pub version: String,
    #[serde(rename = "sherpaVersion", default)]
    pub sherpa_version: i64,
}

impl Descriptor {
    /// Describe an API built by this crate. `functions` should already be
    /// sorted.
    pub fn new(
        base_url: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        version: impl Into<String>,
        functions: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            functions,
            base_url: base_url.into(),
            version: version.into(),
            sherpa_version: ProtocolConfig::SHERPA_VERSION,
        }
    }

    /// Serialize once; the result is served unchanged for every request.
    pub fn to_bytes(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}

/// Validated base URL of an API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    raw: String,
    path: String,
    docs_url: Option<String>,
}

impl BaseUrl {
    /// Accepts an absolute `http`/`https` URL or an absolute path such as
    /// `/example/`. A trailing slash is added when missing so that function
    /// names can be appended.
    pub fn parse(input: &str) -> Result<Self> {
        let mut raw = input.trim().to_string();
        if raw.is_empty() {
            return Err(SherpaError::InvalidBaseUrl {
                url: input.to_string(),
                message: "base URL is empty".into(),
            });
        }
        if !raw.ends_with('/') {
            raw.push('/');
        }

        if raw.starts_with('/') {
            return Ok(Self {
                path: raw.clone(),
                raw,
                docs_url: None,
            });
        }

        let url = Url::parse(&raw).map_err(|e| SherpaError::InvalidBaseUrl {
            url: input.to_string(),
            message: e.to_string(),
        })?;
        let segment = match url.scheme() {
            "http" => DocsConfig::VIEWER_HTTP_SEGMENT,
            "https" => DocsConfig::VIEWER_HTTPS_SEGMENT,
            other => {
                return Err(SherpaError::UnsupportedScheme {
                    scheme: other.to_string(),
                })
            }
        };
        let host = url.host_str().ok_or_else(|| SherpaError::InvalidBaseUrl {
            url: input.to_string(),
            message: "missing host".into(),
        })?;
        let authority = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let docs_url = format!(
            "{}/{}/{}{}",
            DocsConfig::VIEWER_BASE,
            segment,
            authority,
            url.path()
        );
        Ok(Self {
            path: url.path().to_string(),
            raw,
            docs_url: Some(docs_url),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Path component, always ending in `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Link to the documentation viewer, absent for path-only base URLs.
    pub fn docs_url(&self) -> Option<&str> {
        self.docs_url.as_deref()
    }
}
