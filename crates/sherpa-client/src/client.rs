//! HTTP client for Sherpa APIs.

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sherpa_core::dispatch::{check_response, encode_request, parse_response};
use sherpa_core::{Descriptor, Error, ProtocolConfig, SherpaError};
use tracing::debug;

/// Client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    functions: Vec<String>,
    descriptor: Option<Descriptor>,
}

impl Client {
    /// Create a client for the API at `base_url`.
    ///
    /// With `functions` set to `None` the API's `sherpa.json` is fetched and
    /// checked for a supported protocol version. Otherwise no request is
    /// made.
    pub async fn new(
        base_url: &str,
        functions: Option<Vec<String>>,
    ) -> sherpa_core::Result<Self> {
        Self::with_http_client(reqwest::Client::new(), base_url, functions).await
    }

    /// Like [`Client::new`] with a preconfigured HTTP client, e.g. one with a
    /// request timeout.
    pub async fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        functions: Option<Vec<String>>,
    ) -> sherpa_core::Result<Self> {
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        if let Some(functions) = functions {
            return Ok(Self {
                http,
                base_url,
                functions,
                descriptor: None,
            });
        }

        let descriptor = fetch_descriptor(&http, &base_url).await?;
        Ok(Self {
            http,
            base_url,
            functions: descriptor.functions.clone(),
            descriptor: Some(descriptor),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Known function names: the discovered list, or the one passed in.
    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    /// Descriptor fetched during discovery.
    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.descriptor.as_ref()
    }

    /// Call `function` and return the raw `result`.
    pub async fn call_value(&self, function: &str, params: &[Value]) -> Result<Value, Error> {
        let body = self.post(function, params).await?;
        parse_response(&body)
    }

    async fn post(&self, function: &str, params: &[Value]) -> Result<Bytes, Error> {
        let body = encode_request(params).map_err(|e| {
            Error::client_error(format!("could not encode request parameters: {}", e))
        })?;
        let url = format!("{}{}", self.base_url, function);
        debug!("Calling {}", url);

        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::client_error(format!("sending POST request: {}", e)))?;

        match response.status() {
            StatusCode::OK => response
                .bytes()
                .await
                .map_err(|e| Error::bad_response(format!("could not read response: {}", e))),
            StatusCode::NOT_FOUND => Err(Error::bad_function(format!(
                "no such function {}",
                function
            ))),
            status => Err(Error::http_error(format!(
                "HTTP error from server: {}",
                status
            ))),
        }
    }

    /// Call `function` and decode its result into `T`.
    pub async fn call<T: DeserializeOwned>(
        &self,
        function: &str,
        params: &[Value],
    ) -> Result<T, Error> {
        let value = self.call_value(function, params).await?;
        serde_json::from_value(value)
            .map_err(|e| Error::bad_response(format!("could not decode result: {}", e)))
    }

    /// Call `function`, ignoring its result. Only `error` in the response is
    /// looked at.
    pub async fn call_unit(&self, function: &str, params: &[Value]) -> Result<(), Error> {
        let body = self.post(function, params).await?;
        check_response(&body)
    }
}

async fn fetch_descriptor(
    http: &reqwest::Client,
    base_url: &str,
) -> sherpa_core::Result<Descriptor> {
    let url = format!("{}{}", base_url, ProtocolConfig::DESCRIPTOR_PATH);
    debug!("Fetching descriptor from {}", url);

    let response = http
        .get(&url)
        .send()
        .await
        .map_err(|e| SherpaError::Network {
            message: e.to_string(),
        })?;
    match response.status() {
        StatusCode::OK => {}
        StatusCode::NOT_FOUND => {
            return Err(SherpaError::NoApi {
                url: base_url.to_string(),
            })
        }
        status => {
            return Err(SherpaError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            })
        }
    }

    let bytes = response.bytes().await.map_err(|e| SherpaError::Network {
        message: e.to_string(),
    })?;
    let descriptor: Descriptor = serde_json::from_slice(&bytes)?;
    if descriptor.sherpa_version != ProtocolConfig::SHERPA_VERSION {
        return Err(SherpaError::UnsupportedVersion {
            found: descriptor.sherpa_version,
            expected: ProtocolConfig::SHERPA_VERSION,
        });
    }
    Ok(descriptor)
}
