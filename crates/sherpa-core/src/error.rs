//! Error types for Sherpa.
//!
//! [`Error`] is the wire error carried in the `error` member of a response
//! envelope. [`SherpaError`] covers failures while building an API or
//! bootstrapping a client, which never reach the wire. [`FunctionError`] is
//! what a fallible exposed function hands back to the dispatcher.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message used when an error is constructed without one.
const UNSPECIFIED_MESSAGE: &str = "unspecified error";

/// The fixed protocol error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Request body is not valid JSON, or `params` is missing or not an array.
    BadRequest,
    /// Wrong number of parameters, or a parameter could not be coerced.
    BadParams,
    /// The named function is not part of the API.
    BadFunction,
    /// The client could not parse the server's response.
    BadResponse,
    /// The server answered with an unexpected HTTP status.
    HttpError,
    /// The client failed before or while sending the request.
    ClientError,
}

impl ErrorCode {
    /// All codes, in declaration order.
    pub const ALL: [ErrorCode; 6] = [
        ErrorCode::BadRequest,
        ErrorCode::BadParams,
        ErrorCode::BadFunction,
        ErrorCode::BadResponse,
        ErrorCode::HttpError,
        ErrorCode::ClientError,
    ];

    /// Wire representation of the code.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "sherpaBadRequest",
            ErrorCode::BadParams => "sherpaBadParams",
            ErrorCode::BadFunction => "sherpaBadFunction",
            ErrorCode::BadResponse => "sherpaBadResponse",
            ErrorCode::HttpError => "sherpaHttpError",
            ErrorCode::ClientError => "sherpaClientError",
        }
    }

    /// Look up a code by its wire representation.
    pub fn from_wire(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error as it travels in a response envelope.
///
/// `code` is one of the [`ErrorCode`] strings, an application-defined code,
/// or empty when an exposed function failed with a plain error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl Error {
    /// Create an error with an arbitrary code. An empty message is replaced
    /// so that every error put on the wire says something.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = UNSPECIFIED_MESSAGE.to_string();
        }
        Self {
            code: code.into(),
            message,
        }
    }

    /// Create an error carrying one of the protocol codes.
    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(code.as_str(), message)
    }

    /// Create an error without a code.
    pub fn plain(message: impl Into<String>) -> Self {
        Self::new(String::new(), message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::BadRequest, message)
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::BadParams, message)
    }

    pub fn bad_function(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::BadFunction, message)
    }

    pub fn bad_response(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::BadResponse, message)
    }

    pub fn http_error(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::HttpError, message)
    }

    pub fn client_error(message: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::ClientError, message)
    }

    /// The protocol code, if `code` is one of the fixed codes.
    pub fn kind(&self) -> Option<ErrorCode> {
        ErrorCode::from_wire(&self.code)
    }

    /// Whether this error carries the given protocol code.
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code.as_str()
    }

    /// Replace an empty message, for errors built from the public fields or
    /// decoded from a peer.
    pub(crate) fn with_message(mut self) -> Self {
        if self.message.is_empty() {
            self.message = UNSPECIFIED_MESSAGE.to_string();
        }
        self
    }
}

/// Failure reported by an exposed function.
#[derive(Debug)]
pub enum FunctionError {
    /// A structured error, passed to the caller unchanged.
    Structured(Error),
    /// Any other failure; becomes an error with an empty code.
    Plain(String),
}

impl FunctionError {
    /// Convert into the error that goes on the wire.
    pub fn into_wire(self) -> Error {
        match self {
            FunctionError::Structured(err) => err.with_message(),
            FunctionError::Plain(message) => Error::plain(message),
        }
    }
}

impl fmt::Display for FunctionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionError::Structured(err) if err.code.is_empty() => f.write_str(&err.message),
            FunctionError::Structured(err) => write!(f, "{}: {}", err.code, err.message),
            FunctionError::Plain(message) => f.write_str(message),
        }
    }
}

impl From<Error> for FunctionError {
    fn from(err: Error) -> Self {
        FunctionError::Structured(err)
    }
}

impl From<String> for FunctionError {
    fn from(message: String) -> Self {
        FunctionError::Plain(message)
    }
}

impl From<&str> for FunctionError {
    fn from(message: &str) -> Self {
        FunctionError::Plain(message.to_string())
    }
}

impl From<anyhow::Error> for FunctionError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<Error>() {
            Ok(structured) => FunctionError::Structured(structured),
            Err(other) => FunctionError::Plain(format!("{:#}", other)),
        }
    }
}

impl From<std::io::Error> for FunctionError {
    fn from(err: std::io::Error) -> Self {
        FunctionError::Plain(err.to_string())
    }
}

/// Errors raised while building an API or bootstrapping a client.
#[derive(Debug, thiserror::Error)]
pub enum SherpaError {
    // Registration errors
    #[error("Invalid function name {name:?}: {reason}")]
    InvalidFunctionName { name: String, reason: &'static str },

    #[error("Duplicate function: {0}")]
    DuplicateFunction(String),

    #[error("Function name is reserved: {0}")]
    ReservedName(String),

    #[error("Invalid signature for {name}: {message}")]
    InvalidSignature { name: String, message: String },

    #[error("Invalid documentation: {message}")]
    InvalidDocs { message: String },

    // Base URL errors
    #[error("Invalid base URL {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("Unsupported URL scheme {scheme:?}, expected http or https")]
    UnsupportedScheme { scheme: String },

    // Client bootstrap errors
    #[error("Unsupported sherpa version {found}, expected {expected}")]
    UnsupportedVersion { found: i64, expected: i64 },

    #[error("No API at {url}")]
    NoApi { url: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Network error: {message}")]
    Network { message: String },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },
}

/// Result type alias for Sherpa construction operations.
pub type Result<T> = std::result::Result<T, SherpaError>;

impl From<serde_json::Error> for SherpaError {
    fn from(err: serde_json::Error) -> Self {
        SherpaError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
