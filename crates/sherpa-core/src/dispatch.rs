//! Call dispatch: request parsing, arity checks and output normalization.

use crate::error::Error;
use crate::registry::{CallFuture, Function, Returned};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Outcome of one call. Serializes as the response envelope, with exactly
/// one of `result` or `error`.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    Success(Value),
    Failure(Error),
}

impl CallResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Success(_))
    }

    pub fn into_result(self) -> Result<Value, Error> {
        match self {
            CallResult::Success(value) => Ok(value),
            CallResult::Failure(err) => Err(err),
        }
    }
}

impl From<Result<Value, Error>> for CallResult {
    fn from(result: Result<Value, Error>) -> Self {
        match result {
            Ok(value) => CallResult::Success(value),
            Err(err) => CallResult::Failure(err),
        }
    }
}

impl Serialize for CallResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            CallResult::Success(value) => map.serialize_entry("result", value)?,
            CallResult::Failure(err) => map.serialize_entry("error", err)?,
        }
        map.end()
    }
}

/// Parse a response envelope as a client sees it. A server-side `error` is
/// returned as is; anything that is not a valid envelope becomes
/// `sherpaBadResponse`.
pub fn parse_response(body: &[u8]) -> Result<Value, Error> {
    parse_envelope(body)?
        .ok_or_else(|| Error::bad_response("response has neither result nor error"))
}

/// Like [`parse_response`] for callers that do not want the result: only
/// `error` is looked at, so a body without `result` is still a success.
pub fn check_response(body: &[u8]) -> Result<(), Error> {
    parse_envelope(body).map(|_| ())
}

fn parse_envelope(body: &[u8]) -> Result<Option<Value>, Error> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::bad_response(format!("could not parse JSON response: {}", e)))?;
    let Value::Object(mut object) = value else {
        return Err(Error::bad_response("response is not a JSON object"));
    };
    match object.remove("error") {
        Some(Value::Null) | None => {}
        Some(err) => {
            let err: Error = serde_json::from_value(err).map_err(|e| {
                Error::bad_response(format!("could not parse error in response: {}", e))
            })?;
            return Err(err.with_message());
        }
    }
    Ok(object.remove("result"))
}

#[derive(Serialize)]
struct RequestBody<'a> {
    params: &'a [Value],
}

/// Encode a request body.
pub fn encode_request(params: &[Value]) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&RequestBody { params })
}

/// Parse a request body into its parameter list.
pub fn parse_request(body: &[u8]) -> Result<Vec<Value>, Error> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::bad_request(format!("invalid JSON request body: {}", e)))?;
    let Value::Object(mut object) = value else {
        return Err(Error::bad_request("request body must be a JSON object"));
    };
    match object.remove("params") {
        Some(Value::Array(params)) => Ok(params),
        Some(Value::Null) | None => Err(Error::bad_request("missing params")),
        Some(_) => Err(Error::bad_request("params must be an array")),
    }
}

/// Check arity and coerce parameters, returning the invocation future.
///
/// An omitted variadic tail is filled in with an empty array.
pub fn invoke(function: &Function, mut params: Vec<Value>) -> Result<CallFuture, Error> {
    let signature = function.signature();
    if !signature.accepts(params.len()) {
        return Err(signature.arity_error(params.len()));
    }
    if signature.is_variadic() && params.len() < signature.params().len() {
        params.push(Value::Array(Vec::new()));
    }
    function.prepare(params)
}

/// Parse `body`, invoke `function` and normalize the outcome.
///
/// Panics raised by the function are not caught here.
pub async fn dispatch(name: &str, function: &Function, body: &[u8]) -> CallResult {
    debug!("Dispatching {} ({} byte body)", name, body.len());
    let fut = match parse_request(body).and_then(|params| invoke(function, params)) {
        Ok(fut) => fut,
        Err(err) => {
            debug!("Rejected call to {}: {}", name, err);
            return CallResult::Failure(err);
        }
    };
    let result = normalize(fut.await);
    if let CallResult::Failure(err) = &result {
        debug!("Function {} failed: code={:?} message={}", name, err.code, err.message);
    }
    result
}

/// Map raw outputs onto a call result using the zero/one/many rule.
pub fn normalize(returned: Returned) -> CallResult {
    match returned {
        Returned::Values(values) => CallResult::Success(collapse(values)),
        Returned::Checked(_, Some(err)) => CallResult::Failure(err.into_wire()),
        Returned::Checked(values, None) => CallResult::Success(collapse(values)),
    }
}

fn collapse(mut values: Vec<Value>) -> Value {
    match values.len() {
        0 => Value::Null,
        1 => values.pop().unwrap_or(Value::Null),
        _ => Value::Array(values),
    }
}
