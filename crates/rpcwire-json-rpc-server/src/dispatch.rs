//! Parsing and parameter binding stages of the dispatch pipeline.
//!
//! These are the synchronous halves of dispatch: turning an inbound value into
//! a validated call (`parse_call`) and binding its params to handler
//! arguments (`bind_params`). Invocation lives in [`crate::r#async`].

use serde_json::Value;

use crate::args::CallArgs;
use crate::error::JsonRpcErrorObject;
use crate::options::ServerOptions;
use crate::request::JsonRpcRequest;
use crate::response::JsonRpcResponse;
use crate::types::{JsonRpcVersion, RequestId};

/// A parsed inbound call, ready for method resolution
#[derive(Debug, Clone, PartialEq)]
pub struct InboundCall {
    pub version: JsonRpcVersion,
    /// `None` marks a notification
    pub id: Option<RequestId>,
    pub method: String,
    /// Raw params; their shape is validated during binding
    pub params: Option<Value>,
}

impl InboundCall {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

impl From<JsonRpcRequest> for InboundCall {
    fn from(request: JsonRpcRequest) -> Self {
        Self {
            version: request.version,
            id: request.id,
            method: request.method,
            params: request.params.map(|params| params.to_value()),
        }
    }
}

/// A message that failed before it became a call.
///
/// Always answered, even when the id is unknown: the response is keyed to
/// `null` in that case.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseFailure {
    pub version: JsonRpcVersion,
    pub id: Option<RequestId>,
    pub error: JsonRpcErrorObject,
}

impl ParseFailure {
    pub fn new(version: JsonRpcVersion, id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self { version, id, error }
    }

    pub fn into_response(self, options: &ServerOptions) -> JsonRpcResponse {
        JsonRpcResponse::error(
            self.version,
            self.id,
            self.error,
            options.v1_structured_errors,
        )
    }
}

/// Decode raw request text. Undecodable text is a `ParseError`.
pub fn decode(text: &str) -> Result<Value, ParseFailure> {
    serde_json::from_str(text).map_err(|_| {
        ParseFailure::new(
            JsonRpcVersion::default(),
            None,
            JsonRpcErrorObject::parse_error(),
        )
    })
}

/// Validate one request object.
///
/// Outside a batch a missing `jsonrpc` marker means 1.0. Inside a batch the
/// marker is mandatory, since batches only exist in 2.0.
pub fn parse_call(value: Value, in_batch: bool) -> Result<InboundCall, ParseFailure> {
    let default_version = if in_batch {
        JsonRpcVersion::V2_0
    } else {
        JsonRpcVersion::V1_0
    };

    let mut object = match value {
        Value::Object(object) => object,
        _ if in_batch => {
            return Err(ParseFailure::new(
                default_version,
                None,
                JsonRpcErrorObject::invalid_request(),
            ));
        }
        _ => {
            return Err(ParseFailure::new(
                default_version,
                None,
                JsonRpcErrorObject::parse_error(),
            ));
        }
    };

    let version = match object.get("jsonrpc") {
        Some(marker) if !marker.is_null() => JsonRpcVersion::from_marker(marker),
        _ if in_batch => {
            return Err(ParseFailure::new(
                default_version,
                id_of(object.get("id")),
                JsonRpcErrorObject::invalid_request(),
            ));
        }
        _ => JsonRpcVersion::V1_0,
    };

    let id = match object.remove("id") {
        None | Some(Value::Null) => None,
        Some(raw) => match RequestId::from_value(&raw) {
            Some(id) => Some(id),
            None => {
                return Err(ParseFailure::new(
                    version,
                    None,
                    JsonRpcErrorObject::invalid_request(),
                ));
            }
        },
    };

    let method = match object.remove("method") {
        Some(Value::String(method)) => method,
        _ => {
            return Err(ParseFailure::new(
                version,
                id,
                JsonRpcErrorObject::invalid_request(),
            ));
        }
    };

    let params = object.remove("params").filter(|params| !params.is_null());

    Ok(InboundCall {
        version,
        id,
        method,
        params,
    })
}

fn id_of(raw: Option<&Value>) -> Option<RequestId> {
    raw.and_then(RequestId::from_value)
}

/// Bind raw params to handler arguments.
///
/// Named parameters are always accepted under 2.0 and only under 1.0 when
/// the server opted in.
pub fn bind_params(
    version: JsonRpcVersion,
    params: Option<Value>,
    options: &ServerOptions,
) -> Result<CallArgs, JsonRpcErrorObject> {
    let named_allowed = version.is_v2() || options.v1_named_params;

    match params {
        None | Some(Value::Null) => Ok(CallArgs::None),
        Some(Value::Array(values)) if values.is_empty() => Ok(CallArgs::None),
        Some(Value::Array(values)) => Ok(CallArgs::Positional(values)),
        Some(Value::Object(map)) if map.is_empty() => Ok(CallArgs::None),
        Some(Value::Object(map)) if named_allowed => Ok(CallArgs::Named(map)),
        _ => Err(JsonRpcErrorObject::invalid_params()),
    }
}

/// Result of dispatching one inbound payload
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A response to a single request
    Single(JsonRpcResponse),
    /// Responses to a batch, in request order, notifications omitted
    Batch(Vec<JsonRpcResponse>),
    /// Nothing to send back (successful notifications)
    NoResponse,
}

impl DispatchOutcome {
    /// Convert to JSON string if there's a response to send
    pub fn to_json_string(&self) -> Result<Option<String>, serde_json::Error> {
        match self {
            DispatchOutcome::Single(response) => serde_json::to_string(response).map(Some),
            DispatchOutcome::Batch(responses) => serde_json::to_string(responses).map(Some),
            DispatchOutcome::NoResponse => Ok(None),
        }
    }

    pub fn to_value(&self) -> Result<Option<Value>, serde_json::Error> {
        match self {
            DispatchOutcome::Single(response) => serde_json::to_value(response).map(Some),
            DispatchOutcome::Batch(responses) => serde_json::to_value(responses).map(Some),
            DispatchOutcome::NoResponse => Ok(None),
        }
    }

    /// Check if this result needs a response
    pub fn needs_response(&self) -> bool {
        !matches!(self, DispatchOutcome::NoResponse)
    }

    pub fn single(&self) -> Option<&JsonRpcResponse> {
        match self {
            DispatchOutcome::Single(response) => Some(response),
            _ => None,
        }
    }

    pub fn batch(&self) -> Option<&[JsonRpcResponse]> {
        match self {
            DispatchOutcome::Batch(responses) => Some(responses),
            _ => None,
        }
    }
}
