use serde::ser::SerializeStruct;
use serde::Serialize;
use serde_json::Value;

use crate::error::JsonRpcErrorObject;
use crate::types::{JsonRpcVersion, RequestId};

/// The error member of a response.
///
/// 2.0 always carries the structured object. 1.0 carries the bare message
/// unless the server opted into structured errors for 1.0 as well.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseError {
    Object(JsonRpcErrorObject),
    Message(String),
}

impl ResponseError {
    pub fn message(&self) -> &str {
        match self {
            ResponseError::Object(obj) => &obj.message,
            ResponseError::Message(message) => message,
        }
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            ResponseError::Object(obj) => Some(obj.code),
            ResponseError::Message(_) => None,
        }
    }
}

/// Outcome carried by a response: exactly one of result or error
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseOutcome {
    /// Success; `Value::Null` when the method produced no value
    Result(Value),
    Error(ResponseError),
}

/// An outbound JSON-RPC response.
///
/// Serialization applies the per-version field rules: 2.0 emits `jsonrpc`
/// and exactly one of `result`/`error`; 1.0 always emits both, with `null`
/// in the unused one. `id` is always present and `null` when unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcResponse {
    pub version: JsonRpcVersion,
    pub id: Option<RequestId>,
    pub outcome: ResponseOutcome,
}

impl JsonRpcResponse {
    pub fn success(version: JsonRpcVersion, id: Option<RequestId>, result: Value) -> Self {
        Self {
            version,
            id,
            outcome: ResponseOutcome::Result(result),
        }
    }

    /// Build an error response, choosing the error representation for the
    /// version. `v1_structured` only matters for 1.0.
    pub fn error(
        version: JsonRpcVersion,
        id: Option<RequestId>,
        error: JsonRpcErrorObject,
        v1_structured: bool,
    ) -> Self {
        let error = if version.is_v2() || v1_structured {
            ResponseError::Object(error)
        } else {
            ResponseError::Message(error.message)
        };
        Self {
            version,
            id,
            outcome: ResponseOutcome::Error(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ResponseOutcome::Error(_))
    }

    pub fn result(&self) -> Option<&Value> {
        match &self.outcome {
            ResponseOutcome::Result(value) => Some(value),
            ResponseOutcome::Error(_) => None,
        }
    }

    pub fn error_ref(&self) -> Option<&ResponseError> {
        match &self.outcome {
            ResponseOutcome::Result(_) => None,
            ResponseOutcome::Error(error) => Some(error),
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

impl Serialize for JsonRpcResponse {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.version {
            JsonRpcVersion::V2_0 => {
                let mut state = serializer.serialize_struct("JsonRpcResponse", 3)?;
                state.serialize_field("jsonrpc", &self.version)?;
                match &self.outcome {
                    ResponseOutcome::Result(result) => state.serialize_field("result", result)?,
                    ResponseOutcome::Error(error) => state.serialize_field("error", error)?,
                }
                state.serialize_field("id", &self.id)?;
                state.end()
            }
            JsonRpcVersion::V1_0 => {
                let mut state = serializer.serialize_struct("JsonRpcResponse", 3)?;
                match &self.outcome {
                    ResponseOutcome::Result(result) => {
                        state.serialize_field("result", result)?;
                        state.serialize_field("error", &Value::Null)?;
                    }
                    ResponseOutcome::Error(error) => {
                        state.serialize_field("result", &Value::Null)?;
                        state.serialize_field("error", error)?;
                    }
                }
                state.serialize_field("id", &self.id)?;
                state.end()
            }
        }
    }
}
