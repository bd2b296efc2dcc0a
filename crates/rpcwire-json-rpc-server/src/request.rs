use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{JsonRpcVersion, RequestId};

/// Parameters for a JSON-RPC request
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RequestParams {
    /// Positional parameters as an array
    Array(Vec<Value>),
    /// Named parameters as an object
    Object(Map<String, Value>),
}

impl RequestParams {
    /// Check if parameters are empty
    pub fn is_empty(&self) -> bool {
        match self {
            RequestParams::Object(map) => map.is_empty(),
            RequestParams::Array(vec) => vec.is_empty(),
        }
    }

    /// Convert to a serde_json::Value for serialization
    pub fn to_value(&self) -> Value {
        match self {
            RequestParams::Object(map) => Value::Object(map.clone()),
            RequestParams::Array(arr) => Value::Array(arr.clone()),
        }
    }
}

impl From<Map<String, Value>> for RequestParams {
    fn from(map: Map<String, Value>) -> Self {
        RequestParams::Object(map)
    }
}

impl From<Vec<Value>> for RequestParams {
    fn from(vec: Vec<Value>) -> Self {
        RequestParams::Array(vec)
    }
}

/// A JSON-RPC request or notification as it appears on the wire.
///
/// Serialization applies the per-version field rules:
///
/// | field     | 1.0                              | 2.0                        |
/// |-----------|----------------------------------|----------------------------|
/// | `jsonrpc` | absent                           | `"2.0"`                    |
/// | `params`  | omitted when `None`              | omitted when `None`        |
/// | `id`      | always present, `null` if notify | absent for a notification  |
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRpcRequest {
    pub version: JsonRpcVersion,
    pub method: String,
    pub params: Option<RequestParams>,
    /// `None` marks a notification
    pub id: Option<RequestId>,
}

impl JsonRpcRequest {
    pub fn new(
        version: JsonRpcVersion,
        method: impl Into<String>,
        params: Option<RequestParams>,
        id: Option<RequestId>,
    ) -> Self {
        Self {
            version,
            method: method.into(),
            params,
            id,
        }
    }

    /// Create a notification (a request that carries no id)
    pub fn notification(
        version: JsonRpcVersion,
        method: impl Into<String>,
        params: Option<RequestParams>,
    ) -> Self {
        Self::new(version, method, params, None)
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

impl Serialize for JsonRpcRequest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let v2 = self.version.is_v2();
        let len = usize::from(v2)
            + 1
            + usize::from(self.params.is_some())
            + usize::from(!v2 || self.id.is_some());

        let mut state = serializer.serialize_struct("JsonRpcRequest", len)?;
        if v2 {
            state.serialize_field("jsonrpc", &self.version)?;
        }
        state.serialize_field("method", &self.method)?;
        if let Some(params) = &self.params {
            state.serialize_field("params", params)?;
        }
        if v2 {
            if let Some(id) = &self.id {
                state.serialize_field("id", id)?;
            }
        } else {
            state.serialize_field("id", &self.id)?;
        }
        state.end()
    }
}
