use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A uniquely identifying ID for a JSON-RPC request.
/// Can be a string or an integer. A `null` id is modelled as `Option::None`
/// by the types that carry one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
    /// Integer ids beyond `i64::MAX`
    Unsigned(u64),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{}", s),
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::Unsigned(n) => write!(f, "{}", n),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

impl RequestId {
    /// Interpret a wire value as an id. Returns `None` for `null` and for
    /// value types that cannot identify a request (floats, bools, containers).
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RequestId::String(s.clone())),
            Value::Number(n) => n
                .as_i64()
                .map(RequestId::Number)
                .or_else(|| n.as_u64().map(RequestId::Unsigned)),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RequestId::String(s) => Value::String(s.clone()),
            RequestId::Number(n) => Value::Number((*n).into()),
            RequestId::Unsigned(n) => Value::Number((*n).into()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RequestId::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RequestId::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// JSON-RPC protocol version.
///
/// 1.0 is the default, matching peers that omit the `jsonrpc` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum JsonRpcVersion {
    #[default]
    V1_0,
    V2_0,
}

impl JsonRpcVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonRpcVersion::V1_0 => "1.0",
            JsonRpcVersion::V2_0 => "2.0",
        }
    }

    pub fn is_v2(&self) -> bool {
        matches!(self, JsonRpcVersion::V2_0)
    }

    /// Classify an inbound `jsonrpc` marker. Any numeric value (or numeric
    /// string) of at least 2 selects 2.0; everything else falls back to 1.0.
    pub fn from_marker(marker: &Value) -> Self {
        match marker_number(marker) {
            Some(n) if n >= 2.0 => JsonRpcVersion::V2_0,
            _ => JsonRpcVersion::V1_0,
        }
    }
}

fn marker_number(marker: &Value) -> Option<f64> {
    match marker {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

impl fmt::Display for JsonRpcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match marker_number(&value) {
            Some(n) if n == 1.0 => Ok(JsonRpcVersion::V1_0),
            Some(n) if n == 2.0 => Ok(JsonRpcVersion::V2_0),
            _ => Err(serde::de::Error::custom(format!(
                "Invalid JSON-RPC version: {}",
                value
            ))),
        }
    }
}
