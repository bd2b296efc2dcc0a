//! Interpretation of responses received by the client

use rpcwire_json_rpc_server::{JsonRpcVersion, RequestId};
use serde_json::{Map, Value};

use crate::error::{JsonRpcClientError, JsonRpcClientResult};

/// The error member of a response, classified once when parsed.
///
/// 2.0 responses always produce `Structured`. 1.0 leaves the error format
/// open, so any of the shapes may appear.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseErrorDetail {
    Structured {
        code: i64,
        message: Option<String>,
        data: Option<Value>,
    },
    CodeOnly(i64),
    MessageOnly(String),
    /// An error value with no recognizable code or message
    Opaque(Value),
}

impl ResponseErrorDetail {
    fn classify_v1(error: Value) -> Self {
        match error {
            Value::Object(object) => match object.get("code").and_then(Value::as_i64) {
                Some(code) => ResponseErrorDetail::Structured {
                    code,
                    message: object.get("message").and_then(Value::as_str).map(String::from),
                    data: present(&object, "data"),
                },
                None => ResponseErrorDetail::Opaque(Value::Object(object)),
            },
            Value::Number(number) => match number.as_i64() {
                Some(code) => ResponseErrorDetail::CodeOnly(code),
                None => ResponseErrorDetail::Opaque(Value::Number(number)),
            },
            Value::String(message) => ResponseErrorDetail::MessageOnly(message),
            other => ResponseErrorDetail::Opaque(other),
        }
    }

    fn parse_v2(error: Value) -> JsonRpcClientResult<Self> {
        let invalid = || JsonRpcClientError::invalid_response("Invalid error object in response");

        let Value::Object(object) = error else {
            return Err(invalid());
        };
        let code = object.get("code").and_then(Value::as_i64).ok_or_else(invalid)?;
        let message = object
            .get("message")
            .and_then(Value::as_str)
            .ok_or_else(invalid)?
            .to_string();

        Ok(ResponseErrorDetail::Structured {
            code,
            message: Some(message),
            data: present(&object, "data"),
        })
    }

    pub fn code(&self) -> Option<i64> {
        match self {
            ResponseErrorDetail::Structured { code, .. } | ResponseErrorDetail::CodeOnly(code) => {
                Some(*code)
            }
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ResponseErrorDetail::Structured { message, .. } => message.as_deref(),
            ResponseErrorDetail::MessageOnly(message) => Some(message),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            ResponseErrorDetail::Structured { data, .. } => data.as_ref(),
            ResponseErrorDetail::Opaque(data) => Some(data),
            _ => None,
        }
    }
}

fn present(object: &Map<String, Value>, key: &str) -> Option<Value> {
    object.get(key).filter(|value| !value.is_null()).cloned()
}

/// A response as the client sees it.
///
/// `success` is set only when a result was received. A response carrying
/// neither a result nor an error is unsuccessful with nothing populated.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcResponse {
    /// The response id; `Value::Null` when the server did not know it
    pub id: Value,
    pub success: bool,
    /// `Some(Value::Null)` when the server reported a null result
    pub result: Option<Value>,
    pub error: Option<ResponseErrorDetail>,
}

impl RpcResponse {
    /// Interpret one decoded response object under `version`'s rules
    pub fn parse(version: JsonRpcVersion, value: Value) -> JsonRpcClientResult<Self> {
        let Value::Object(mut object) = value else {
            return Err(JsonRpcClientError::invalid_response(
                "Response was not a valid JSON object",
            ));
        };

        if version.is_v2() {
            let marker = object
                .get("jsonrpc")
                .and_then(|marker| serde_json::from_value::<JsonRpcVersion>(marker.clone()).ok());
            if marker != Some(JsonRpcVersion::V2_0) {
                return Err(JsonRpcClientError::invalid_response(
                    "Response was not in JSON-RPC 2.0 format",
                ));
            }
        }

        let id = object
            .remove("id")
            .ok_or_else(|| JsonRpcClientError::invalid_response("Response did not have 'id'"))?;

        let mut response = RpcResponse {
            id,
            success: false,
            result: None,
            error: None,
        };

        match object.remove("error").filter(|error| !error.is_null()) {
            Some(error) if version.is_v2() => {
                response.error = Some(ResponseErrorDetail::parse_v2(error)?);
            }
            Some(error) => {
                response.error = Some(ResponseErrorDetail::classify_v1(error));
            }
            None => {
                if let Some(result) = object.remove("result") {
                    response.result = Some(result);
                    response.success = true;
                }
            }
        }

        Ok(response)
    }

    /// The id as a request id, if it is one a request could have carried
    pub fn request_id(&self) -> Option<RequestId> {
        RequestId::from_value(&self.id)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn code(&self) -> Option<i64> {
        self.error.as_ref().and_then(ResponseErrorDetail::code)
    }

    pub fn message(&self) -> Option<&str> {
        self.error.as_ref().and_then(ResponseErrorDetail::message)
    }

    pub fn error_data(&self) -> Option<&Value> {
        self.error.as_ref().and_then(ResponseErrorDetail::data)
    }
}
