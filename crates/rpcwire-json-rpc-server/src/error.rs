use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::error_codes;

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError(i64), // -32099 to -32000
    /// Application-defined code outside the reserved range
    Application(i64),
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => error_codes::PARSE_ERROR,
            JsonRpcErrorCode::InvalidRequest => error_codes::INVALID_REQUEST,
            JsonRpcErrorCode::MethodNotFound => error_codes::METHOD_NOT_FOUND,
            JsonRpcErrorCode::InvalidParams => error_codes::INVALID_PARAMS,
            JsonRpcErrorCode::InternalError => error_codes::INTERNAL_ERROR,
            JsonRpcErrorCode::ServerError(code) => *code,
            JsonRpcErrorCode::Application(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::ServerError(_) => "Server error",
            JsonRpcErrorCode::Application(_) => "Application error",
        }
    }

    /// Map a numeric code back onto the taxonomy
    pub fn from_code(code: i64) -> Self {
        match code {
            error_codes::PARSE_ERROR => JsonRpcErrorCode::ParseError,
            error_codes::INVALID_REQUEST => JsonRpcErrorCode::InvalidRequest,
            error_codes::METHOD_NOT_FOUND => JsonRpcErrorCode::MethodNotFound,
            error_codes::INVALID_PARAMS => JsonRpcErrorCode::InvalidParams,
            error_codes::INTERNAL_ERROR => JsonRpcErrorCode::InternalError,
            error_codes::SERVER_ERROR_START..=error_codes::SERVER_ERROR_END => {
                JsonRpcErrorCode::ServerError(code)
            }
            other => JsonRpcErrorCode::Application(other),
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// JSON-RPC Error object.
///
/// Also the error type handlers raise: any failure that should reach the
/// peer is expressed as one of these (or converted into one through
/// [`ToJsonRpcError`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message} ({code})")]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorObject {
    pub fn new(code: JsonRpcErrorCode, message: Option<String>, data: Option<Value>) -> Self {
        Self {
            code: code.code(),
            message: message.unwrap_or_else(|| code.message().to_string()),
            data,
        }
    }

    pub fn kind(&self) -> JsonRpcErrorCode {
        JsonRpcErrorCode::from_code(self.code)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error() -> Self {
        Self::new(JsonRpcErrorCode::ParseError, None, None)
    }

    pub fn invalid_request() -> Self {
        Self::new(JsonRpcErrorCode::InvalidRequest, None, None)
    }

    pub fn method_not_found() -> Self {
        Self::new(JsonRpcErrorCode::MethodNotFound, None, None)
    }

    pub fn invalid_params() -> Self {
        Self::new(JsonRpcErrorCode::InvalidParams, None, None)
    }

    pub fn invalid_params_with(message: impl Into<String>) -> Self {
        Self::new(JsonRpcErrorCode::InvalidParams, Some(message.into()), None)
    }

    pub fn internal_error(message: Option<String>) -> Self {
        Self::new(JsonRpcErrorCode::InternalError, message, None)
    }

    /// An implementation-defined server error. Codes outside -32099..=-32000
    /// are kept as application codes.
    pub fn server_error(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        let kind = if (error_codes::SERVER_ERROR_START..=error_codes::SERVER_ERROR_END).contains(&code)
        {
            JsonRpcErrorCode::ServerError(code)
        } else {
            JsonRpcErrorCode::Application(code)
        };
        Self::new(kind, Some(message.into()), data)
    }

    /// An application-defined failure with a caller-chosen code
    pub fn application(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }
}

impl From<JsonRpcErrorCode> for JsonRpcErrorObject {
    fn from(code: JsonRpcErrorCode) -> Self {
        Self::new(code, None, None)
    }
}

/// Trait for errors that can be converted to JSON-RPC error objects
pub trait ToJsonRpcError: std::error::Error + Send + Sync + 'static {
    /// Convert this error to a JSON-RPC error object
    fn to_error_object(&self) -> JsonRpcErrorObject;
}

impl ToJsonRpcError for JsonRpcErrorObject {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        self.clone()
    }
}
