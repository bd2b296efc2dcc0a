//! Error types for JSON-RPC client operations

use rpcwire_json_rpc_server::error_codes;
use thiserror::Error;

/// Result type for JSON-RPC client operations
pub type JsonRpcClientResult<T> = Result<T, JsonRpcClientError>;

/// Failures raised to the caller of the client.
///
/// A server-reported error is not one of these: it arrives as an unsuccessful
/// [`RpcResponse`](crate::response::RpcResponse). These cover what the client
/// cannot hand back as a response at all.
#[derive(Error, Debug)]
pub enum JsonRpcClientError {
    /// Response text did not decode as JSON
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The call could not be turned into a request
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),

    /// The call's parameters had the wrong shape
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// The decoded response broke the protocol's shape rules
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Transport-specific errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP transport error: {0}")]
    Http(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Transport closed unexpectedly")]
    Closed,
}

impl JsonRpcClientError {
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// The protocol error code for this failure, if it has one.
    /// `InvalidResponse` is client-side only and carries no wire code.
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::ParseError(_) => Some(error_codes::PARSE_ERROR),
            Self::InvalidRequest(_) => Some(error_codes::INVALID_REQUEST),
            Self::InvalidParams(_) => Some(error_codes::INVALID_PARAMS),
            _ => None,
        }
    }

    /// Check if this error came from the transport rather than the protocol
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
