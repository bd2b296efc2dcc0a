//! # JSON-RPC 1.0/2.0 Server Engine
//!
//! A transport-agnostic JSON-RPC server that speaks both protocol versions.
//! Raw request text (or an already-decoded value) goes in, response text (or
//! nothing) comes out. The wire types in this crate are shared with the
//! client side.
//!
//! ## Features
//! - Per-message version detection; 1.0 and 2.0 peers on the same dispatcher
//! - 2.0 batches, with notifications omitted from the response array
//! - Positional and named parameters, named on 1.0 by opt-in
//! - Handler failures and panics always become error responses
//! - Async handlers with the `async` feature (default)

pub mod args;
pub mod dispatch;
pub mod error;
pub mod options;
pub mod request;
pub mod response;
pub mod types;

#[cfg(feature = "async")]
pub mod r#async;

pub mod prelude;

// Re-export main types
pub use args::CallArgs;
pub use dispatch::{DispatchOutcome, InboundCall, ParseFailure};
pub use error::{JsonRpcErrorCode, JsonRpcErrorObject, ToJsonRpcError};
pub use options::ServerOptions;
pub use request::{JsonRpcRequest, RequestParams};
pub use response::{JsonRpcResponse, ResponseError, ResponseOutcome};
pub use types::{JsonRpcVersion, RequestId};

#[cfg(feature = "async")]
pub use r#async::{FunctionHandler, JsonRpcDispatcher, JsonRpcHandler};

/// JSON-RPC 2.0 version marker
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Server error range: -32099 to -32000
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;
}
