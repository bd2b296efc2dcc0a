//! # JSON-RPC Server Prelude
//!
//! ```rust
//! use rpcwire_json_rpc_server::prelude::*;
//! ```

pub use crate::args::CallArgs;
pub use crate::dispatch::DispatchOutcome;
pub use crate::error::{JsonRpcErrorCode, JsonRpcErrorObject, ToJsonRpcError};
pub use crate::options::ServerOptions;
pub use crate::request::{JsonRpcRequest, RequestParams};
pub use crate::response::{JsonRpcResponse, ResponseError};
pub use crate::types::{JsonRpcVersion, RequestId};

#[cfg(feature = "async")]
pub use crate::r#async::{FunctionHandler, JsonRpcDispatcher, JsonRpcHandler};

// Standard error codes
pub use crate::error_codes::*;
