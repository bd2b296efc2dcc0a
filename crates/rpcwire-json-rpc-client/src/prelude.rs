//! Convenient re-exports for client code
//!
//! ```rust
//! use rpcwire_json_rpc_client::prelude::*;
//! ```

pub use crate::client::{CallOutcome, JsonRpcClient};
pub use crate::config::{ClientConfig, IdStrategy};
pub use crate::error::{JsonRpcClientError, JsonRpcClientResult, TransportError};
pub use crate::response::{ResponseErrorDetail, RpcResponse};
pub use crate::transport::{BoxedTransport, Transport};

#[cfg(feature = "http")]
pub use crate::transport::HttpTransport;

#[cfg(feature = "loopback")]
pub use crate::transport::LoopbackTransport;

pub use rpcwire_json_rpc_server::JsonRpcVersion;
