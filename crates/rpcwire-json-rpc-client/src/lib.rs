//! # JSON-RPC Client
//!
//! The calling side of JSON-RPC 1.0 and 2.0: builds requests under an
//! explicit [`ClientConfig`], mints ids, queues 2.0 batches with optional
//! per-call callbacks, and interprets responses, including the open-ended
//! 1.0 error format.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rpcwire_json_rpc_client::{ClientConfig, JsonRpcClient};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = JsonRpcClient::http("http://localhost:8080/rpc", ClientConfig::v2())?;
//! let outcome = client.call("echo", json!(["hi"])).await?;
//! if let Some(response) = outcome.response() {
//!     println!("result: {:?}", response.result());
//! }
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod id;
pub mod response;
pub mod transport;

pub mod prelude;

pub use batch::{BatchQueue, ResponseCallback};
pub use builder::{BuiltRequest, build_request};
pub use client::{CallOutcome, JsonRpcClient};
pub use config::{ClientConfig, IdStrategy};
pub use error::{JsonRpcClientError, JsonRpcClientResult, TransportError};
pub use id::IdGenerator;
pub use response::{ResponseErrorDetail, RpcResponse};
pub use transport::{BoxedTransport, Transport};

#[cfg(feature = "http")]
pub use transport::HttpTransport;

#[cfg(feature = "loopback")]
pub use transport::{Exchange, LoopbackTransport};

// Shared wire types
pub use rpcwire_json_rpc_server::{JsonRpcRequest, JsonRpcVersion, RequestId};
