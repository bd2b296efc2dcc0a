//! Transport layer for the JSON-RPC client

use async_trait::async_trait;

use crate::error::JsonRpcClientResult;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpTransport;

#[cfg(feature = "loopback")]
pub mod loopback;

#[cfg(feature = "loopback")]
pub use loopback::{Exchange, LoopbackTransport};

/// Moves one serialized request (or batch) to the server and returns the raw
/// response text. An empty string is a legal reply meaning "nothing to
/// parse", as for notifications.
///
/// Called at most once per single call or batch flush. Timeouts and
/// cancellation belong to the implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&mut self, payload: String) -> JsonRpcClientResult<String>;

    /// Human-readable description of where requests go
    fn endpoint(&self) -> String {
        "unknown".to_string()
    }
}

/// Boxed transport for dynamic dispatch
pub type BoxedTransport = Box<dyn Transport>;

#[async_trait]
impl Transport for BoxedTransport {
    async fn send(&mut self, payload: String) -> JsonRpcClientResult<String> {
        (**self).send(payload).await
    }

    fn endpoint(&self) -> String {
        (**self).endpoint()
    }
}
