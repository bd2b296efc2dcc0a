//! In-process transport wired directly to a server dispatcher

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rpcwire_json_rpc_server::{JsonRpcDispatcher, ToJsonRpcError};
use tracing::debug;

use crate::error::JsonRpcClientResult;
use crate::transport::Transport;

/// One request/response pair as it crossed the loopback
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub request: String,
    /// Empty when the server had nothing to say
    pub response: String,
}

/// Hands each payload to the dispatcher and returns its output text.
/// A dispatch that produces no response yields the empty string.
pub struct LoopbackTransport<E>
where
    E: ToJsonRpcError,
{
    dispatcher: Arc<JsonRpcDispatcher<E>>,
    exchanges: Arc<Mutex<Vec<Exchange>>>,
}

impl<E> LoopbackTransport<E>
where
    E: ToJsonRpcError,
{
    pub fn new(dispatcher: Arc<JsonRpcDispatcher<E>>) -> Self {
        Self {
            dispatcher,
            exchanges: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared view of every exchange, usable after the transport moved into a client
    pub fn exchanges(&self) -> Arc<Mutex<Vec<Exchange>>> {
        Arc::clone(&self.exchanges)
    }
}

#[async_trait]
impl<E> Transport for LoopbackTransport<E>
where
    E: ToJsonRpcError,
{
    async fn send(&mut self, payload: String) -> JsonRpcClientResult<String> {
        let response = self.dispatcher.handle_str(&payload).await?.unwrap_or_default();
        debug!(request = %payload, response = %response, "loopback exchange");

        self.exchanges.lock().push(Exchange {
            request: payload,
            response: response.clone(),
        });
        Ok(response)
    }

    fn endpoint(&self) -> String {
        "loopback".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use rpcwire_json_rpc_server::JsonRpcErrorObject;
    use serde_json::{Value, json};

    fn dispatcher() -> Arc<JsonRpcDispatcher> {
        let mut dispatcher: JsonRpcDispatcher = JsonRpcDispatcher::new();
        dispatcher.register_fn("ping", |_| {
            async move { Ok::<_, JsonRpcErrorObject>(json!("pong")) }.boxed()
        });
        Arc::new(dispatcher)
    }

    #[tokio::test]
    async fn test_records_exchanges() {
        let mut transport = LoopbackTransport::new(dispatcher());
        let exchanges = transport.exchanges();

        let reply = transport
            .send(r#"{"jsonrpc": "2.0", "method": "ping", "id": 1}"#.to_string())
            .await
            .unwrap();
        let reply: Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(reply["result"], json!("pong"));

        let silent = transport
            .send(r#"{"jsonrpc": "2.0", "method": "ping"}"#.to_string())
            .await
            .unwrap();
        assert!(silent.is_empty());

        assert_eq!(exchanges.lock().len(), 2);
        assert_eq!(transport.endpoint(), "loopback");
    }
}
