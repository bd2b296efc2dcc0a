//! JSON-RPC client facade

use rpcwire_json_rpc_server::JsonRpcRequest;
use serde_json::Value;
use tracing::{debug, info};

use crate::batch::{BatchQueue, PreparedBatch, ResponseCallback, demultiplex};
use crate::builder::{BuiltRequest, build_request, method_name, positional_params};
use crate::config::ClientConfig;
use crate::error::{JsonRpcClientError, JsonRpcClientResult};
use crate::id::IdGenerator;
use crate::response::RpcResponse;
use crate::transport::{BoxedTransport, Transport};

/// What a call produced
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The server's response to a single call
    Response(RpcResponse),
    /// Sent as a notification; no response is expected
    Notified,
    /// Held in the batch queue until the next flush
    Queued,
    /// The call flushed the batch queue
    Batch(Vec<RpcResponse>),
}

impl CallOutcome {
    pub fn response(&self) -> Option<&RpcResponse> {
        match self {
            CallOutcome::Response(response) => Some(response),
            _ => None,
        }
    }

    pub fn into_response(self) -> Option<RpcResponse> {
        match self {
            CallOutcome::Response(response) => Some(response),
            _ => None,
        }
    }

    pub fn into_responses(self) -> Vec<RpcResponse> {
        match self {
            CallOutcome::Response(response) => vec![response],
            CallOutcome::Batch(responses) => responses,
            CallOutcome::Notified | CallOutcome::Queued => Vec::new(),
        }
    }
}

/// JSON-RPC client.
///
/// One instance serves one logical caller: calls run to completion in order,
/// and the batch queue is never shared between concurrent flushes.
pub struct JsonRpcClient {
    transport: BoxedTransport,
    config: ClientConfig,
    ids: IdGenerator,
    queue: BatchQueue,
}

impl JsonRpcClient {
    pub fn new<T>(transport: T, config: ClientConfig) -> Self
    where
        T: Transport + 'static,
    {
        Self::with_boxed_transport(Box::new(transport), config)
    }

    pub fn with_boxed_transport(transport: BoxedTransport, config: ClientConfig) -> Self {
        info!(
            endpoint = %transport.endpoint(),
            version = %config.version,
            "JSON-RPC client created"
        );
        Self {
            transport,
            config,
            ids: IdGenerator::new(),
            queue: BatchQueue::new(),
        }
    }

    /// Client posting to an HTTP endpoint
    #[cfg(feature = "http")]
    pub fn http(endpoint: &str, config: ClientConfig) -> JsonRpcClientResult<Self> {
        Ok(Self::new(
            crate::transport::HttpTransport::new(endpoint)?,
            config,
        ))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Settings changed here apply from the next call on
    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    /// Number of calls waiting in the batch queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn pending_requests(&self) -> impl Iterator<Item = &JsonRpcRequest> {
        self.queue.requests()
    }

    /// Call `method` with `params`, which must be a JSON array.
    ///
    /// Outside batch mode the request is sent at once. In batch mode it is
    /// queued, unless `method` is the configured batch method, which flushes
    /// the queue instead.
    pub async fn call(
        &mut self,
        method: impl Into<Value>,
        params: Value,
    ) -> JsonRpcClientResult<CallOutcome> {
        self.dispatch(method.into(), params, None).await
    }

    /// Queue a call whose response is passed to `callback` when the batch is
    /// flushed. Only valid while batching.
    pub async fn call_with_callback<F>(
        &mut self,
        method: impl Into<Value>,
        params: Value,
        callback: F,
    ) -> JsonRpcClientResult<CallOutcome>
    where
        F: FnMut(&RpcResponse) + Send + 'static,
    {
        self.dispatch(method.into(), params, Some(Box::new(callback)))
            .await
    }

    async fn dispatch(
        &mut self,
        method: Value,
        params: Value,
        callback: Option<ResponseCallback>,
    ) -> JsonRpcClientResult<CallOutcome> {
        let method = method_name(&method)?;
        let params = positional_params(params)?;

        if callback.is_some() {
            if !self.config.batching() {
                return Err(JsonRpcClientError::invalid_params(
                    "Callbacks are only accepted for batched 2.0 calls",
                ));
            }
            if method == self.config.batch_method {
                return Err(JsonRpcClientError::invalid_params(
                    "The batch flush method takes no callback",
                ));
            }
        }

        if self.config.batching() && method == self.config.batch_method {
            return Ok(CallOutcome::Batch(self.send_batch().await?));
        }

        let queue = &self.queue;
        let built = build_request(&self.config, &mut self.ids, &method, params, |id| {
            queue.contains_id(id)
        })?;
        debug!(
            method = %method,
            id = ?built.request.id,
            notification = built.notification,
            "built JSON-RPC request"
        );

        if self.config.batching() {
            self.queue.enqueue(built.request, callback);
            return Ok(CallOutcome::Queued);
        }

        self.send_single(built).await
    }

    async fn send_single(&mut self, built: BuiltRequest) -> JsonRpcClientResult<CallOutcome> {
        let payload = serde_json::to_string(&built.request)?;
        let text = self.transport.send(payload).await?;
        debug!(response_text = %text, "JSON-RPC response received");

        if built.notification {
            return Ok(CallOutcome::Notified);
        }

        let decoded: Value = serde_json::from_str(&text)
            .map_err(|e| JsonRpcClientError::parse_error(e.to_string()))?;
        if decoded.is_null() {
            return Err(JsonRpcClientError::parse_error("Response body was null"));
        }

        RpcResponse::parse(self.config.version, decoded).map(CallOutcome::Response)
    }

    /// Send every queued call as one batch and return the responses in the
    /// order the server sent them. An empty queue sends nothing.
    ///
    /// The queue is emptied before sending, so a failed flush is never
    /// retried with stale entries.
    pub async fn send_batch(&mut self) -> JsonRpcClientResult<Vec<RpcResponse>> {
        let entries = self.queue.take();
        if entries.is_empty() {
            debug!("batch flush with nothing queued");
            return Ok(Vec::new());
        }

        let mut batch = PreparedBatch::from_entries(entries);
        let payload = batch.to_json_string()?;
        info!(size = batch.requests.len(), "sending JSON-RPC batch");

        let text = self.transport.send(payload).await?;
        debug!(response_text = %text, "JSON-RPC batch response received");

        demultiplex(self.config.version, &text, &mut batch.callbacks)
    }

    /// Drop every queued call without sending it
    pub fn discard_batch(&mut self) {
        self.queue.clear();
    }
}
