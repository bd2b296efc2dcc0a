//! Queue of batched calls and demultiplexing of batch responses

use std::collections::HashMap;
use std::fmt;

use rpcwire_json_rpc_server::{JsonRpcRequest, JsonRpcVersion, RequestId};
use serde_json::Value;
use tracing::debug;

use crate::error::{JsonRpcClientError, JsonRpcClientResult};
use crate::response::RpcResponse;

/// Invoked with the response whose id matches the queued request
pub type ResponseCallback = Box<dyn FnMut(&RpcResponse) + Send>;

/// One queued call
pub struct BatchEntry {
    pub request: JsonRpcRequest,
    pub callback: Option<ResponseCallback>,
}

impl fmt::Debug for BatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchEntry")
            .field("request", &self.request)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// Calls waiting for the next flush
#[derive(Debug, Default)]
pub struct BatchQueue {
    entries: Vec<BatchEntry>,
}

impl BatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, request: JsonRpcRequest, callback: Option<ResponseCallback>) {
        self.entries.push(BatchEntry { request, callback });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a queued request already carries `id`
    pub fn contains_id(&self, id: &RequestId) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.request.id.as_ref() == Some(id))
    }

    pub fn requests(&self) -> impl Iterator<Item = &JsonRpcRequest> {
        self.entries.iter().map(|entry| &entry.request)
    }

    /// Empty the queue, handing its entries to the caller
    pub fn take(&mut self) -> Vec<BatchEntry> {
        std::mem::take(&mut self.entries)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// A drained batch, split into the wire payload and its callback routing
pub struct PreparedBatch {
    pub requests: Vec<JsonRpcRequest>,
    pub callbacks: HashMap<RequestId, ResponseCallback>,
}

impl PreparedBatch {
    /// Callbacks are routed by id, so those on notifications are dropped here
    pub fn from_entries(entries: Vec<BatchEntry>) -> Self {
        let mut requests = Vec::with_capacity(entries.len());
        let mut callbacks = HashMap::new();

        for BatchEntry { request, callback } in entries {
            if let (Some(id), Some(callback)) = (request.id.clone(), callback) {
                callbacks.insert(id, callback);
            }
            requests.push(request);
        }

        Self {
            requests,
            callbacks,
        }
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.requests)
    }
}

/// Interpret the text returned for a batch, invoking callbacks in response
/// order as their ids come up.
pub fn demultiplex(
    version: JsonRpcVersion,
    text: &str,
    callbacks: &mut HashMap<RequestId, ResponseCallback>,
) -> JsonRpcClientResult<Vec<RpcResponse>> {
    if text.trim().is_empty() {
        debug!("empty batch response");
        return Ok(Vec::new());
    }

    let decoded: Value = serde_json::from_str(text)
        .map_err(|e| JsonRpcClientError::parse_error(format!("Batch response: {}", e)))?;

    match decoded {
        // The server rejected the batch as a whole
        Value::Object(object) if object.contains_key("jsonrpc") => {
            Ok(vec![RpcResponse::parse(version, Value::Object(object))?])
        }
        Value::Array(items) => {
            let mut responses = Vec::with_capacity(items.len());
            for item in items {
                let response = RpcResponse::parse(version, item)?;
                if let Some(callback) = response
                    .request_id()
                    .and_then(|id| callbacks.get_mut(&id))
                {
                    callback(&response);
                }
                responses.push(response);
            }
            Ok(responses)
        }
        _ => Err(JsonRpcClientError::invalid_response(
            "Batch response was in unrecognized format",
        )),
    }
}
