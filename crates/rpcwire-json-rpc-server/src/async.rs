use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::{
    args::CallArgs,
    dispatch::{DispatchOutcome, InboundCall, ParseFailure, bind_params, decode, parse_call},
    error::{JsonRpcErrorObject, ToJsonRpcError},
    options::ServerOptions,
    request::JsonRpcRequest,
    response::JsonRpcResponse,
    types::JsonRpcVersion,
};

/// Trait for handling JSON-RPC method calls
#[async_trait]
pub trait JsonRpcHandler: Send + Sync {
    /// The error type returned by this handler
    type Error: ToJsonRpcError;

    /// Handle a method call. Returning `Value::Null` means "no result value".
    /// Returns domain errors only - dispatcher handles conversion to JSON-RPC errors
    async fn handle(&self, method: &str, args: CallArgs) -> Result<Value, Self::Error>;

    /// List supported methods (optional - used for introspection)
    fn supported_methods(&self) -> Vec<String> {
        vec![]
    }
}

/// Boxed async method implementation used by [`FunctionHandler`]
pub type MethodFn<E> =
    dyn Fn(CallArgs) -> BoxFuture<'static, Result<Value, E>> + Send + Sync;

/// A handler backed by a single closure
pub struct FunctionHandler<E>
where
    E: ToJsonRpcError,
{
    handler_fn: Box<MethodFn<E>>,
}

impl<E> FunctionHandler<E>
where
    E: ToJsonRpcError,
{
    pub fn new<F>(handler_fn: F) -> Self
    where
        F: Fn(CallArgs) -> BoxFuture<'static, Result<Value, E>> + Send + Sync + 'static,
    {
        Self {
            handler_fn: Box::new(handler_fn),
        }
    }
}

#[async_trait]
impl<E> JsonRpcHandler for FunctionHandler<E>
where
    E: ToJsonRpcError,
{
    type Error = E;

    async fn handle(&self, _method: &str, args: CallArgs) -> Result<Value, Self::Error> {
        (self.handler_fn)(args).await
    }
}

/// JSON-RPC method dispatcher with specific error type.
///
/// Holds the capability set (method name → handler) and drives every inbound
/// message through parse → bind → invoke → respond. Nothing a handler does,
/// including panicking, escapes as anything other than an error response.
pub struct JsonRpcDispatcher<E = JsonRpcErrorObject>
where
    E: ToJsonRpcError,
{
    pub handlers: HashMap<String, Arc<dyn JsonRpcHandler<Error = E>>>,
    pub default_handler: Option<Arc<dyn JsonRpcHandler<Error = E>>>,
    options: ServerOptions,
}

impl<E> JsonRpcDispatcher<E>
where
    E: ToJsonRpcError,
{
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            default_handler: None,
            options: ServerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ServerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ServerOptions) {
        self.options = options;
    }

    /// Register a handler for a specific method
    pub fn register_method<H>(&mut self, method: impl Into<String>, handler: H)
    where
        H: JsonRpcHandler<Error = E> + 'static,
    {
        self.handlers.insert(method.into(), Arc::new(handler));
    }

    /// Register a handler for multiple methods
    pub fn register_methods<H>(&mut self, methods: Vec<String>, handler: H)
    where
        H: JsonRpcHandler<Error = E> + 'static,
    {
        let handler_arc: Arc<dyn JsonRpcHandler<Error = E>> = Arc::new(handler);
        for method in methods {
            self.handlers.insert(method, handler_arc.clone());
        }
    }

    /// Register a handler under every name it reports in `supported_methods`
    pub fn register_handler<H>(&mut self, handler: H)
    where
        H: JsonRpcHandler<Error = E> + 'static,
    {
        let methods = handler.supported_methods();
        self.register_methods(methods, handler);
    }

    /// Register a closure as the implementation of one method
    pub fn register_fn<F>(&mut self, method: impl Into<String>, handler_fn: F)
    where
        F: Fn(CallArgs) -> BoxFuture<'static, Result<Value, E>> + Send + Sync + 'static,
    {
        self.register_method(method, FunctionHandler::new(handler_fn));
    }

    /// Set a default handler for unregistered methods
    pub fn set_default_handler<H>(&mut self, handler: H)
    where
        H: JsonRpcHandler<Error = E> + 'static,
    {
        self.default_handler = Some(Arc::new(handler));
    }

    /// Get all registered methods
    pub fn registered_methods(&self) -> Vec<String> {
        self.handlers.keys().cloned().collect()
    }

    /// Process raw request text. `None` means nothing should be written back.
    pub async fn handle_str(&self, text: &str) -> Result<Option<String>, serde_json::Error> {
        let outcome = match decode(text) {
            Ok(value) => self.handle_value(value).await,
            Err(failure) => {
                warn!(error = %failure.error, "undecodable JSON-RPC payload");
                DispatchOutcome::Single(failure.into_response(&self.options))
            }
        };
        outcome.to_json_string()
    }

    /// Process a decoded payload: a single request object or a batch array
    pub async fn handle_value(&self, value: Value) -> DispatchOutcome {
        match value {
            Value::Array(items) if !items.is_empty() => self.handle_batch(items).await,
            Value::Array(_) => {
                warn!("empty JSON-RPC batch");
                let failure = ParseFailure::new(
                    JsonRpcVersion::default(),
                    None,
                    JsonRpcErrorObject::invalid_request(),
                );
                DispatchOutcome::Single(failure.into_response(&self.options))
            }
            single => self
                .handle_single(single, false)
                .await
                .map_or(DispatchOutcome::NoResponse, DispatchOutcome::Single),
        }
    }

    /// Process an already-split batch. Every element goes through the same
    /// pipeline with the batch rules applied; notifications contribute nothing.
    pub async fn handle_batch(&self, items: Vec<Value>) -> DispatchOutcome {
        debug!(size = items.len(), "dispatching JSON-RPC batch");

        let mut responses = Vec::with_capacity(items.len());
        for item in items {
            if let Some(response) = self.handle_single(item, true).await {
                responses.push(response);
            }
        }

        if responses.is_empty() {
            DispatchOutcome::NoResponse
        } else {
            DispatchOutcome::Batch(responses)
        }
    }

    /// Process an already-typed request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        self.handle_call(request.into()).await
    }

    async fn handle_single(&self, value: Value, in_batch: bool) -> Option<JsonRpcResponse> {
        match parse_call(value, in_batch) {
            Ok(call) => self.handle_call(call).await,
            Err(failure) => {
                debug!(error = %failure.error, in_batch, "rejected JSON-RPC message");
                Some(failure.into_response(&self.options))
            }
        }
    }

    async fn handle_call(&self, call: InboundCall) -> Option<JsonRpcResponse> {
        let InboundCall {
            version,
            id,
            method,
            params,
        } = call;
        let notification = id.is_none();

        let outcome = self.invoke(version, &method, params).await;

        match outcome {
            Ok(_) if notification => {
                debug!(method = %method, "notification handled");
                None
            }
            Ok(result) => {
                debug!(method = %method, id = ?id, "request succeeded");
                Some(JsonRpcResponse::success(version, id, result))
            }
            Err(error_object) => {
                debug!(
                    method = %method,
                    id = ?id,
                    code = error_object.code,
                    "request failed"
                );
                Some(JsonRpcResponse::error(
                    version,
                    id,
                    error_object,
                    self.options.v1_structured_errors,
                ))
            }
        }
    }

    async fn invoke(
        &self,
        version: JsonRpcVersion,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, JsonRpcErrorObject> {
        let handler = self
            .handlers
            .get(method)
            .or(self.default_handler.as_ref())
            .ok_or_else(JsonRpcErrorObject::method_not_found)?;

        let args = bind_params(version, params, &self.options)?;

        match AssertUnwindSafe(handler.handle(method, args))
            .catch_unwind()
            .await
        {
            Ok(Ok(result)) => Ok(result),
            // Convert domain error to JSON-RPC error using type-safe conversion
            Ok(Err(domain_error)) => Err(domain_error.to_error_object()),
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                error!(method = %method, panic = %detail, "handler panicked");
                Err(JsonRpcErrorObject::internal_error(None))
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl<E> Default for JsonRpcDispatcher<E>
where
    E: ToJsonRpcError,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestId;
    use serde_json::json;

    #[derive(thiserror::Error, Debug)]
    enum TestError {
        #[error("Test error: {0}")]
        TestError(String),
        #[error("Invalid key")]
        InvalidKey,
    }

    impl ToJsonRpcError for TestError {
        fn to_error_object(&self) -> JsonRpcErrorObject {
            match self {
                TestError::TestError(msg) => JsonRpcErrorObject::internal_error(Some(msg.clone())),
                TestError::InvalidKey => JsonRpcErrorObject::application(
                    1001,
                    "Invalid key",
                    Some(json!({"hint": "set it first"})),
                ),
            }
        }
    }

    struct TestHandler;

    #[async_trait]
    impl JsonRpcHandler for TestHandler {
        type Error = TestError;

        async fn handle(&self, method: &str, args: CallArgs) -> Result<Value, Self::Error> {
            match method {
                "echo" => Ok(args.param("message", 0).cloned().unwrap_or(Value::Null)),
                "add" => {
                    let a = args.param("a", 0).and_then(Value::as_i64).unwrap_or(0);
                    let b = args.param("b", 1).and_then(Value::as_i64).unwrap_or(0);
                    Ok(json!(a + b))
                }
                "nothing" => Ok(Value::Null),
                "error" => Err(TestError::TestError("test error".to_string())),
                "missing_key" => Err(TestError::InvalidKey),
                "explode" => panic!("handler blew up"),
                _ => Ok(json!({"method": method})),
            }
        }

        fn supported_methods(&self) -> Vec<String> {
            ["echo", "add", "nothing", "error", "missing_key", "explode"]
                .iter()
                .map(|m| m.to_string())
                .collect()
        }
    }

    fn dispatcher() -> JsonRpcDispatcher<TestError> {
        let mut dispatcher = JsonRpcDispatcher::new();
        dispatcher.register_handler(TestHandler);
        dispatcher
    }

    async fn single(dispatcher: &JsonRpcDispatcher<TestError>, value: Value) -> Value {
        dispatcher
            .handle_value(value)
            .await
            .to_value()
            .unwrap()
            .expect("a response")
    }

    #[tokio::test]
    async fn test_v1_echo() {
        let response = single(&dispatcher(), json!({"method": "echo", "params": ["hi"], "id": 1})).await;
        assert_eq!(response, json!({"result": "hi", "error": null, "id": 1}));
    }

    #[tokio::test]
    async fn test_v2_named_params() {
        let response = single(
            &dispatcher(),
            json!({"jsonrpc": "2.0", "method": "add", "params": {"a": 1, "b": 2}, "id": 7}),
        )
        .await;
        assert_eq!(response, json!({"jsonrpc": "2.0", "result": 3, "id": 7}));
    }

    #[tokio::test]
    async fn test_method_not_found() {
        let dispatcher: JsonRpcDispatcher<TestError> = JsonRpcDispatcher::new();
        let response = single(
            &dispatcher,
            json!({"jsonrpc": "2.0", "method": "unknown", "id": 1}),
        )
        .await;

        assert_eq!(response["error"]["code"], json!(-32601));
        assert_eq!(response["error"]["message"], json!("Method not found"));
        assert_eq!(response["id"], json!(1));
    }

    #[tokio::test]
    async fn test_default_handler_catches_unregistered_names() {
        let mut dispatcher: JsonRpcDispatcher<TestError> = JsonRpcDispatcher::new();
        dispatcher.set_default_handler(TestHandler);

        let response = single(
            &dispatcher,
            json!({"jsonrpc": "2.0", "method": "anything", "id": 1}),
        )
        .await;
        assert_eq!(response["result"], json!({"method": "anything"}));
    }

    #[tokio::test]
    async fn test_domain_error_carries_code_and_data() {
        let response = single(
            &dispatcher(),
            json!({"jsonrpc": "2.0", "method": "missing_key", "id": "k"}),
        )
        .await;

        assert_eq!(
            response,
            json!({
                "jsonrpc": "2.0",
                "error": {"code": 1001, "message": "Invalid key", "data": {"hint": "set it first"}},
                "id": "k"
            })
        );
    }

    #[tokio::test]
    async fn test_v1_error_is_message_string() {
        let response = single(&dispatcher(), json!({"method": "error", "id": 3})).await;
        assert_eq!(response, json!({"result": null, "error": "test error", "id": 3}));
    }

    #[tokio::test]
    async fn test_v1_structured_errors_opt_in() {
        let dispatcher =
            dispatcher().with_options(ServerOptions::new().with_v1_structured_errors(true));
        let response = single(&dispatcher, json!({"method": "error", "id": 3})).await;

        assert_eq!(response["error"]["code"], json!(-32603));
        assert_eq!(response["error"]["message"], json!("test error"));
        assert!(response.get("jsonrpc").is_none());
    }

    #[tokio::test]
    async fn test_options_replaced_after_construction() {
        let mut dispatcher = dispatcher();
        dispatcher.set_options(ServerOptions::new().with_v1_named_params(true));
        assert!(dispatcher.options().v1_named_params);

        let response = single(
            &dispatcher,
            json!({"method": "add", "params": {"a": 2, "b": 5}, "id": 9}),
        )
        .await;
        assert_eq!(response, json!({"result": 7, "error": null, "id": 9}));
    }

    #[test]
    fn test_registered_methods_follow_supported_methods() {
        let mut methods = dispatcher().registered_methods();
        methods.sort();

        assert_eq!(
            methods,
            vec!["add", "echo", "error", "explode", "missing_key", "nothing"]
        );
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let response = single(
            &dispatcher(),
            json!({"jsonrpc": "2.0", "method": "explode", "id": 9}),
        )
        .await;

        assert_eq!(response["error"]["code"], json!(-32603));
        assert_eq!(response["error"]["message"], json!("Internal error"));
    }

    #[tokio::test]
    async fn test_successful_notification_produces_nothing() {
        let outcome = dispatcher()
            .handle_value(json!({"jsonrpc": "2.0", "method": "echo", "params": ["x"]}))
            .await;
        assert_eq!(outcome, DispatchOutcome::NoResponse);

        let text = dispatcher()
            .handle_str(r#"{"method": "echo", "params": ["x"], "id": null}"#)
            .await
            .unwrap();
        assert_eq!(text, None);
    }

    #[tokio::test]
    async fn test_failed_notification_still_reports() {
        let response = single(
            &dispatcher(),
            json!({"jsonrpc": "2.0", "method": "error"}),
        )
        .await;

        assert_eq!(response["error"]["code"], json!(-32603));
        assert_eq!(response["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_null_result_is_reported() {
        let response = single(
            &dispatcher(),
            json!({"jsonrpc": "2.0", "method": "nothing", "id": 1}),
        )
        .await;
        assert_eq!(response, json!({"jsonrpc": "2.0", "result": null, "id": 1}));
    }

    #[tokio::test]
    async fn test_parse_error_keyed_to_null_id() {
        let text = dispatcher()
            .handle_str(r#"{"jsonrpc": "2.0", "method": "#)
            .await
            .unwrap()
            .unwrap();
        let response: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(response, json!({"result": null, "error": "Parse error", "id": null}));

        let dispatcher =
            dispatcher().with_options(ServerOptions::new().with_v1_structured_errors(true));
        let text = dispatcher.handle_str("not json").await.unwrap().unwrap();
        let response: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(response["error"]["code"], json!(-32700));
        assert_eq!(response["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_batch_in_order_without_notifications() {
        let outcome = dispatcher()
            .handle_value(json!([
                {"jsonrpc": "2.0", "method": "echo", "params": ["a"], "id": 1},
                {"jsonrpc": "2.0", "method": "echo", "params": ["ignored"]},
                {"jsonrpc": "2.0", "method": "add", "params": "bad", "id": 2},
                {"jsonrpc": "2.0", "method": "echo", "params": ["c"], "id": 3}
            ]))
            .await;

        let responses = outcome.batch().expect("batch outcome");
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0].result(), Some(&json!("a")));
        assert_eq!(
            responses[1].error_ref().and_then(|e| e.code()),
            Some(-32602)
        );
        assert_eq!(responses[2].id, Some(RequestId::Number(3)));
    }

    #[tokio::test]
    async fn test_batch_member_without_marker_is_rejected() {
        let outcome = dispatcher()
            .handle_value(json!([
                {"method": "echo", "params": ["a"], "id": 1},
                5
            ]))
            .await;

        let responses = outcome.batch().expect("batch outcome");
        assert_eq!(responses.len(), 2);
        for response in responses {
            assert_eq!(response.version, JsonRpcVersion::V2_0);
            assert_eq!(response.error_ref().and_then(|e| e.code()), Some(-32600));
        }
    }

    #[tokio::test]
    async fn test_all_notification_batch_produces_nothing() {
        let outcome = dispatcher()
            .handle_value(json!([
                {"jsonrpc": "2.0", "method": "echo", "params": ["a"]},
                {"jsonrpc": "2.0", "method": "nothing"}
            ]))
            .await;
        assert_eq!(outcome, DispatchOutcome::NoResponse);
    }

    #[tokio::test]
    async fn test_empty_array_is_invalid_request() {
        let response = single(&dispatcher(), json!([])).await;
        assert_eq!(response, json!({"result": null, "error": "Invalid Request", "id": null}));
    }

    #[tokio::test]
    async fn test_method_resolution_precedes_param_binding() {
        let response = single(
            &dispatcher(),
            json!({"jsonrpc": "2.0", "method": "unknown_method", "params": 5, "id": 1}),
        )
        .await;
        // `unknown_method` is not registered, so binding never runs
        assert_eq!(response["error"]["code"], json!(-32601));
    }

    #[tokio::test]
    async fn test_function_handler() {
        let mut dispatcher: JsonRpcDispatcher = JsonRpcDispatcher::new();
        dispatcher.register_fn("double", |args| {
            async move {
                let n: i64 = args.require("n", 0)?;
                Ok::<_, JsonRpcErrorObject>(json!(n * 2))
            }
            .boxed()
        });

        let response = dispatcher
            .handle_request(JsonRpcRequest::new(
                JsonRpcVersion::V2_0,
                "double",
                Some(vec![json!(21)].into()),
                Some(RequestId::Number(1)),
            ))
            .await
            .unwrap();
        assert_eq!(response.result(), Some(&json!(42)));
    }
}
