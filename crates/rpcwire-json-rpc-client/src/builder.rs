//! Turns a method call into a wire request

use rpcwire_json_rpc_server::{JsonRpcRequest, RequestId, RequestParams};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{JsonRpcClientError, JsonRpcClientResult};
use crate::id::IdGenerator;

/// A request ready to send or queue
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRequest {
    pub request: JsonRpcRequest,
    pub notification: bool,
}

/// Render a method name. Only scalars name a method.
pub fn method_name(method: &Value) -> JsonRpcClientResult<String> {
    match method {
        Value::String(name) => Ok(name.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        _ => Err(JsonRpcClientError::invalid_request(
            "Method name has no scalar value",
        )),
    }
}

/// Call arguments must arrive as an ordered sequence
pub fn positional_params(params: Value) -> JsonRpcClientResult<Vec<Value>> {
    match params {
        Value::Array(values) => Ok(values),
        _ => Err(JsonRpcClientError::invalid_params(
            "Parameters must be an array",
        )),
    }
}

/// Build the request for one call under `config`.
///
/// `in_use` reports ids that must not be minted again (ids already queued in
/// the current batch). The id strategy is consulted only when the call is not
/// a notification.
pub fn build_request<F>(
    config: &ClientConfig,
    ids: &mut IdGenerator,
    method: &str,
    params: Vec<Value>,
    in_use: F,
) -> JsonRpcClientResult<BuiltRequest>
where
    F: Fn(&RequestId) -> bool,
{
    let params = if config.uses_named_params(method) {
        match params.into_iter().next() {
            Some(Value::Object(map)) => RequestParams::Object(map),
            _ => {
                return Err(JsonRpcClientError::invalid_params(format!(
                    "Named parameters expected in '{}'",
                    method
                )));
            }
        }
    } else {
        RequestParams::Array(params)
    };

    // 1.0 always carries params, 2.0 omits them when empty
    let params = if config.version.is_v2() && params.is_empty() {
        None
    } else {
        Some(params)
    };

    let notification = config.is_notification(method);
    let id = if notification {
        None
    } else {
        Some(ids.next_id(&config.id_strategy, in_use)?)
    };

    Ok(BuiltRequest {
        request: JsonRpcRequest::new(config.version, method, params, id),
        notification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdStrategy;
    use serde_json::json;

    fn build(config: &ClientConfig, method: &str, params: Value) -> JsonRpcClientResult<Value> {
        let mut ids = IdGenerator::new();
        let built = build_request(config, &mut ids, method, positional_params(params)?, |_| false)?;
        Ok(serde_json::to_value(&built.request).unwrap())
    }

    #[test]
    fn test_method_must_be_scalar() {
        assert_eq!(method_name(&json!("echo")).unwrap(), "echo");
        assert_eq!(method_name(&json!(7)).unwrap(), "7");

        let err = method_name(&json!(["echo"])).unwrap_err();
        assert_eq!(err.code(), Some(-32600));
        assert!(method_name(&Value::Null).is_err());
    }

    #[test]
    fn test_params_must_be_sequence() {
        let err = positional_params(json!({"a": 1})).unwrap_err();
        assert_eq!(err.code(), Some(-32602));
    }

    #[test]
    fn test_v1_request_shape() {
        let request = build(&ClientConfig::new(), "ping", json!([])).unwrap();
        let object = request.as_object().unwrap();

        assert!(!object.contains_key("jsonrpc"));
        assert_eq!(request["params"], json!([]));
        assert!(request["id"].is_string());
    }

    #[test]
    fn test_v1_notification_has_null_id() {
        let config = ClientConfig::new().with_notification("keepalive");
        let request = build(&config, "keepalive", json!(["sid"])).unwrap();

        assert_eq!(
            request,
            json!({"method": "keepalive", "params": ["sid"], "id": null})
        );
    }

    #[test]
    fn test_v2_request_shape() {
        let config = ClientConfig::v2().with_id_strategy(IdStrategy::Random);
        let request = build(&config, "ping", json!([])).unwrap();
        let object = request.as_object().unwrap();

        assert_eq!(request["jsonrpc"], json!("2.0"));
        assert!(!object.contains_key("params"));
        assert!(request["id"].is_i64());
    }

    #[test]
    fn test_v2_notification_has_no_id() {
        let config = ClientConfig::v2().with_notify(true);
        let request = build(&config, "keepalive", json!(["sid"])).unwrap();

        assert_eq!(
            request,
            json!({"jsonrpc": "2.0", "method": "keepalive", "params": ["sid"]})
        );
    }

    #[test]
    fn test_named_params_take_first_mapping() {
        let config = ClientConfig::v2().with_named_params("add");
        let request = build(&config, "add", json!([{"a": 1, "b": 2}])).unwrap();
        assert_eq!(request["params"], json!({"a": 1, "b": 2}));

        let err = build(&config, "add", json!([1, 2])).unwrap_err();
        assert_eq!(err.code(), Some(-32602));
    }

    #[test]
    fn test_notification_skips_id_strategy() {
        let config = ClientConfig::v2()
            .with_id_strategy(IdStrategy::Unrecognized(json!("bogus")))
            .with_notification("keepalive");

        assert!(build(&config, "keepalive", json!([])).is_ok());
        let err = build(&config, "echo", json!([])).unwrap_err();
        assert_eq!(err.code(), Some(-32600));
    }
}
