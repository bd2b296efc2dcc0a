//! # Session Loopback Demo
//!
//! Runs a JSON-RPC client against an in-process server and logs every
//! exchange, so the wire format of either protocol version can be inspected.
//!
//! ## Usage
//! ```bash
//! # 1.0, one request per exchange
//! cargo run --package session-loopback
//!
//! # 2.0 with named parameters, all calls in one batch
//! cargo run --package session-loopback -- --protocol 2 --batch
//!
//! # show the raw exchanges
//! RUST_LOG=debug cargo run --package session-loopback -- --protocol 2
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use clap::Parser;
use parking_lot::Mutex;
use rpcwire_json_rpc_client::{
    CallOutcome, ClientConfig, JsonRpcClient, JsonRpcVersion, LoopbackTransport, RpcResponse,
};
use rpcwire_json_rpc_server::{
    CallArgs, JsonRpcDispatcher, JsonRpcErrorObject, JsonRpcHandler, ServerOptions,
};
use serde_json::{Value, json};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Protocol version spoken by the client (1 or 2)
    #[arg(short, long, default_value = "1")]
    protocol: u8,

    /// Queue every call and send them as one batch (2.0 only)
    #[arg(short, long, default_value = "false")]
    batch: bool,

    /// Report 1.0 errors as structured objects instead of bare messages
    #[arg(long, default_value = "false")]
    structured_errors: bool,
}

/// A named counter store
#[derive(Default)]
struct Counters {
    values: Mutex<HashMap<String, i64>>,
}

#[async_trait]
impl JsonRpcHandler for Counters {
    type Error = JsonRpcErrorObject;

    async fn handle(&self, method: &str, args: CallArgs) -> Result<Value, Self::Error> {
        let name: String = args.require("name", 0)?;
        let mut values = self.values.lock();

        match method {
            "increment" => {
                let by: i64 = args.param_as("by", 1)?.unwrap_or(1);
                let value = values.entry(name).or_insert(0);
                *value += by;
                Ok(json!(*value))
            }
            "read" => values
                .get(&name)
                .map(|value| json!(value))
                .ok_or_else(|| {
                    JsonRpcErrorObject::application(404, "Unknown counter", Some(json!(name)))
                }),
            _ => Err(JsonRpcErrorObject::method_not_found()),
        }
    }

    fn supported_methods(&self) -> Vec<String> {
        vec!["increment".to_string(), "read".to_string()]
    }
}

fn report(label: &str, response: &RpcResponse) {
    if response.success {
        info!(call = label, id = %response.id, result = ?response.result(), "ok");
    } else {
        warn!(
            call = label,
            id = %response.id,
            code = ?response.code(),
            message = ?response.message(),
            "failed"
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let version = match args.protocol {
        1 => JsonRpcVersion::V1_0,
        2 => JsonRpcVersion::V2_0,
        other => return Err(anyhow!("unsupported protocol version: {}", other)),
    };

    let mut dispatcher: JsonRpcDispatcher =
        JsonRpcDispatcher::new().with_options(
            ServerOptions::new().with_v1_structured_errors(args.structured_errors),
        );
    dispatcher.register_handler(Counters::default());

    let transport = LoopbackTransport::new(Arc::new(dispatcher));
    let exchanges = transport.exchanges();

    let config = ClientConfig::new()
        .with_version(version)
        .with_batch(args.batch)
        .with_notification("increment")
        .with_named_params("read");
    let mut client = JsonRpcClient::new(transport, config);

    info!(version = %version, batch = client.config().batching(), "starting demo");

    // `read` takes named parameters under 2.0
    let read_params = |name: &str| {
        if version.is_v2() {
            json!([{ "name": name }])
        } else {
            json!([name])
        }
    };

    client.call("increment", json!(["visits"])).await?;
    client.call("increment", json!(["visits", 4])).await?;
    let calls = [
        ("read visits", client.call("read", read_params("visits")).await?),
        ("read missing", client.call("read", read_params("missing")).await?),
        ("unknown", client.call("reset", json!(["visits"])).await?),
    ];

    if client.config().batching() {
        let responses = client
            .call("send", json!([]))
            .await?
            .into_responses();
        for response in &responses {
            report("batched", response);
        }
    } else {
        for (label, outcome) in &calls {
            match outcome {
                CallOutcome::Response(response) => report(label, response),
                other => info!(call = label, outcome = ?other, "no response"),
            }
        }
    }

    let exchanges = exchanges.lock();
    let last = exchanges.last().context("no exchanges were made")?;
    info!(
        exchanges = exchanges.len(),
        last_request = %last.request,
        last_response = %last.response,
        "done"
    );

    Ok(())
}
