//! Configuration types for the JSON-RPC client

use rpcwire_json_rpc_server::JsonRpcVersion;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Policy for minting request ids
#[derive(Debug, Clone, PartialEq, Default)]
pub enum IdStrategy {
    /// A uniformly distributed non-negative integer
    Random,
    /// The current time in microseconds, rendered as a digit string
    #[default]
    Time,
    /// A random version 4 UUID
    Uuid,
    /// A process-unique opaque token
    Unique,
    /// Any value that names no strategy. Accepted at configuration time and
    /// rejected with `InvalidRequest` the first time an id is needed.
    Unrecognized(Value),
}

impl IdStrategy {
    /// Interpret a configured value: a strategy name, or one of the numeric
    /// codes 0 (random), 1 (time), 2 (uuid), 3 (unique).
    pub fn from_value(value: Value) -> Self {
        let known = match &value {
            Value::String(name) => match name.to_ascii_lowercase().as_str() {
                "random" | "rand" => Some(IdStrategy::Random),
                "time" => Some(IdStrategy::Time),
                "uuid" => Some(IdStrategy::Uuid),
                "unique" | "uniq" => Some(IdStrategy::Unique),
                _ => None,
            },
            Value::Number(code) => match code.as_u64() {
                Some(0) => Some(IdStrategy::Random),
                Some(1) => Some(IdStrategy::Time),
                Some(2) => Some(IdStrategy::Uuid),
                Some(3) => Some(IdStrategy::Unique),
                _ => None,
            },
            _ => None,
        };
        known.unwrap_or(IdStrategy::Unrecognized(value))
    }

    pub fn name(&self) -> Option<&'static str> {
        match self {
            IdStrategy::Random => Some("random"),
            IdStrategy::Time => Some("time"),
            IdStrategy::Uuid => Some("uuid"),
            IdStrategy::Unique => Some("unique"),
            IdStrategy::Unrecognized(_) => None,
        }
    }
}

impl Serialize for IdStrategy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            IdStrategy::Unrecognized(value) => value.serialize(serializer),
            known => serializer.serialize_str(known.name().unwrap_or_default()),
        }
    }
}

impl<'de> Deserialize<'de> for IdStrategy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(IdStrategy::from_value)
    }
}

/// Client configuration.
///
/// Every build and flush reads the configuration as it is at that moment, so
/// changes made through [`JsonRpcClient::config_mut`](crate::JsonRpcClient::config_mut)
/// apply from the next call on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Protocol version used for every request
    pub version: JsonRpcVersion,

    /// Queue calls instead of sending them (2.0 only)
    pub batch: bool,

    /// Calling this method name while batching flushes the queue
    pub batch_method: String,

    /// How request ids are minted
    pub id_strategy: IdStrategy,

    /// Send every call as a notification
    pub notify: bool,

    /// Methods always sent as notifications
    pub notifications: Vec<String>,

    /// Methods whose single mapping argument is sent as named parameters (2.0 only)
    pub named_params: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: JsonRpcVersion::V1_0,
            batch: false,
            batch_method: "send".to_string(),
            id_strategy: IdStrategy::Time,
            notify: false,
            notifications: Vec::new(),
            named_params: Vec::new(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a 2.0 configuration
    pub fn v2() -> Self {
        Self::default().with_version(JsonRpcVersion::V2_0)
    }

    pub fn with_version(mut self, version: JsonRpcVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_batch_method(mut self, method: impl Into<String>) -> Self {
        self.batch_method = method.into();
        self
    }

    pub fn with_id_strategy(mut self, strategy: IdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    pub fn with_notification(mut self, method: impl Into<String>) -> Self {
        self.notifications.push(method.into());
        self
    }

    pub fn with_named_params(mut self, method: impl Into<String>) -> Self {
        self.named_params.push(method.into());
        self
    }

    /// Batching only takes effect under 2.0
    pub fn batching(&self) -> bool {
        self.version.is_v2() && self.batch
    }

    /// Whether a call to `method` is sent without an id
    pub fn is_notification(&self, method: &str) -> bool {
        self.notify || self.notifications.iter().any(|m| m == method)
    }

    /// Whether `method` takes named parameters (only meaningful under 2.0)
    pub fn uses_named_params(&self, method: &str) -> bool {
        self.version.is_v2() && self.named_params.iter().any(|m| m == method)
    }
}
