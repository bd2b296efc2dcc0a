use serde::{Deserialize, Serialize};

/// Per-server behaviour switches for JSON-RPC 1.0 peers.
///
/// 2.0 requests always get structured errors and always accept named
/// parameters; these options extend the same treatment to 1.0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerOptions {
    /// Emit `{code, message, data}` error objects for 1.0 requests instead of
    /// the bare message string.
    pub v1_structured_errors: bool,

    /// Accept named (object) parameters on 1.0 requests.
    pub v1_named_params: bool,
}

impl ServerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_v1_structured_errors(mut self, enabled: bool) -> Self {
        self.v1_structured_errors = enabled;
        self
    }

    pub fn with_v1_named_params(mut self, enabled: bool) -> Self {
        self.v1_named_params = enabled;
        self
    }
}
