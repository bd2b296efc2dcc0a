//! Request id minting

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use rpcwire_json_rpc_server::RequestId;
use uuid::Uuid;

use crate::config::IdStrategy;
use crate::error::{JsonRpcClientError, JsonRpcClientResult};

/// Last timestamp handed out as a unique token, shared by the whole process
static LAST_UNIQUE_MICROS: AtomicI64 = AtomicI64::new(0);

/// Mints request ids according to an [`IdStrategy`].
///
/// Time ids are strictly increasing per generator. Any id the caller reports
/// as already in use is discarded and minted again.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last_time_micros: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next id. Fails with `InvalidRequest` for an unrecognized
    /// strategy; this is the only point where the strategy is checked.
    pub fn next_id<F>(&mut self, strategy: &IdStrategy, in_use: F) -> JsonRpcClientResult<RequestId>
    where
        F: Fn(&RequestId) -> bool,
    {
        loop {
            let id = self.mint(strategy)?;
            if !in_use(&id) {
                return Ok(id);
            }
        }
    }

    fn mint(&mut self, strategy: &IdStrategy) -> JsonRpcClientResult<RequestId> {
        match strategy {
            IdStrategy::Random => Ok(RequestId::Number(i64::from(rand::random::<u32>() >> 1))),
            IdStrategy::Time => Ok(RequestId::String(self.next_time().to_string())),
            IdStrategy::Uuid => Ok(RequestId::String(Uuid::new_v4().to_string())),
            IdStrategy::Unique => Ok(RequestId::String(unique_token())),
            IdStrategy::Unrecognized(value) => Err(JsonRpcClientError::invalid_request(format!(
                "Invalid id strategy: {}",
                value
            ))),
        }
    }

    fn next_time(&mut self) -> i64 {
        let now = Utc::now().timestamp_micros();
        self.last_time_micros = now.max(self.last_time_micros + 1);
        self.last_time_micros
    }
}

fn unique_token() -> String {
    let now = Utc::now().timestamp_micros();
    let previous = LAST_UNIQUE_MICROS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(now.max(last + 1))
        })
        .unwrap_or(now);
    let micros = now.max(previous + 1);
    format!("{:08x}{:05x}", micros / 1_000_000, micros % 1_000_000)
}
