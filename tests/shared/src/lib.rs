//! Shared end-to-end testing utilities
//!
//! A small session service used as the served method set, plus the
//! client's in-process loopback transport.

pub mod session;

pub use rpcwire_json_rpc_client::{Exchange, LoopbackTransport};
pub use session::{SessionError, SessionService, session_dispatcher};

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
