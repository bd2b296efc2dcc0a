//! A session store served over JSON-RPC.
//!
//! Every method reads its parameters with [`CallArgs::param`], so the same
//! implementation answers positional 1.0 calls and named 2.0 calls.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rpcwire_json_rpc_server::{
    CallArgs, JsonRpcDispatcher, JsonRpcErrorObject, JsonRpcHandler, ServerOptions,
    ToJsonRpcError,
};
use serde_json::{Map, Value, json};
use uuid::Uuid;

pub const INVALID_SID: i64 = 1000;
pub const INVALID_KEY: i64 = 1001;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid params")]
    InvalidParams,
    #[error("Invalid session id")]
    InvalidSid,
    #[error("Invalid key")]
    InvalidKey,
    #[error("Unknown method: {0}")]
    UnknownMethod(String),
}

impl ToJsonRpcError for SessionError {
    fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            SessionError::InvalidParams => JsonRpcErrorObject::invalid_params(),
            SessionError::InvalidSid => {
                JsonRpcErrorObject::application(INVALID_SID, self.to_string(), None)
            }
            SessionError::InvalidKey => {
                JsonRpcErrorObject::application(INVALID_KEY, self.to_string(), None)
            }
            SessionError::UnknownMethod(_) => JsonRpcErrorObject::method_not_found(),
        }
    }
}

type Session = Map<String, Value>;

#[derive(Default)]
pub struct SessionService {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionService {
    pub fn new() -> Self {
        Self::default()
    }

    fn session_id(args: &CallArgs) -> Result<String, SessionError> {
        match args.param("sid", 0) {
            Some(Value::String(sid)) => Ok(sid.clone()),
            _ => Err(SessionError::InvalidParams),
        }
    }

    fn start_session(&self) -> Value {
        let sid = Uuid::new_v4().simple().to_string();
        let mut session = Session::new();
        session.insert("sid".to_string(), json!(sid));
        session.insert("started".to_string(), json!(Utc::now().timestamp_micros()));

        self.sessions.lock().insert(sid, session.clone());
        Value::Object(session)
    }

    fn get_session_data(&self, args: &CallArgs) -> Result<Value, SessionError> {
        let sid = Self::session_id(args)?;
        let sessions = self.sessions.lock();
        let session = sessions.get(&sid).ok_or(SessionError::InvalidSid)?;

        match args.param("key", 1) {
            Some(Value::String(key)) => session.get(key).cloned().ok_or(SessionError::InvalidKey),
            Some(_) => Err(SessionError::InvalidKey),
            None => Ok(Value::Object(session.clone())),
        }
    }

    fn set_session_data(&self, args: &CallArgs) -> Result<Value, SessionError> {
        let sid = Self::session_id(args)?;
        let mut sessions = self.sessions.lock();
        let session = sessions.get_mut(&sid).ok_or(SessionError::InvalidSid)?;

        match (args.param("key", 1), args.param("value", 2)) {
            (Some(Value::String(key)), Some(value)) => {
                session.insert(key.clone(), value.clone());
                Ok(Value::Bool(true))
            }
            _ => Err(SessionError::InvalidParams),
        }
    }

    fn keepalive(&self, args: &CallArgs) -> Result<Value, SessionError> {
        let sid = Self::session_id(args)?;
        let mut sessions = self.sessions.lock();
        let session = sessions.get_mut(&sid).ok_or(SessionError::InvalidSid)?;

        let count = session.get("keepalive").and_then(Value::as_i64).unwrap_or(0);
        session.insert("keepalive".to_string(), json!(count + 1));
        Ok(Value::Null)
    }

    fn end_session(&self, args: &CallArgs) -> Result<Value, SessionError> {
        let sid = Self::session_id(args)?;
        let mut session = self
            .sessions
            .lock()
            .remove(&sid)
            .ok_or(SessionError::InvalidSid)?;

        let started = session.get("started").and_then(Value::as_i64).unwrap_or(0);
        let finished = Utc::now().timestamp_micros().max(started + 1);
        session.insert("finished".to_string(), json!(finished));
        Ok(Value::Object(session))
    }
}

#[async_trait]
impl JsonRpcHandler for SessionService {
    type Error = SessionError;

    async fn handle(&self, method: &str, args: CallArgs) -> Result<Value, Self::Error> {
        match method {
            "start_session" => Ok(self.start_session()),
            "get_session_data" => self.get_session_data(&args),
            "set_session_data" => self.set_session_data(&args),
            "keepalive" => self.keepalive(&args),
            "end_session" => self.end_session(&args),
            other => Err(SessionError::UnknownMethod(other.to_string())),
        }
    }

    fn supported_methods(&self) -> Vec<String> {
        [
            "start_session",
            "get_session_data",
            "set_session_data",
            "keepalive",
            "end_session",
        ]
        .iter()
        .map(|method| method.to_string())
        .collect()
    }
}

/// A dispatcher serving a fresh [`SessionService`]
pub fn session_dispatcher(options: ServerOptions) -> JsonRpcDispatcher<SessionError> {
    let mut dispatcher = JsonRpcDispatcher::new().with_options(options);
    dispatcher.register_handler(SessionService::new());
    dispatcher
}
