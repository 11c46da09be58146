#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use wirebind::protocol::encode_result;
use wirebind::{
    CallContext, Dispatcher, GenericClient, HandlerError, Protocol, RegistrationError, RpcError,
};

pub const ACCT_PROTOCOL: &str = "acct.1";
pub const HAS_SERVER_KEYS: &str = "acct.1.hasServerKeys";
pub const LOGGED_OUT: &str = "acct.1.loggedOut";
pub const FAIL: &str = "acct.1.fail";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HasServerKeysArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HasServerKeysRes {
    #[serde(rename = "hasServerKeys")]
    pub has_server_keys: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggedOutArg {}

/// Records what the `acct.1` handlers were called with.
#[derive(Debug, Default)]
pub struct Recorder {
    pub session_ids: Mutex<Vec<i32>>,
    pub logouts: Mutex<usize>,
}

impl Recorder {
    pub fn session_ids(&self) -> Vec<i32> {
        self.session_ids.lock().unwrap().clone()
    }

    pub fn logouts(&self) -> usize {
        *self.logouts.lock().unwrap()
    }
}

/// `acct.1` with `hasServerKeys` (call), `loggedOut` (notify) and `fail`
/// (call that always returns a handler error).
pub fn acct_protocol(recorder: Arc<Recorder>) -> Result<Protocol, RegistrationError> {
    let on_call = recorder.clone();
    let on_notify = recorder;

    Protocol::builder(ACCT_PROTOCOL)
        .call("hasServerKeys", move |_ctx, arg: HasServerKeysArg| {
            let recorder = on_call.clone();
            async move {
                recorder.session_ids.lock().unwrap().push(arg.session_id);
                Ok(HasServerKeysRes {
                    has_server_keys: true,
                })
            }
        })
        .notify("loggedOut", move |_ctx, _arg: LoggedOutArg| {
            let recorder = on_notify.clone();
            async move {
                *recorder.logouts.lock().unwrap() += 1;
                Ok(())
            }
        })
        .call("fail", |_ctx, arg: HasServerKeysArg| async move {
            Err::<HasServerKeysRes, _>(HandlerError::with_code(
                218,
                format!("session {} is not logged in", arg.session_id),
            ))
        })
        .build()
}

/// In-process client that hands every call straight to a dispatcher.
pub struct DirectClient {
    pub dispatcher: Arc<Dispatcher>,
}

#[async_trait::async_trait]
impl GenericClient for DirectClient {
    async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        args: Vec<u8>,
    ) -> Result<Vec<u8>, RpcError> {
        match self.dispatcher.dispatch(ctx.clone(), method, &args).await? {
            Some(bytes) => Ok(bytes),
            None => encode_result(&()).map_err(|err| RpcError::transport(err.to_string())),
        }
    }

    async fn notify(&self, ctx: &CallContext, method: &str, args: Vec<u8>) -> Result<(), RpcError> {
        self.dispatcher.dispatch(ctx.clone(), method, &args).await?;
        Ok(())
    }
}
