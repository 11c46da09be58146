use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wirebind::{
    CallContext, GenericClient, HandlerError, Protocol, RegistrationError, RpcError, notify_method,
};

wirebind::protocol_methods! {
    pub mod names = "keybase.1.NotifySession" {
        LOGGED_OUT => "loggedOut",
        LOGGED_IN => "loggedIn",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggedOutArg {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggedInArg {
    pub username: String,
}

/// Session change notifications. Nothing is sent back to the notifier.
#[async_trait::async_trait]
pub trait NotifySessionInterface: Send + Sync + 'static {
    async fn logged_out(&self, ctx: CallContext) -> Result<(), HandlerError>;

    async fn logged_in(&self, ctx: CallContext, username: String) -> Result<(), HandlerError>;
}

pub fn notify_session_protocol<I>(service: Arc<I>) -> Result<Protocol, RegistrationError>
where
    I: NotifySessionInterface + ?Sized,
{
    let logged_out = service.clone();
    let logged_in = service;

    Protocol::builder(names::PROTOCOL)
        .notify(names::LOGGED_OUT, move |ctx, _arg: LoggedOutArg| {
            let service = logged_out.clone();
            async move { service.logged_out(ctx).await }
        })
        .notify(names::LOGGED_IN, move |ctx, arg: LoggedInArg| {
            let service = logged_in.clone();
            async move { service.logged_in(ctx, arg.username).await }
        })
        .build()
}

/// Typed stubs for `keybase.1.NotifySession`. Each returns once the
/// notification is queued.
#[derive(Debug, Clone)]
pub struct NotifySessionClient<C> {
    cli: C,
}

impl<C> NotifySessionClient<C>
where
    C: GenericClient,
{
    pub fn new(cli: C) -> Self {
        Self { cli }
    }

    pub async fn logged_out(&self, ctx: &CallContext) -> Result<(), RpcError> {
        notify_method(&self.cli, ctx, names::qualified::LOGGED_OUT, &LoggedOutArg {}).await
    }

    pub async fn logged_in(
        &self,
        ctx: &CallContext,
        username: impl Into<String>,
    ) -> Result<(), RpcError> {
        let arg = LoggedInArg {
            username: username.into(),
        };
        notify_method(&self.cli, ctx, names::qualified::LOGGED_IN, &arg).await
    }
}
