use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use wirebind::{
    CallContext, GenericClient, HandlerError, Protocol, RegistrationError, RpcError, SessionId,
    call_method,
};

wirebind::protocol_methods! {
    pub mod names = "keybase.1.account" {
        PASSPHRASE_CHANGE => "passphraseChange",
        PASSPHRASE_PROMPT => "passphrasePrompt",
        EMAIL_CHANGE => "emailChange",
        HAS_SERVER_KEYS => "hasServerKeys",
        RESET_ACCOUNT => "resetAccount",
    }
}

// --- Wire types ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HasServerKeysRes {
    #[serde(rename = "hasServerKeys")]
    pub has_server_keys: bool,
}

/// What the UI is being asked to collect.
#[repr(u8)]
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum PassphraseType {
    None = 0,
    PaperKey = 1,
    PassPhrase = 2,
    VerifyPassPhrase = 3,
}

/// Prompt shown by a UI when a passphrase is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuiEntryArg {
    #[serde(rename = "windowTitle")]
    pub window_title: String,
    pub prompt: String,
    pub username: String,
    #[serde(rename = "submitLabel")]
    pub submit_label: String,
    #[serde(rename = "cancelLabel")]
    pub cancel_label: String,
    #[serde(rename = "retryLabel")]
    pub retry_label: String,
    #[serde(rename = "type")]
    pub passphrase_type: PassphraseType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetPassphraseRes {
    pub passphrase: String,
    #[serde(rename = "storeSecret")]
    pub store_secret: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PassphraseChangeArg {
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    #[serde(rename = "oldPassphrase")]
    pub old_passphrase: String,
    pub passphrase: String,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PassphrasePromptArg {
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    #[serde(rename = "guiArg")]
    pub gui_arg: GuiEntryArg,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmailChangeArg {
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
    #[serde(rename = "newEmail")]
    pub new_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HasServerKeysArg {
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetAccountArg {
    #[serde(rename = "sessionID")]
    pub session_id: SessionId,
}

// --- Server side ---

/// Account management operations.
#[async_trait::async_trait]
pub trait AccountInterface: Send + Sync + 'static {
    /// Changes the passphrase from old to new. An empty old passphrase
    /// without `force` means the implementation should prompt for it; with
    /// `force` it attempts a forced change.
    async fn passphrase_change(
        &self,
        ctx: CallContext,
        arg: PassphraseChangeArg,
    ) -> Result<(), HandlerError>;

    async fn passphrase_prompt(
        &self,
        ctx: CallContext,
        arg: PassphrasePromptArg,
    ) -> Result<GetPassphraseRes, HandlerError>;

    /// Changes the account email by signing a statement.
    async fn email_change(&self, ctx: CallContext, arg: EmailChangeArg) -> Result<(), HandlerError>;

    /// Whether the logged-in user has uploaded private keys. Fails when
    /// nobody is logged in.
    async fn has_server_keys(
        &self,
        ctx: CallContext,
        session_id: SessionId,
    ) -> Result<HasServerKeysRes, HandlerError>;

    async fn reset_account(
        &self,
        ctx: CallContext,
        session_id: SessionId,
    ) -> Result<(), HandlerError>;
}

/// Binds every account method to `service`.
pub fn account_protocol<I>(service: Arc<I>) -> Result<Protocol, RegistrationError>
where
    I: AccountInterface + ?Sized,
{
    let passphrase_change = service.clone();
    let passphrase_prompt = service.clone();
    let email_change = service.clone();
    let has_server_keys = service.clone();
    let reset_account = service;

    Protocol::builder(names::PROTOCOL)
        .call(names::PASSPHRASE_CHANGE, move |ctx, arg: PassphraseChangeArg| {
            let service = passphrase_change.clone();
            async move { service.passphrase_change(ctx, arg).await }
        })
        .call(names::PASSPHRASE_PROMPT, move |ctx, arg: PassphrasePromptArg| {
            let service = passphrase_prompt.clone();
            async move { service.passphrase_prompt(ctx, arg).await }
        })
        .call(names::EMAIL_CHANGE, move |ctx, arg: EmailChangeArg| {
            let service = email_change.clone();
            async move { service.email_change(ctx, arg).await }
        })
        .call(names::HAS_SERVER_KEYS, move |ctx, arg: HasServerKeysArg| {
            let service = has_server_keys.clone();
            async move { service.has_server_keys(ctx, arg.session_id).await }
        })
        .call(names::RESET_ACCOUNT, move |ctx, arg: ResetAccountArg| {
            let service = reset_account.clone();
            async move { service.reset_account(ctx, arg.session_id).await }
        })
        .build()
}

// --- Client side ---

/// Typed stubs for `keybase.1.account`.
#[derive(Debug, Clone)]
pub struct AccountClient<C> {
    cli: C,
}

impl<C> AccountClient<C>
where
    C: GenericClient,
{
    pub fn new(cli: C) -> Self {
        Self { cli }
    }

    pub fn inner(&self) -> &C {
        &self.cli
    }

    pub async fn passphrase_change(
        &self,
        ctx: &CallContext,
        arg: PassphraseChangeArg,
    ) -> Result<(), RpcError> {
        call_method(&self.cli, ctx, names::qualified::PASSPHRASE_CHANGE, &arg).await
    }

    pub async fn passphrase_prompt(
        &self,
        ctx: &CallContext,
        arg: PassphrasePromptArg,
    ) -> Result<GetPassphraseRes, RpcError> {
        call_method(&self.cli, ctx, names::qualified::PASSPHRASE_PROMPT, &arg).await
    }

    pub async fn email_change(
        &self,
        ctx: &CallContext,
        arg: EmailChangeArg,
    ) -> Result<(), RpcError> {
        call_method(&self.cli, ctx, names::qualified::EMAIL_CHANGE, &arg).await
    }

    pub async fn has_server_keys(
        &self,
        ctx: &CallContext,
        session_id: SessionId,
    ) -> Result<HasServerKeysRes, RpcError> {
        let arg = HasServerKeysArg { session_id };
        call_method(&self.cli, ctx, names::qualified::HAS_SERVER_KEYS, &arg).await
    }

    pub async fn reset_account(
        &self,
        ctx: &CallContext,
        session_id: SessionId,
    ) -> Result<(), RpcError> {
        let arg = ResetAccountArg { session_id };
        call_method(&self.cli, ctx, names::qualified::RESET_ACCOUNT, &arg).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passphrase_type_travels_as_an_integer() {
        let bytes = rmp_serde::to_vec_named(&PassphraseType::PaperKey).unwrap();
        assert_eq!(rmp_serde::from_slice::<u8>(&bytes).unwrap(), 1);

        let bad = rmp_serde::to_vec_named(&9u8).unwrap();
        assert!(rmp_serde::from_slice::<PassphraseType>(&bad).is_err());
    }

    #[test]
    fn qualified_names_use_the_account_namespace() {
        assert_eq!(
            names::qualified::HAS_SERVER_KEYS,
            "keybase.1.account.hasServerKeys"
        );
        assert_eq!(names::qualified::RESET_ACCOUNT, "keybase.1.account.resetAccount");
    }
}
