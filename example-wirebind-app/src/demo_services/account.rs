use example_wirebind_service_definition::AccountInterface;
use example_wirebind_service_definition::account::{
    EmailChangeArg, GetPassphraseRes, HasServerKeysRes, PassphraseChangeArg, PassphrasePromptArg,
    PassphraseType,
};
use std::sync::Mutex;
use wirebind::{CallContext, HandlerError, SessionId};

const BAD_PASSPHRASE: i32 = 100;
const BAD_EMAIL: i32 = 101;

#[derive(Debug)]
struct AccountState {
    username: String,
    email: String,
    passphrase: String,
    has_server_keys: bool,
}

/// In-memory account for a single, always logged-in user.
#[derive(Debug)]
pub struct DemoAccount {
    state: Mutex<AccountState>,
}

impl DemoAccount {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(AccountState {
                username: username.into(),
                email: email.into(),
                passphrase: "hunter2".into(),
                has_server_keys: true,
            }),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut AccountState) -> T) -> T {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut state)
    }
}

#[async_trait::async_trait]
impl AccountInterface for DemoAccount {
    async fn passphrase_change(
        &self,
        _ctx: CallContext,
        arg: PassphraseChangeArg,
    ) -> Result<(), HandlerError> {
        self.with_state(|state| {
            if !arg.force && arg.old_passphrase != state.passphrase {
                return Err(HandlerError::with_code(BAD_PASSPHRASE, "old passphrase is wrong"));
            }
            state.passphrase = arg.passphrase;
            Ok(())
        })?;

        tracing::info!(session_id = %arg.session_id, force = arg.force, "passphrase changed");
        Ok(())
    }

    async fn passphrase_prompt(
        &self,
        _ctx: CallContext,
        arg: PassphrasePromptArg,
    ) -> Result<GetPassphraseRes, HandlerError> {
        tracing::info!(
            session_id = %arg.session_id,
            prompt = %arg.gui_arg.prompt,
            "answering passphrase prompt"
        );

        let passphrase = self.with_state(|state| state.passphrase.clone());
        Ok(GetPassphraseRes {
            passphrase,
            store_secret: arg.gui_arg.passphrase_type == PassphraseType::PassPhrase,
        })
    }

    async fn email_change(
        &self,
        _ctx: CallContext,
        arg: EmailChangeArg,
    ) -> Result<(), HandlerError> {
        if !arg.new_email.contains('@') {
            return Err(HandlerError::with_code(
                BAD_EMAIL,
                format!("{:?} is not an email address", arg.new_email),
            ));
        }

        let username = self.with_state(|state| {
            state.email = arg.new_email.clone();
            state.username.clone()
        });

        tracing::info!(session_id = %arg.session_id, %username, "email changed");
        Ok(())
    }

    async fn has_server_keys(
        &self,
        _ctx: CallContext,
        session_id: SessionId,
    ) -> Result<HasServerKeysRes, HandlerError> {
        tracing::debug!(%session_id, "checking server keys");

        Ok(HasServerKeysRes {
            has_server_keys: self.with_state(|state| state.has_server_keys),
        })
    }

    async fn reset_account(
        &self,
        _ctx: CallContext,
        session_id: SessionId,
    ) -> Result<(), HandlerError> {
        self.with_state(|state| state.has_server_keys = false);

        tracing::warn!(%session_id, "account reset");
        Ok(())
    }
}
