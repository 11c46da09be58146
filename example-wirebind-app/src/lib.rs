pub mod demo_services;

use demo_services::{DemoAccount, DemoNotifySession, DemoUsers};
use example_wirebind_service_definition::{
    account_protocol, notify_session_protocol, user_protocol,
};
use std::sync::Arc;
use wirebind::{Dispatcher, RegistrationError};

/// A dispatcher serving the account, user and session-notification
/// protocols with in-memory demo implementations.
pub fn demo_dispatcher() -> Result<Dispatcher, RegistrationError> {
    Dispatcher::new()
        .with_protocol(account_protocol(Arc::new(DemoAccount::new("max", "max@example.com")))?)?
        .with_protocol(user_protocol(Arc::new(DemoUsers::sample()))?)?
        .with_protocol(notify_session_protocol(Arc::new(DemoNotifySession::default()))?)
}
