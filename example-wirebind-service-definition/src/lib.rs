pub mod account;
pub mod notify_session;
pub mod user;

pub use account::{AccountClient, AccountInterface, account_protocol};
pub use notify_session::{NotifySessionClient, NotifySessionInterface, notify_session_protocol};
pub use user::{UserClient, UserInterface, user_protocol};
