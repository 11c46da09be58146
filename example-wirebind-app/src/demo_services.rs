mod account;
mod notify_session;
mod user;

pub use account::DemoAccount;
pub use notify_session::DemoNotifySession;
pub use user::DemoUsers;
