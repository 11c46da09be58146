use crate::constants::DEFAULT_CHANNEL_CAPACITY;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopbackConfig {
    /// Capacity of each direction's frame channel. Values below 1 are
    /// treated as 1.
    pub channel_capacity: usize,

    /// Applied to every outbound call on top of the caller's own context.
    /// `None` leaves calls bounded only by the caller's context.
    pub default_call_timeout: Option<Duration>,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            default_call_timeout: None,
        }
    }
}

impl LoopbackConfig {
    pub fn with_channel_capacity(mut self, channel_capacity: usize) -> Self {
        self.channel_capacity = channel_capacity;
        self
    }

    pub fn with_default_call_timeout(mut self, timeout: Duration) -> Self {
        self.default_call_timeout = Some(timeout);
        self
    }
}
