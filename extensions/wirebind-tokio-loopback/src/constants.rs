/// Frames buffered in each direction before senders wait.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;
