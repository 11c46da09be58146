use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::sync::atomic::{AtomicU64, Ordering};
use wirebind::RpcError;

#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum FrameKind {
    Call = 0,
    Response = 1,
    Notify = 2,
    Cancel = 3,
}

impl FrameKind {
    pub const ALL: [FrameKind; 4] = [
        FrameKind::Call,
        FrameKind::Response,
        FrameKind::Notify,
        FrameKind::Cancel,
    ];
}

/// One message on the loopback connection.
///
/// Frames are moved between tasks as values; there is no byte encoding.
/// `seq` correlates a `Call` with its `Response` and with any `Cancel`.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Call {
        seq: u32,
        method: String,
        args: Vec<u8>,
    },
    Response {
        seq: u32,
        result: Result<Vec<u8>, RpcError>,
    },
    Notify {
        method: String,
        args: Vec<u8>,
    },
    Cancel {
        seq: u32,
    },
}

impl Frame {
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Call { .. } => FrameKind::Call,
            Frame::Response { .. } => FrameKind::Response,
            Frame::Notify { .. } => FrameKind::Notify,
            Frame::Cancel { .. } => FrameKind::Cancel,
        }
    }
}

/// Per-kind counts of frames sent on one connection, in both directions.
#[derive(Debug, Default)]
pub struct FrameStats {
    sent: [AtomicU64; FrameKind::ALL.len()],
}

impl FrameStats {
    pub(crate) fn record(&self, kind: FrameKind) {
        self.sent[u8::from(kind) as usize].fetch_add(1, Ordering::Relaxed);
    }

    pub fn sent(&self, kind: FrameKind) -> u64 {
        self.sent[u8::from(kind) as usize].load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        FrameKind::ALL.iter().map(|&kind| self.sent(kind)).sum()
    }
}
