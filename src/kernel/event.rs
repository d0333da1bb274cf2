use super::time::EpochSecond;
use crate::decoder::job::JobId;

/// Everything the event loop feeds into the reactor.
#[derive(Debug, Clone)]
pub enum Event {
    /// Trigger poll, every `TICK_MS`.
    Tick(EpochSecond),
    /// Raw native-rate PCM from the feed, in arrival order.
    Datagram(Vec<u8>),

    // Decode job lifecycle, reported by the driver
    FileWritten(JobId),
    ProcessLaunched(JobId),
    JobAbandoned { job: JobId, reason: String },
    DecoderOutput {
        job: JobId,
        chunk: String,
        received_at: EpochSecond,
    },
    DecoderExited { job: JobId, exit: DecoderExit },
    Cleaned { job: JobId, outcome: CleanupOutcome },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderExit {
    Code(i32),
    /// Killed by a signal or otherwise without an exit code.
    Abnormal,
}

impl DecoderExit {
    pub fn is_clean(&self) -> bool {
        matches!(self, DecoderExit::Code(0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupOutcome {
    Deleted,
    /// `keepwav` sentinel present.
    Kept,
    RemoveFailed,
}
