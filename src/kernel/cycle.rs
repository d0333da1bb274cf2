use tracing::debug;

use super::time::EpochSecond;

/// 14.4 s of 16-bit samples at 48 kHz.
pub const CAPTURE_THRESHOLD_BYTES: usize = 1_382_400;

/// Raw native-rate bytes handed over when a cycle fills up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledBuffer {
    pub start: EpochSecond,
    pub bytes: Vec<u8>,
}

/// The single acquisition slot.
///
/// Opened by [`RecordingCycle::on_tick`] at a cycle boundary, filled by
/// [`RecordingCycle::on_datagram`], and closed in the same call that crosses
/// the capture threshold. The buffer is always empty when the cycle opens.
#[derive(Debug, Clone)]
pub struct RecordingCycle {
    window_start: EpochSecond,
    is_open: bool,
    audio: Vec<u8>,
    threshold: usize,
}

impl Default for RecordingCycle {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingCycle {
    pub fn new() -> Self {
        Self::with_threshold(CAPTURE_THRESHOLD_BYTES)
    }

    pub fn with_threshold(threshold: usize) -> Self {
        Self {
            window_start: EpochSecond(0),
            is_open: false,
            audio: Vec::new(),
            threshold,
        }
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn window_start(&self) -> EpochSecond {
        self.window_start
    }

    pub fn buffered(&self) -> usize {
        self.audio.len()
    }

    /// Clock/trigger step. Returns true if a new window was opened.
    pub fn on_tick(&mut self, now: EpochSecond) -> bool {
        if self.is_open || !now.is_cycle_boundary() {
            return false;
        }
        self.window_start = now;
        self.audio.clear();
        self.is_open = true;
        debug!("Recording window opened at {}", now.window_stamp());
        true
    }

    /// Frame buffer step. Datagrams outside an open window are dropped.
    pub fn on_datagram(&mut self, datagram: &[u8]) -> Option<FilledBuffer> {
        if !self.is_open {
            return None;
        }
        self.audio.extend_from_slice(datagram);
        if self.audio.len() < self.threshold {
            return None;
        }

        self.is_open = false;
        let bytes = std::mem::replace(&mut self.audio, Vec::with_capacity(self.threshold));
        debug!(
            "Recording window {} filled with {} bytes",
            self.window_start.window_stamp(),
            bytes.len()
        );
        Some(FilledBuffer {
            start: self.window_start,
            bytes,
        })
    }
}
