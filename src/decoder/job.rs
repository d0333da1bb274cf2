use uuid::Uuid;

use crate::kernel::time::EpochSecond;

pub const DECODER_ARGS: [&str; 7] = ["--ft8", "-d", "3", "-L", "0", "-H", "3000"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        JobId(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    FileWritten,
    ProcessLaunched,
    ProcessExited,
    FileDeleted,
    FileKept,
    /// Write or launch failed; no exit handling follows.
    Abandoned,
}

impl JobPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::FileDeleted | JobPhase::FileKept | JobPhase::Abandoned)
    }

    fn can_enter(&self, next: JobPhase) -> bool {
        use JobPhase::*;
        matches!(
            (self, next),
            (Idle, FileWritten)
                | (Idle, Abandoned)
                | (FileWritten, ProcessLaunched)
                | (FileWritten, Abandoned)
                | (ProcessLaunched, ProcessExited)
                | (ProcessExited, FileDeleted)
                | (ProcessExited, FileKept)
        )
    }
}

/// One window's trip through the decoder.
#[derive(Debug, Clone)]
pub struct DecodeJob {
    pub id: JobId,
    pub window_start: EpochSecond,
    pub file_name: String,
    /// Window power, logged once the file is on disk.
    pub power_db: Option<f64>,
    phase: JobPhase,
    lines_seen: usize,
}

impl DecodeJob {
    pub fn new(window_start: EpochSecond, file_name: String) -> Self {
        Self {
            id: JobId::new(),
            window_start,
            file_name,
            power_db: None,
            phase: JobPhase::Idle,
            lines_seen: 0,
        }
    }

    pub fn with_power(mut self, power_db: f64) -> Self {
        self.power_db = Some(power_db);
        self
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }

    /// Move to `next` if the transition is legal. Returns false otherwise.
    pub fn advance(&mut self, next: JobPhase) -> bool {
        if !self.phase.can_enter(next) {
            return false;
        }
        self.phase = next;
        true
    }

    pub fn record_output(&mut self) {
        self.lines_seen += 1;
    }

    pub fn launch_args(&self) -> Vec<String> {
        DECODER_ARGS
            .iter()
            .map(|a| a.to_string())
            .chain(std::iter::once(self.file_name.clone()))
            .collect()
    }
}
