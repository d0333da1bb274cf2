use crate::decoder::job::JobId;
use crate::services::reporter::Spot;

/// I/O the reactor asks the driver to perform.
#[derive(Debug, Clone)]
pub enum SideEffect {
    /// Write `container` to `file_name` and launch the decoder on it.
    StartDecode {
        job: JobId,
        file_name: String,
        args: Vec<String>,
        container: Vec<u8>,
    },
    /// Append to the power log.
    LogPower { stem: String, power_db: f64 },
    /// Append a formatted line to the decode log.
    LogDecode(String),
    SubmitSpot(Spot),
    /// Delete the job's WAV file unless the sentinel says keep it.
    CleanupWindow { job: JobId, file_name: String },
}
