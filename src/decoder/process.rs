use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::job::JobId;
use crate::error::DecodeError;
use crate::kernel::event::{CleanupOutcome, DecoderExit, Event};
use crate::kernel::time::EpochSecond;

/// Presence of this file in the working directory keeps decoded WAVs.
pub const KEEP_SENTINEL: &str = "keepwav";

/// Writes windows to disk and runs the external decoder against them.
///
/// Every child gets its own task that forwards stdout lines and then the
/// exit status to the event loop. Children are independent: a slow decode
/// never holds up the next window.
#[derive(Debug, Clone)]
pub struct DecoderProcess {
    program: String,
    work_dir: PathBuf,
    events: mpsc::Sender<Event>,
}

impl DecoderProcess {
    pub fn new(program: impl Into<String>, work_dir: impl Into<PathBuf>, events: mpsc::Sender<Event>) -> Self {
        Self {
            program: program.into(),
            work_dir: work_dir.into(),
            events,
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Write, then launch. Returns the lifecycle events to feed back to the
    /// reactor; any failure ends in `JobAbandoned` with no retry.
    pub async fn launch(&self, job: JobId, file_name: &str, args: &[String], container: &[u8]) -> Vec<Event> {
        if let Err(e) = self.write_window(file_name, container).await {
            warn!("{}", e);
            return vec![Event::JobAbandoned {
                job,
                reason: e.to_string(),
            }];
        }

        let mut events = vec![Event::FileWritten(job)];
        match self.spawn(job, args) {
            Ok(()) => events.push(Event::ProcessLaunched(job)),
            Err(e) => {
                warn!("{}", e);
                events.push(Event::JobAbandoned {
                    job,
                    reason: e.to_string(),
                });
            }
        }
        events
    }

    pub async fn write_window(&self, file_name: &str, container: &[u8]) -> Result<PathBuf, DecodeError> {
        let path = self.work_dir.join(file_name);
        let to_err = |source| DecodeError::WriteFailed {
            path: path.display().to_string(),
            source,
        };

        let mut file = tokio::fs::File::create(&path).await.map_err(to_err)?;
        file.write_all(container).await.map_err(to_err)?;
        file.flush().await.map_err(to_err)?;
        Ok(path)
    }

    /// Start the decoder. `spawn` returns once the exec has succeeded or
    /// failed, so there is no separate start wait.
    pub fn spawn(&self, job: JobId, args: &[String]) -> Result<(), DecodeError> {
        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DecodeError::StartFailed {
                program: self.program.clone(),
                args: args.join(" "),
                source,
            })?;
        debug!("Decoder {} started for job {}", self.program, job);

        let stdout = child.stdout.take();
        let tx = self.events.clone();
        tokio::spawn(async move {
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                loop {
                    match lines.next_line().await {
                        Ok(Some(line)) => {
                            let event = Event::DecoderOutput {
                                job,
                                chunk: line,
                                received_at: EpochSecond::now(),
                            };
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        Ok(None) => break,
                        Err(e) => {
                            warn!("Decoder output unreadable for job {}: {}", job, e);
                            break;
                        }
                    }
                }
            }

            let exit = match child.wait().await {
                Ok(status) => status.code().map(DecoderExit::Code).unwrap_or(DecoderExit::Abnormal),
                Err(e) => {
                    warn!("Failed to wait for decoder of job {}: {}", job, e);
                    DecoderExit::Abnormal
                }
            };
            let _ = tx.send(Event::DecoderExited { job, exit }).await;
        });
        Ok(())
    }

    /// Remove the window's file unless the keep sentinel exists.
    pub async fn cleanup(&self, file_name: &str) -> CleanupOutcome {
        let sentinel = self.work_dir.join(KEEP_SENTINEL);
        if tokio::fs::try_exists(&sentinel).await.unwrap_or(false) {
            return CleanupOutcome::Kept;
        }

        let path = self.work_dir.join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => CleanupOutcome::Deleted,
            Err(e) => {
                warn!("Failed to remove WAV file {}: {}", path.display(), e);
                CleanupOutcome::RemoveFailed
            }
        }
    }
}
