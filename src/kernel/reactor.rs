use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::cycle::{FilledBuffer, RecordingCycle};
use super::effect::SideEffect;
use super::event::{CleanupOutcome, DecoderExit, Event};
use super::time::EpochSecond;

use crate::audio::power::power_db;
use crate::audio::window::WindowFinalizer;
use crate::decoder::job::{DecodeJob, JobId, JobPhase};
use crate::decoder::parser::SpotParser;
use crate::error::DecodeError;

/// Characters of the file name that identify a window in the power log.
const POWER_STEM_LEN: usize = 13;

#[derive(Debug, Clone)]
pub struct ReactorConfig {
    pub base_frequency_hz: u64,
}

pub struct Reactor {
    pub cycle: RecordingCycle,
    finalizer: WindowFinalizer,
    parser: SpotParser,
    jobs: HashMap<JobId, DecodeJob>,
    windows_finalized: u64,
}

impl Reactor {
    pub fn new(config: ReactorConfig) -> Result<Self, DecodeError> {
        Self::with_cycle(config, RecordingCycle::new())
    }

    pub fn with_cycle(config: ReactorConfig, cycle: RecordingCycle) -> Result<Self, DecodeError> {
        Ok(Self {
            cycle,
            finalizer: WindowFinalizer::new()?,
            parser: SpotParser::new(config.base_frequency_hz)?,
            jobs: HashMap::new(),
            windows_finalized: 0,
        })
    }

    pub fn windows_finalized(&self) -> u64 {
        self.windows_finalized
    }

    pub fn job(&self, id: &JobId) -> Option<&DecodeJob> {
        self.jobs.get(id)
    }

    /// Jobs that have not reached a terminal phase.
    pub fn in_flight(&self) -> usize {
        self.jobs.len()
    }

    /// Pure step: advances state and returns the I/O to perform.
    /// MUST NOT await or touch the filesystem.
    pub fn step(&mut self, event: Event) -> Vec<SideEffect> {
        match event {
            Event::Tick(now) => {
                self.cycle.on_tick(now);
                Vec::new()
            }
            Event::Datagram(bytes) => match self.cycle.on_datagram(&bytes) {
                Some(filled) => self.finalize(filled),
                None => Vec::new(),
            },
            Event::FileWritten(id) => {
                if !self.advance(id, JobPhase::FileWritten) {
                    return Vec::new();
                }
                self.power_effect(id).into_iter().collect()
            }
            Event::ProcessLaunched(id) => {
                self.advance(id, JobPhase::ProcessLaunched);
                Vec::new()
            }
            Event::JobAbandoned { job, reason } => {
                warn!("Decode job {} abandoned: {}", job, reason);
                self.advance(job, JobPhase::Abandoned);
                Vec::new()
            }
            Event::DecoderOutput {
                job,
                chunk,
                received_at,
            } => self.on_output(job, &chunk, received_at),
            Event::DecoderExited { job, exit } => self.on_exit(job, exit),
            Event::Cleaned { job, outcome } => {
                let phase = match outcome {
                    CleanupOutcome::Deleted => JobPhase::FileDeleted,
                    CleanupOutcome::Kept | CleanupOutcome::RemoveFailed => JobPhase::FileKept,
                };
                self.advance(job, phase);
                Vec::new()
            }
        }
    }

    fn finalize(&mut self, filled: FilledBuffer) -> Vec<SideEffect> {
        // Invalid names are already logged by the finalizer; the cycle is lost.
        let Ok(finalized) = self.finalizer.finalize(filled) else {
            return Vec::new();
        };
        self.windows_finalized += 1;

        let power = power_db(finalized.window.pcm());
        let job = DecodeJob::new(finalized.window.start(), finalized.file_name.clone()).with_power(power);
        info!("Window {} ready, {:.1} dB", finalized.file_name, power);

        let effects = vec![SideEffect::StartDecode {
            job: job.id,
            file_name: finalized.file_name,
            args: job.launch_args(),
            container: finalized.container,
        }];
        self.jobs.insert(job.id, job);
        effects
    }

    /// Power line for a window whose file made it to disk.
    fn power_effect(&self, id: JobId) -> Option<SideEffect> {
        let job = self.jobs.get(&id)?;
        Some(SideEffect::LogPower {
            stem: job.file_name.chars().take(POWER_STEM_LEN).collect(),
            power_db: job.power_db?,
        })
    }

    fn on_output(&mut self, id: JobId, chunk: &str, received_at: EpochSecond) -> Vec<SideEffect> {
        let date = match self.jobs.get_mut(&id) {
            Some(job) => {
                job.record_output();
                job.window_start.date_stamp()
            }
            None => received_at.date_stamp(),
        };

        let Some(parsed) = self.parser.parse(chunk, received_at) else {
            return Vec::new();
        };

        info!("{} {}", parsed.text, parsed.marker());
        let mut effects = vec![SideEffect::LogDecode(format!(
            "{} {}{}",
            date,
            parsed.text,
            parsed.marker()
        ))];
        if let Some(spot) = parsed.spot {
            effects.push(SideEffect::SubmitSpot(spot));
        }
        effects
    }

    fn on_exit(&mut self, id: JobId, exit: DecoderExit) -> Vec<SideEffect> {
        if !exit.is_clean() {
            warn!("Decoder process finished with error: {:?}", exit);
        }
        let Some(job) = self.jobs.get(&id) else {
            warn!("Exit reported for unknown decode job {}", id);
            return Vec::new();
        };
        let file_name = job.file_name.clone();
        debug!("Decode job {} produced {} lines", id, job.lines_seen());

        // The file is removed either way; a job that cannot reach
        // ProcessExited could never finish, so it is dropped here.
        if !self.advance(id, JobPhase::ProcessExited) {
            self.jobs.remove(&id);
        }
        vec![SideEffect::CleanupWindow { job: id, file_name }]
    }

    /// Returns false if the job is unknown or the transition is illegal.
    fn advance(&mut self, id: JobId, phase: JobPhase) -> bool {
        let Some(job) = self.jobs.get_mut(&id) else {
            return false;
        };
        if !job.advance(phase) {
            warn!("Decode job {} cannot move from {:?} to {:?}", id, job.phase(), phase);
            return false;
        }
        if phase.is_terminal() {
            self.jobs.remove(&id);
        }
        true
    }
}
