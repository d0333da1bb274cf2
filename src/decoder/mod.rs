pub mod job;
pub mod parser;
pub mod process;

pub use job::{DecodeJob, JobId, JobPhase};
pub use parser::{ParsedLine, SpotParser};
pub use process::{DecoderProcess, KEEP_SENTINEL};
