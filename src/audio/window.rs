use tracing::warn;

use super::wave::{WaveHeader, TARGET_DATA_BYTES, TARGET_RATE_HZ};
use crate::error::DecodeError;
use crate::kernel::cycle::FilledBuffer;
use crate::kernel::time::EpochSecond;

/// Sample rate of the network feed.
pub const NATIVE_RATE_HZ: u32 = 48_000;

/// 48 kHz -> 12 kHz
pub const DOWNSAMPLE_FACTOR: usize = (NATIVE_RATE_HZ / TARGET_RATE_HZ) as usize;

pub const WAV_EXTENSION: &str = "wav";

/// Decimated, padded PCM for one cycle. Never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioWindow {
    pcm: Vec<i16>,
    sample_rate_hz: u32,
    start: EpochSecond,
}

impl AudioWindow {
    pub fn pcm(&self) -> &[i16] {
        &self.pcm
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn start(&self) -> EpochSecond {
        self.start
    }
}

/// A window ready to be written and decoded.
#[derive(Debug, Clone)]
pub struct FinalizedWindow {
    pub window: AudioWindow,
    pub file_name: String,
    pub container: Vec<u8>,
}

/// Keep every `factor`-th 16-bit word of `native`, stopping when the input
/// runs out or `target_len` bytes are produced, then pad with silence to
/// exactly `target_len` bytes.
///
/// No anti-alias filter: the feed is already band-limited.
pub fn decimate_and_pad(native: &[u8], factor: usize, target_len: usize) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(target_len);
    let stride = 2 * factor.max(1);

    let mut i = 0;
    while i + 1 < native.len() && pcm.len() < target_len {
        pcm.push(native[i]);
        pcm.push(native[i + 1]);
        i += stride;
    }

    pcm.resize(target_len, 0);
    pcm
}

/// Path separators and parent references are refused; the name is joined
/// onto the working directory.
pub fn validate_file_name(name: &str) -> Result<(), DecodeError> {
    if name.is_empty() || name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(DecodeError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

pub fn window_file_name(start: EpochSecond) -> String {
    format!("{}.{}", start.window_stamp(), WAV_EXTENSION)
}

/// Turns a filled native-rate buffer into a WAV container.
#[derive(Debug, Clone)]
pub struct WindowFinalizer {
    header: WaveHeader,
    factor: usize,
}

impl WindowFinalizer {
    pub fn new() -> Result<Self, DecodeError> {
        Ok(Self {
            header: WaveHeader::build(TARGET_DATA_BYTES)?,
            factor: DOWNSAMPLE_FACTOR,
        })
    }

    pub fn header(&self) -> &WaveHeader {
        &self.header
    }

    pub fn finalize(&self, filled: FilledBuffer) -> Result<FinalizedWindow, DecodeError> {
        self.finalize_named(filled, window_file_name)
    }

    /// Same as [`finalize`](Self::finalize) with a caller-supplied naming rule.
    pub fn finalize_named<F>(&self, filled: FilledBuffer, name: F) -> Result<FinalizedWindow, DecodeError>
    where
        F: FnOnce(EpochSecond) -> String,
    {
        let file_name = name(filled.start);
        if let Err(e) = validate_file_name(&file_name) {
            warn!("{}", e);
            return Err(e);
        }

        let bytes = decimate_and_pad(&filled.bytes, self.factor, self.header.data_len());
        let pcm = bytes
            .chunks_exact(2)
            .map(|w| i16::from_le_bytes([w[0], w[1]]))
            .collect();
        let container = self.header.wrap(&bytes);

        Ok(FinalizedWindow {
            window: AudioWindow {
                pcm,
                sample_rate_hz: TARGET_RATE_HZ,
                start: filled.start,
            },
            file_name,
            container,
        })
    }
}
