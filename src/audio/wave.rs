use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::DecodeError;

/// Sample rate the decoder expects.
pub const TARGET_RATE_HZ: u32 = 12_000;

/// Bytes of PCM in every emitted file: 15 s of mono 16-bit at 12 kHz.
pub const TARGET_DATA_BYTES: usize = 15 * TARGET_RATE_HZ as usize * 2;

pub fn target_spec() -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: TARGET_RATE_HZ,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// RIFF/WAVE header for a fixed-size window.
///
/// Every window has the same format and data length, so the header is
/// rendered once and prepended to each payload.
#[derive(Debug, Clone)]
pub struct WaveHeader {
    bytes: Vec<u8>,
    data_len: usize,
}

impl WaveHeader {
    /// Render the header by letting hound finalize a silent window of
    /// `data_len` bytes and keeping everything in front of the samples.
    pub fn build(data_len: usize) -> Result<Self, DecodeError> {
        let mut cursor = Cursor::new(Vec::with_capacity(data_len + 64));
        let mut writer = WavWriter::new(&mut cursor, target_spec())?;
        for _ in 0..data_len / 2 {
            writer.write_sample(0i16)?;
        }
        writer.finalize()?;

        let mut bytes = cursor.into_inner();
        bytes.truncate(bytes.len() - data_len);
        Ok(Self { bytes, data_len })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Header followed by `pcm`. `pcm` must be exactly `data_len` bytes.
    pub fn wrap(&self, pcm: &[u8]) -> Vec<u8> {
        debug_assert_eq!(pcm.len(), self.data_len);
        let mut out = Vec::with_capacity(self.bytes.len() + pcm.len());
        out.extend_from_slice(&self.bytes);
        out.extend_from_slice(pcm);
        out
    }
}
