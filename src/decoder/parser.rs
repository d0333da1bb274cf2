//! Decoder output parsing
//!
//! The decoder prints one fixed-width record per decode:
//!
//! ```text
//! 123456  -5  0.3 1500 ~  CQ PY2ABC GG66
//! ```
//!
//! time, SNR, time offset, audio frequency offset, a one-character mode
//! flag and the message. Only the first [`RECORD_WIDTH`] characters of a
//! chunk are considered.

use regex::Regex;

use crate::kernel::time::EpochSecond;
use crate::services::reporter::Spot;

pub const RECORD_WIDTH: usize = 50;

pub const MODE: &str = "FT8";

const CQ_MARKER: &str = "CQ";

/// Sign-off token that sits where a grid would be.
const SESSION_END: &str = "RR73";

const RECORD_PATTERN: &str = r"(^\d{6})\s+(-?\d+)\s+(-?\d+\.\d+)\s+(\d+)\s+(.)\s+(\w+)";
const CQ_PATTERN: &str = r"\s+(CQ|CQ\s+[A-Z]{2})\s+(\w+)\s+([A-Z]{2}\d{2})";
const DIRECTED_PATTERN: &str = r"\s+(\w+)\s+(\w+)\s+([A-Z]{2}\d{2})";
const CALLSIGN_PATTERN: &str = r"\d?[A-Z]{1,2}\d{1,2}[A-Z]{1,3}";

/// A chunk that matched the record pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// Truncated record with line breaks removed, as logged.
    pub text: String,
    /// Present only for a validated callsign.
    pub spot: Option<Spot>,
}

impl ParsedLine {
    pub fn verified(&self) -> bool {
        self.spot.is_some()
    }

    pub fn marker(&self) -> &'static str {
        if self.verified() {
            "*"
        } else {
            ""
        }
    }
}

#[derive(Debug, Clone)]
pub struct SpotParser {
    base_frequency_hz: u64,
    record: Regex,
    cq: Regex,
    directed: Regex,
    callsign: Regex,
}

impl SpotParser {
    pub fn new(base_frequency_hz: u64) -> Result<Self, regex::Error> {
        Ok(Self {
            base_frequency_hz,
            record: Regex::new(RECORD_PATTERN)?,
            cq: Regex::new(CQ_PATTERN)?,
            directed: Regex::new(DIRECTED_PATTERN)?,
            callsign: Regex::new(CALLSIGN_PATTERN)?,
        })
    }

    pub fn base_frequency_hz(&self) -> u64 {
        self.base_frequency_hz
    }

    /// Parse one output chunk. `None` if it is not a decode record.
    pub fn parse(&self, chunk: &str, now: EpochSecond) -> Option<ParsedLine> {
        let head: String = chunk.chars().take(RECORD_WIDTH).collect();
        let record = self.record.captures(&head)?;

        // Out-of-range numbers still get the line logged, just never reported.
        let snr_db: Option<i32> = record[2].parse().ok();
        let frequency_hz = record[4]
            .parse::<u64>()
            .ok()
            .and_then(|offset| self.base_frequency_hz.checked_add(offset));
        let is_cq = &record[6] == CQ_MARKER;

        let spot = match (snr_db, frequency_hz) {
            (Some(snr_db), Some(frequency_hz)) => self.spot(&head, is_cq, snr_db, frequency_hz, now),
            _ => None,
        };

        Some(ParsedLine {
            text: head.replace(['\n', '\r'], ""),
            spot,
        })
    }

    fn spot(&self, head: &str, is_cq: bool, snr_db: i32, frequency_hz: u64, now: EpochSecond) -> Option<Spot> {
        let pattern = if is_cq { &self.cq } else { &self.directed };
        let (call, grid) = self.extract(pattern, head)?;
        let call = call.to_uppercase();
        if !self.callsign.is_match(&call) {
            return None;
        }
        Some(Spot {
            callsign: call,
            grid_locator: grid,
            frequency_hz,
            mode: MODE.to_string(),
            snr_db,
            timestamp: now.0,
            verified: true,
        })
    }

    /// Callsign and grid from the second and third captures, unless the
    /// "grid" is a sign-off.
    fn extract(&self, pattern: &Regex, head: &str) -> Option<(String, String)> {
        let caps = pattern.captures(head)?;
        if &caps[3] == SESSION_END {
            return None;
        }
        Some((caps[2].to_string(), caps[3].to_string()))
    }
}
