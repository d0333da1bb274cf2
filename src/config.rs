//! Configuration structures for the receiver

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub station: StationConfig,
    pub feed: FeedConfig,
    pub paths: PathsConfig,
}

impl Config {
    /// Reject what the receiver cannot run without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.station.callsign.trim().is_empty() {
            return Err(ConfigError::MissingField("callsign".into()));
        }
        if self.station.locator.trim().is_empty() {
            return Err(ConfigError::MissingField("locator".into()));
        }
        if self.feed.base_frequency_hz == 0 {
            return Err(ConfigError::InvalidValue {
                field: "freq".into(),
                value: self.feed.base_frequency_hz.to_string(),
            });
        }
        if !self.feed.multicast_group.is_multicast() {
            return Err(ConfigError::InvalidValue {
                field: "group".into(),
                value: self.feed.multicast_group.to_string(),
            });
        }
        if self.feed.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".into(),
                value: "0".into(),
            });
        }
        if self.feed.interface.trim().is_empty() {
            return Err(ConfigError::MissingField("interface".into()));
        }
        Ok(())
    }
}

/// Identity announced to the reporting service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub callsign: String,
    pub locator: String,
    pub antenna: String,
    pub program: String,
}

impl StationConfig {
    pub fn new(callsign: &str, locator: &str) -> Self {
        Self {
            callsign: callsign.to_uppercase(),
            locator: locator.to_uppercase(),
            ..Self::default()
        }
    }
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            callsign: String::new(),
            locator: String::new(),
            antenna: "Dipole".to_string(),
            program: "rxft8 v1.0".to_string(),
        }
    }
}

/// Network audio feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Dial frequency in Hz; decoder offsets are added to it
    pub base_frequency_hz: u64,
    pub multicast_group: Ipv4Addr,
    pub port: u16,
    /// Name of the interface to join the group on
    pub interface: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_frequency_hz: 0,
            multicast_group: Ipv4Addr::new(239, 0, 0, 1),
            port: 0,
            interface: String::new(),
        }
    }
}

/// Filesystem locations and the external decoder
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// WAV files and the `keepwav` sentinel live here
    pub work_dir: PathBuf,
    pub log_dir: PathBuf,
    pub log_prefix: String,
    pub decoder: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            log_dir: PathBuf::from("/var/tmp"),
            log_prefix: "rxft8".to_string(),
            decoder: "jt9".to_string(),
        }
    }
}
