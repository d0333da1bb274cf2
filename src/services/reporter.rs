use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, info};

use crate::config::StationConfig;

const MAX_QUEUED_SPOTS: usize = 10_000;

/// One decoded transmission, eligible for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    pub callsign: String,
    pub grid_locator: String,
    pub frequency_hz: u64,
    pub mode: String,
    pub snr_db: i32,
    pub timestamp: i64,
    pub verified: bool,
}

/// The receiving station, announced once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalStation {
    pub callsign: String,
    pub grid_locator: String,
    pub antenna: String,
    pub program: String,
}

impl From<&StationConfig> for LocalStation {
    fn from(station: &StationConfig) -> Self {
        Self {
            callsign: station.callsign.clone(),
            grid_locator: station.locator.clone(),
            antenna: station.antenna.clone(),
            program: station.program.clone(),
        }
    }
}

/// Boundary to the spot reporting network.
pub trait ReportingGateway {
    fn set_local_station(&mut self, station: LocalStation);
    fn submit_spot(&mut self, spot: Spot);
}

/// Holds spots until a transport drains them. Oldest spots are dropped
/// once the queue is full.
#[derive(Debug, Default)]
pub struct QueuedReporter {
    station: Option<LocalStation>,
    queue: VecDeque<Spot>,
    submitted: u64,
}

impl QueuedReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn local_station(&self) -> Option<&LocalStation> {
        self.station.as_ref()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    pub fn drain(&mut self) -> Vec<Spot> {
        self.queue.drain(..).collect()
    }
}

impl ReportingGateway for QueuedReporter {
    fn set_local_station(&mut self, station: LocalStation) {
        info!(
            "Reporting as {} ({}) antenna '{}' via {}",
            station.callsign, station.grid_locator, station.antenna, station.program
        );
        self.station = Some(station);
    }

    fn submit_spot(&mut self, spot: Spot) {
        if self.queue.len() >= MAX_QUEUED_SPOTS {
            self.queue.pop_front();
        }
        debug!(
            "Spot queued: {} {} {} Hz {} dB",
            spot.callsign, spot.grid_locator, spot.frequency_hz, spot.snr_db
        );
        self.submitted += 1;
        self.queue.push_back(spot);
    }
}
