//! The event loop: one task owns the reactor and performs its side effects.

use std::collections::VecDeque;
use std::io;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

use crate::audio::ingest::MAX_DATAGRAM;
use crate::config::Config;
use crate::decoder::process::DecoderProcess;
use crate::error::Result;
use crate::kernel::effect::SideEffect;
use crate::kernel::event::Event;
use crate::kernel::reactor::{Reactor, ReactorConfig};
use crate::kernel::time::{EpochSecond, TICK_MS};
use crate::outputs::diagnostics::DiagnosticsLogger;
use crate::services::reporter::{LocalStation, ReportingGateway};

const EVENT_QUEUE: usize = 1024;

pub struct Driver<G: ReportingGateway> {
    pub reactor: Reactor,
    decoder: DecoderProcess,
    diagnostics: DiagnosticsLogger,
    gateway: G,
    events: mpsc::Receiver<Event>,
}

impl<G: ReportingGateway> Driver<G> {
    /// Builds the reactor and registers the local station with `gateway`.
    pub fn new(config: &Config, mut gateway: G) -> Result<Self> {
        let reactor = Reactor::new(ReactorConfig {
            base_frequency_hz: config.feed.base_frequency_hz,
        })?;
        gateway.set_local_station(LocalStation::from(&config.station));
        Ok(Self::with_reactor(config, reactor, gateway))
    }

    pub fn with_reactor(config: &Config, reactor: Reactor, gateway: G) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE);
        Self {
            reactor,
            decoder: DecoderProcess::new(&config.paths.decoder, &config.paths.work_dir, tx),
            diagnostics: DiagnosticsLogger::new(
                &config.paths.log_dir,
                &config.paths.log_prefix,
                config.feed.base_frequency_hz,
            ),
            gateway,
            events: rx,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn diagnostics(&self) -> &DiagnosticsLogger {
        &self.diagnostics
    }

    /// Step the reactor with `event` and carry out what it asks for,
    /// including the follow-up events the I/O produces.
    pub async fn dispatch(&mut self, event: Event) {
        let mut pending = VecDeque::from([event]);
        while let Some(event) = pending.pop_front() {
            for effect in self.reactor.step(event) {
                match effect {
                    SideEffect::StartDecode {
                        job,
                        file_name,
                        args,
                        container,
                    } => {
                        let outcome = self.decoder.launch(job, &file_name, &args, &container).await;
                        pending.extend(outcome);
                    }
                    SideEffect::LogPower { stem, power_db } => self.diagnostics.log_power(&stem, power_db).await,
                    SideEffect::LogDecode(line) => self.diagnostics.log_decode(&line).await,
                    SideEffect::SubmitSpot(spot) => self.gateway.submit_spot(spot),
                    SideEffect::CleanupWindow { job, file_name } => {
                        let outcome = self.decoder.cleanup(&file_name).await;
                        pending.push_back(Event::Cleaned { job, outcome });
                    }
                }
            }
        }
    }

    /// Wait for the next decoder event and dispatch it.
    pub async fn pump(&mut self) {
        if let Some(event) = self.events.recv().await {
            self.dispatch(event).await;
        }
    }

    /// Run until Ctrl-C. Without a socket the loop still ticks and services
    /// decoder events but never records.
    pub async fn run(mut self, socket: Option<UdpSocket>) {
        info!("Acquisition loop started. Tick: {}ms", TICK_MS);
        if socket.is_none() {
            warn!("No audio feed; running without incoming audio");
        }

        let mut cadence = interval(Duration::from_millis(TICK_MS));
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = cadence.tick() => {
                    self.dispatch(Event::Tick(EpochSecond::now())).await;
                }
                received = recv(socket.as_ref(), &mut buf) => match received {
                    Ok(n) => self.dispatch(Event::Datagram(buf[..n].to_vec())).await,
                    Err(e) => warn!("Audio feed read failed: {}", e),
                },
                Some(event) = self.events.recv() => {
                    self.dispatch(event).await;
                }
                _ = &mut shutdown => {
                    info!("Shutdown requested; {} decodes still running", self.reactor.in_flight());
                    break;
                }
            }
        }
    }
}

async fn recv(socket: Option<&UdpSocket>, buf: &mut [u8]) -> io::Result<usize> {
    match socket {
        Some(socket) => socket.recv(buf).await,
        None => std::future::pending().await,
    }
}
