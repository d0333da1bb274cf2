use std::net::Ipv4Addr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rxft8::audio::ingest::open_feed;
use rxft8::config::{Config, FeedConfig, PathsConfig, StationConfig};
use rxft8::services::QueuedReporter;
use rxft8::Driver;

/// PY2SDR FT8 Receiver
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Station callsign
    #[arg(short, long)]
    callsign: String,

    /// Grid locator
    #[arg(short, long)]
    locator: String,

    /// RX frequency in Hz
    #[arg(short, long = "freq")]
    frequency: u64,

    /// Multicast group
    #[arg(short = 'g', long)]
    group: Ipv4Addr,

    /// Multicast port
    #[arg(short, long)]
    port: u16,

    /// Network interface
    #[arg(short, long)]
    interface: String,

    /// Decoder executable
    #[arg(long, default_value = "jt9")]
    decoder: String,

    /// Directory for WAV files and the keepwav sentinel
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Directory for the decode and power logs
    #[arg(long, default_value = "/var/tmp")]
    log_dir: PathBuf,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            station: StationConfig::new(&self.callsign, &self.locator),
            feed: FeedConfig {
                base_frequency_hz: self.frequency,
                multicast_group: self.group,
                port: self.port,
                interface: self.interface,
            },
            paths: PathsConfig {
                work_dir: self.work_dir,
                log_dir: self.log_dir,
                decoder: self.decoder,
                ..PathsConfig::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().into_config();
    config.validate().context("invalid command line")?;
    tracing::info!(
        "rxft8 booting: {} Hz from {}:{} on {}",
        config.feed.base_frequency_hz,
        config.feed.multicast_group,
        config.feed.port,
        config.feed.interface
    );

    let driver = Driver::new(&config, QueuedReporter::new()).context("failed to set up receiver")?;

    let socket = match open_feed(&config.feed) {
        Ok(socket) => Some(socket),
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    };

    driver.run(socket).await;
    Ok(())
}
