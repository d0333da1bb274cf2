//! Per-frequency decode and power logs

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Append-only text file, opened for each write so rotated files are
/// picked up without a restart.
#[derive(Debug, Clone)]
pub struct AppendLog {
    path: PathBuf,
}

impl AppendLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", line).as_bytes()).await?;
        file.flush().await
    }
}

/// `<dir>/<prefix>_<freq>.log` and `<dir>/<prefix>_<freq>_pwr.log`.
#[derive(Debug, Clone)]
pub struct DiagnosticsLogger {
    decodes: AppendLog,
    power: AppendLog,
}

impl DiagnosticsLogger {
    pub fn new(dir: &Path, prefix: &str, base_frequency_hz: u64) -> Self {
        Self {
            decodes: AppendLog::new(dir.join(format!("{}_{}.log", prefix, base_frequency_hz))),
            power: AppendLog::new(dir.join(format!("{}_{}_pwr.log", prefix, base_frequency_hz))),
        }
    }

    pub fn decode_log(&self) -> &Path {
        self.decodes.path()
    }

    pub fn power_log(&self) -> &Path {
        self.power.path()
    }

    /// Failures are logged; a lost log line never stops acquisition.
    pub async fn log_decode(&self, line: &str) {
        if let Err(e) = self.decodes.append(line).await {
            warn!("Failed to open log file {}: {}", self.decodes.path().display(), e);
        }
    }

    pub async fn log_power(&self, stem: &str, power_db: f64) {
        if let Err(e) = self.power.append(&format_power(stem, power_db)).await {
            warn!("Failed to open power log file {}: {}", self.power.path().display(), e);
        }
    }
}

pub fn format_power(stem: &str, power_db: f64) -> String {
    format!("{} {:.1}", stem, power_db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_line_has_one_decimal() {
        assert_eq!(format_power("180701_123445", -100.0), "180701_123445 -100.0");
        assert_eq!(format_power("180701_123445", 42.26), "180701_123445 42.3");
    }

    #[test]
    fn paths_follow_frequency() {
        let logger = DiagnosticsLogger::new(Path::new("/var/tmp"), "rxft8", 14_074_000);
        assert_eq!(logger.decode_log(), Path::new("/var/tmp/rxft8_14074000.log"));
        assert_eq!(logger.power_log(), Path::new("/var/tmp/rxft8_14074000_pwr.log"));
    }

    #[tokio::test]
    async fn lines_are_appended() {
        let dir = std::env::temp_dir().join(format!("rxft8-diag-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let logger = DiagnosticsLogger::new(&dir, "rxft8", 7_074_000);

        logger.log_decode("180701 first*").await;
        logger.log_decode("180701 second").await;
        logger.log_power("180701_123445", -12.34).await;

        let decodes = std::fs::read_to_string(logger.decode_log()).unwrap();
        assert_eq!(decodes, "180701 first*\n180701 second\n");
        let power = std::fs::read_to_string(logger.power_log()).unwrap();
        assert_eq!(power, "180701_123445 -12.3\n");
        std::fs::remove_dir_all(&dir).ok();
    }
}
