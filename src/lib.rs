//! FT8 receiver front-end
//!
//! Records 15 s windows from a multicast PCM feed, hands each one to an
//! external FT8 decoder and reports the stations it hears.
//!
//! - `kernel`: cycle timing, frame buffering and the pure reactor
//! - `audio`: feed socket, decimation, WAV container and power
//! - `decoder`: decode jobs, the decoder child process and its output parser
//! - `outputs`: per-frequency decode and power logs
//! - `services`: spot reporting
//! - `driver`: the tokio event loop tying these together

pub mod audio;
pub mod config;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod kernel;
pub mod outputs;
pub mod services;

pub use config::Config;
pub use driver::Driver;
pub use error::{Result, Rxft8Error};
pub use kernel::reactor::Reactor;
