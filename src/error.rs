//! Error types for the receiver

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Rxft8Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid configuration value: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

/// Multicast feed errors. None of these stop the process.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid multicast group: {0}")]
    InvalidGroup(String),

    #[error("IPv4 socket bind failed on port {port}: {reason}")]
    Bind { port: u16, reason: String },

    #[error("IPv4 multicast join failed: {0}")]
    Join(String),
}

/// Per-cycle failures. The cycle is abandoned, the process carries on.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid filename generated: {0}")]
    InvalidFileName(String),

    #[error("Failed to write WAV file {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start decoder process: {program} {args}: {source}")]
    StartFailed {
        program: String,
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("WAV header error: {0}")]
    Wave(#[from] hound::Error),

    #[error("Decoder record pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Rxft8Error>;
