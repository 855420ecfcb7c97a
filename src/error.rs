use std::io;
use std::time::Duration;

use thiserror::Error;

/// Failure while decoding a VarInt from a byte source.
#[derive(Error, Debug)]
pub enum VarIntError {
    #[error("VarInt is too large")]
    TooLarge,

    #[error("stream ended in the middle of a VarInt")]
    Truncated,

    #[error("I/O error while reading VarInt: {0}")]
    Io(#[from] io::Error),
}

/// Why a single probe did not yield a status document.
///
/// These are always local to one port; the scanner records them and moves on.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("connection failed: {0}")]
    Connect(#[source] io::Error),

    #[error("connection timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("deadline exceeded during status exchange")]
    DeadlineExceeded,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("error reading VarInt: {0}")]
    VarInt(#[from] VarIntError),

    #[error("packet length {0} exceeds protocol maximum")]
    FrameTooLarge(i32),

    #[error("packet length {0} is too short")]
    FrameTooShort(i32),

    #[error("received unexpected packet ID: 0x{0:X}")]
    UnexpectedPacketId(i32),

    #[error("invalid JSON length: {0}")]
    InvalidLength(i32),

    #[error("response ended before the full JSON payload was read")]
    Truncated,

    #[error("malformed status payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Rejected scan configuration. Checked before any scan starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("worker count must be at least 1")]
    NoWorkers,

    #[error("scan rate must be greater than zero")]
    ZeroRate,

    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    #[error("port 0 cannot be scanned")]
    ZeroPort,

    #[error("invalid port range {start}-{end} (start > end)")]
    InvalidRange { start: u16, end: u16 },
}
