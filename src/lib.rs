//! Library crate for mc-scan-rs: status-protocol codec, probe client and the
//! rate-limited scanning engine.
pub mod config;
pub mod error;
pub mod hosts;
pub mod logging;
pub mod packet;
pub mod ratelimit;
pub mod report;
pub mod sanitize;
pub mod scanner;
pub mod status;
pub mod types;
pub mod varint;
