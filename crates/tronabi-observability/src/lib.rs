//! # tronabi-observability
//!
//! Logging for tronabi binaries. The codec crates only emit `tracing`
//! events; this crate installs the subscriber.
//!
//! Log levels are configurable globally and per component
//! (`tronabi_abi=trace`), with human-readable or JSON output on stderr.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig};
