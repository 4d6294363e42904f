//! Observability setup for Basket.
//!
//! This crate provides:
//! - `LogFormat` - Human-readable or JSON log lines
//! - `LogLevel` - Verbosity for the crates of this workspace
//! - `init_tracing` - Installs the global `tracing` subscriber

mod logging;

pub use logging::*;
