//! ZAPScan Common - Shared utilities: logging and configuration
//!
//! This crate provides common functionality used by the ZAPScan binaries.

pub mod config;
pub mod logging;

pub use config::{Config, ConfigBuilder, PhasePoll, ReportFormat};
pub use logging::{init_logging_with_config, LogConfig, LogFormat};
