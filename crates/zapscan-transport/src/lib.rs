//! ZAPScan Transport - Control API client for the scanning engine
//!
//! This crate provides:
//! - The `Transport` trait: one JSON request/response call against the engine
//! - `HttpTransport`: the reqwest implementation with a fixed per-call timeout
//! - `EngineClient`: typed wrappers over the control endpoints
//! - Response types, including `Progress` normalisation of status values
//!
//! The transport is injectable so that the orchestration logic can be driven
//! by an in-memory engine in tests.

pub mod client;
pub mod transport;
pub mod types;

pub use client::EngineClient;
pub use transport::{HttpTransport, HttpTransportConfig, Transport, TransportError};
pub use types::*;
