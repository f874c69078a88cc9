//! ZAPScan Core - Foundation types and error handling
//!
//! This crate provides the core abstractions shared by the orchestrator crates:
//! - `Target`: The asset under test, used verbatim as a query parameter
//! - `Alert`: One finding reported by the scanning engine
//! - `ScanPhase`: The discovery (spider) and attack (active scan) phases
//! - `Risk`, `Confidence`: Alert metadata enums

pub mod alert;
pub mod error;
pub mod lenient;
pub mod phase;
pub mod risk;
pub mod target;

// Re-export commonly used types at crate root
pub use alert::{Alert, AlertBuilder};
pub use error::{Error, Result};
pub use phase::ScanPhase;
pub use risk::{Confidence, Risk};
pub use target::Target;
