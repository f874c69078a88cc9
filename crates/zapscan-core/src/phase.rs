//! Scan phases driven on the engine

use serde::{Deserialize, Serialize};

/// A scan phase run against a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanPhase {
    /// Crawl and enumerate reachable resources (spider)
    Discovery,
    /// Actively probe discovered resources (active scan)
    Attack,
}

impl ScanPhase {
    /// Engine component name for this phase
    pub fn component(&self) -> &'static str {
        match self {
            ScanPhase::Discovery => "spider",
            ScanPhase::Attack => "ascan",
        }
    }

    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanPhase::Discovery => "Spider",
            ScanPhase::Attack => "Active Scan",
        }
    }

    /// Whether the status call must carry the handle returned at start
    pub fn status_needs_handle(&self) -> bool {
        matches!(self, ScanPhase::Attack)
    }
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
