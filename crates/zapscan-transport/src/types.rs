//! Control API endpoints and response types

use serde::Deserialize;
use zapscan_core::lenient::StringOrNumber;
use zapscan_core::{Alert, ScanPhase};

/// Control API endpoints consumed by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Engine version (health check)
    Version,
    /// Sites tree
    Sites,
    /// Visit a URL, registering it as an asset
    AccessUrl,
    /// Start a discovery phase
    SpiderScan,
    /// Discovery progress
    SpiderStatus,
    /// Start an attack phase
    ActiveScan,
    /// Attack progress for one scan instance
    ActiveScanStatus,
    /// Alerts under a base URL
    Alerts,
    /// Delete one site node
    DeleteSiteNode,
    /// Delete the whole sites tree
    DeleteAllSiteNodes,
}

impl Endpoint {
    /// Path below the engine's base URL
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Version => "/JSON/core/view/version/",
            Endpoint::Sites => "/JSON/core/view/sites/",
            Endpoint::AccessUrl => "/JSON/core/action/accessUrl/",
            Endpoint::SpiderScan => "/JSON/spider/action/scan/",
            Endpoint::SpiderStatus => "/JSON/spider/view/status/",
            Endpoint::ActiveScan => "/JSON/ascan/action/scan/",
            Endpoint::ActiveScanStatus => "/JSON/ascan/view/status/",
            Endpoint::Alerts => "/JSON/core/view/alerts/",
            Endpoint::DeleteSiteNode => "/JSON/core/action/deleteSiteNode/",
            Endpoint::DeleteAllSiteNodes => "/JSON/core/action/deleteAllSiteNodes/",
        }
    }

    /// Endpoint that starts the given phase
    pub fn start_of(phase: ScanPhase) -> Self {
        match phase {
            ScanPhase::Discovery => Endpoint::SpiderScan,
            ScanPhase::Attack => Endpoint::ActiveScan,
        }
    }

    /// Endpoint that reports progress of the given phase
    pub fn status_of(phase: ScanPhase) -> Self {
        match phase {
            ScanPhase::Discovery => Endpoint::SpiderStatus,
            ScanPhase::Attack => Endpoint::ActiveScanStatus,
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Opaque identifier of a started phase instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhaseHandle(String);

impl PhaseHandle {
    pub fn new(id: impl Into<String>) -> Self {
        PhaseHandle(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhaseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Phase progress in percent, read from the engine's string or integer
/// representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Progress(u8);

impl Progress {
    pub const COMPLETE: Progress = Progress(100);

    /// Parse a raw status value; `None` if it is not a number in 0..=100
    pub fn from_raw(raw: &StringOrNumber) -> Option<Self> {
        raw.as_i64()
            .and_then(|n| u8::try_from(n).ok())
            .filter(|n| *n <= 100)
            .map(Progress)
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    pub fn is_complete(&self) -> bool {
        self.0 == 100
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ── Raw response bodies ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct VersionResponse {
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SitesResponse {
    pub sites: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActionResponse {
    #[serde(alias = "Result")]
    pub result: Option<StringOrNumber>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScanStartResponse {
    pub scan: Option<StringOrNumber>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    pub status: Option<StringOrNumber>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlertsResponse {
    pub alerts: Option<Vec<Alert>>,
}
