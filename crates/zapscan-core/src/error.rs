//! Error types for the ZAPScan orchestrator

use thiserror::Error;

/// Result type alias using ZAPScan Error
pub type Result<T> = std::result::Result<T, Error>;

/// ZAPScan error types
#[derive(Error, Debug)]
pub enum Error {
    // === Engine Errors ===
    #[error("Scanning engine is not reachable at {endpoint}: {reason}")]
    EngineUnavailable { endpoint: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Engine API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Phase {phase} could not be started")]
    PhaseStartFailed { phase: String },

    // === Target Errors ===
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    // === Report Errors ===
    #[error("Report error: {0}")]
    Report(String),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if this error aborts a run before any phase starts. Only an
    /// unreachable engine does; everything after the health check degrades.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::EngineUnavailable { .. })
    }

    /// Get an error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Error::EngineUnavailable { .. } => "ENGINE_UNAVAILABLE",
            Error::Transport(_) => "TRANSPORT_ERROR",
            Error::Api { .. } => "API_ERROR",
            Error::PhaseStartFailed { .. } => "PHASE_START_FAILED",
            Error::InvalidTarget(_) => "INVALID_TARGET",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::InvalidConfig { .. } => "INVALID_CONFIG",
            Error::Report(_) => "REPORT_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        let down = Error::EngineUnavailable {
            endpoint: "http://localhost:8080".into(),
            reason: "connection refused".into(),
        };
        assert!(down.is_fatal());
        assert_eq!(down.code(), "ENGINE_UNAVAILABLE");

        let transport = Error::Transport("timeout".into());
        assert!(!transport.is_fatal());

        let start = Error::PhaseStartFailed {
            phase: "spider".into(),
        };
        assert!(!start.is_fatal());
        assert!(!Error::Configuration("bad".into()).is_fatal());
        assert_eq!(start.to_string(), "Phase spider could not be started");
    }
}
